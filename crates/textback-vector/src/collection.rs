use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

use textback_core::traits::{Embedder, VectorIndex};
use textback_core::types::{Meta, QueryHit, QueryResult};
use textback_core::{Error, Result};

use crate::schema::build_collection_schema;
use crate::table::{ensure_collection_table, escape_literal, get_meta, open_db, set_meta, META_TABLE};

pub const DEFAULT_BATCH_SIZE: usize = 256;
const ID_FILTER_CHUNK: usize = 500;

/// A named LanceDB table of documents embedded with one fixed embedder.
///
/// The public surface is synchronous; an owned tokio runtime drives the
/// LanceDB client. The embedder's `model_id` is pinned in the meta table the
/// first time a collection is opened, and reopening with another embedder
/// fails so load-time and query-time vectors always come from the same model.
pub struct LanceCollection {
    rt: Runtime,
    table: Table,
    name: String,
    embedder: Box<dyn Embedder>,
    batch_size: usize,
}

impl LanceCollection {
    pub fn open(db_path: &Path, name: &str, embedder: Box<dyn Embedder>) -> Result<Self> {
        std::fs::create_dir_all(db_path)?;
        let rt = Runtime::new()?;
        let table = rt.block_on(async {
            let db = open_db(db_path.to_string_lossy().as_ref()).await?;
            let table = ensure_collection_table(&db, name, embedder.dim()).await?;
            pin_embedder(&db, name, embedder.model_id()).await?;
            Ok::<_, Error>(table)
        })?;
        tracing::info!(collection = name, path = %db_path.display(), embedder = embedder.model_id(), "opened collection");
        Ok(Self { rt, table, name: name.to_string(), embedder, batch_size: DEFAULT_BATCH_SIZE })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn embedder_id(&self) -> &str {
        self.embedder.model_id()
    }

    fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f32>>> {
        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        let mut vectors = Vec::with_capacity(documents.len());
        for batch in documents.chunks(self.batch_size) {
            let embedded = self.embedder.embed_batch(batch)?;
            if embedded.len() != batch.len() {
                return Err(Error::Embedding(format!("asked for {} embeddings, got {}", batch.len(), embedded.len())));
            }
            vectors.extend(embedded);
            pb.set_position(vectors.len() as u64);
        }
        pb.finish_with_message("embedded");
        Ok(vectors)
    }

    fn count_existing_ids(&self, ids: &[String]) -> Result<usize> {
        self.rt.block_on(async {
            let mut found = 0usize;
            for chunk in ids.chunks(ID_FILTER_CHUNK) {
                let list = chunk.iter().map(|id| format!("'{}'", escape_literal(id))).collect::<Vec<_>>().join(",");
                found += self.table.count_rows(Some(format!("id IN ({})", list))).await.map_err(Error::index)?;
            }
            Ok::<_, Error>(found)
        })
    }
}

async fn pin_embedder(db: &Connection, collection: &str, model_id: &str) -> Result<()> {
    let key = format!("embedder:{}", collection);
    match get_meta(db, META_TABLE, &key).await? {
        Some(stored) if stored == model_id => Ok(()),
        Some(stored) => Err(Error::Index(format!(
            "collection '{}' was embedded with '{}', refusing to use '{}'",
            collection, stored, model_id
        ))),
        None => set_meta(db, META_TABLE, &key, model_id).await,
    }
}

fn entries_to_record_batch(ids: &[String], documents: &[String], metadatas: &[Meta], vectors: &[Vec<f32>], dim: usize) -> Result<RecordBatch> {
    let dim_i32 = i32::try_from(dim).map_err(Error::index)?;
    let mut meta_json = Vec::with_capacity(metadatas.len());
    for meta in metadatas {
        meta_json.push(serde_json::to_string(meta).map_err(Error::index)?);
    }
    let mut rows: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(vectors.len());
    for v in vectors {
        if v.len() != dim {
            return Err(Error::Embedding(format!("vector has dimension {}, expected {}", v.len(), dim)));
        }
        rows.push(Some(v.iter().map(|&x| Some(x)).collect()));
    }
    RecordBatch::try_new(build_collection_schema(dim_i32), vec![
        Arc::new(StringArray::from(ids.to_vec())),
        Arc::new(StringArray::from(documents.to_vec())),
        Arc::new(StringArray::from(meta_json)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(rows.into_iter(), dim_i32)),
    ])
    .map_err(Error::index)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::Index(format!("{} column missing from search results", name)))
}

fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<QueryHit>> {
    let ids = string_column(batch, "id")?;
    let documents = string_column(batch, "document")?;
    let metadata = string_column(batch, "metadata")?;
    let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
    let mut hits = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let meta: Meta = serde_json::from_str(metadata.value(i)).map_err(Error::index)?;
        let distance = match distances {
            Some(d) if d.is_valid(i) => d.value(i),
            _ => f32::MAX,
        };
        hits.push(QueryHit { id: ids.value(i).to_string(), document: documents.value(i).to_string(), metadata: meta, distance });
    }
    Ok(hits)
}

impl VectorIndex for LanceCollection {
    fn count(&self) -> Result<usize> {
        self.rt.block_on(self.table.count_rows(None)).map_err(Error::index)
    }

    fn add(&self, documents: &[String], metadatas: &[Meta], ids: &[String]) -> Result<()> {
        if documents.len() != ids.len() || metadatas.len() != ids.len() {
            return Err(Error::Index(format!(
                "misaligned add: {} documents, {} metadatas, {} ids",
                documents.len(), metadatas.len(), ids.len()
            )));
        }
        if ids.is_empty() {
            return Ok(());
        }
        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(Error::Index(format!("duplicate id '{}' in add", dup)));
        }
        let existing = self.count_existing_ids(ids)?;
        if existing > 0 {
            return Err(Error::Index(format!("{} of {} ids already exist in '{}'", existing, ids.len(), self.name)));
        }

        let vectors = self.embed_documents(documents)?;
        let batch = entries_to_record_batch(ids, documents, metadatas, &vectors, self.embedder.dim())?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        self.rt.block_on(self.table.add(reader).execute()).map_err(Error::index)?;
        tracing::info!(collection = %self.name, added = ids.len(), "added entries");
        Ok(())
    }

    fn query(&self, text: &str, k: usize) -> Result<QueryResult> {
        if k == 0 || self.count()? == 0 {
            return Ok(QueryResult::default());
        }
        let vector = self
            .embedder
            .embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("no embedding returned for query".into()))?;

        let mut hits = self.rt.block_on(async {
            let mut stream = self
                .table
                .vector_search(vector)
                .map_err(Error::index)?
                .limit(k)
                .execute()
                .await
                .map_err(Error::index)?;
            let mut hits = Vec::new();
            while let Some(batch) = stream.try_next().await.map_err(Error::index)? {
                hits.extend(batch_to_hits(&batch)?);
            }
            Ok::<_, Error>(hits)
        })?;
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        tracing::debug!(collection = %self.name, k, returned = hits.len(), "query");
        Ok(QueryResult { hits })
    }
}
