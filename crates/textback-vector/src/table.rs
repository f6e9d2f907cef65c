//! LanceDB connection and housekeeping helpers.
//!
//! Database open, ensure-* helpers for tables, and a small key/value meta
//! table that records which embedder filled each collection.
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, Table};
use std::sync::Arc;

use textback_core::{Error, Result};

use crate::schema::{build_collection_schema, build_meta_schema, vector_dim};

pub const META_TABLE: &str = "meta";

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(Error::index)
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    let names = conn.table_names().execute().await.map_err(Error::index)?;
    if names.contains(&name.to_string()) {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await.map_err(Error::index)?;
    Ok(())
}

/// Open-or-create a collection table whose vector column is `dim` wide.
pub async fn ensure_collection_table(conn: &Connection, name: &str, dim: usize) -> Result<Table> {
    let dim = i32::try_from(dim).map_err(|_| Error::Index(format!("embedding dimension {} too large", dim)))?;
    ensure_table(conn, name, build_collection_schema(dim)).await?;
    let table = conn.open_table(name).execute().await.map_err(Error::index)?;
    let schema = table.schema().await.map_err(Error::index)?;
    match vector_dim(&schema) {
        Some(stored) if stored == dim => Ok(table),
        Some(stored) => Err(Error::Index(format!(
            "collection '{}' stores {}-dimensional vectors, embedder produces {}",
            name, stored, dim
        ))),
        None => Err(Error::Index(format!("collection '{}' has no vector column", name))),
    }
}

pub async fn ensure_meta_table(conn: &Connection, name: &str) -> Result<()> {
    ensure_table(conn, name, build_meta_schema()).await
}

pub async fn set_meta(conn: &Connection, table: &str, key: &str, value: &str) -> Result<()> {
    ensure_meta_table(conn, table).await?;
    let t = conn.open_table(table).execute().await.map_err(Error::index)?;
    let rb = RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from(vec![key.to_string()])),
            Arc::new(StringArray::from(vec![value.to_string()])),
        ],
    )
    .map_err(Error::index)?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(rb)].into_iter(), build_meta_schema()));
    // Upsert behavior via merge_insert: key is unique
    let mut mi = t.merge_insert(&["key"]);
    mi.when_matched_update_all(None).when_not_matched_insert_all();
    mi.execute(reader).await.map_err(Error::index)?;
    Ok(())
}

pub async fn get_meta(conn: &Connection, table: &str, key: &str) -> Result<Option<String>> {
    let names = conn.table_names().execute().await.map_err(Error::index)?;
    if !names.contains(&table.to_string()) {
        return Ok(None);
    }
    let t = conn.open_table(table).execute().await.map_err(Error::index)?;
    let mut stream = t
        .query()
        .only_if(format!("key = '{}'", escape_literal(key)))
        .execute()
        .await
        .map_err(Error::index)?;
    while let Some(batch) = stream.try_next().await.map_err(Error::index)? {
        if batch.num_rows() == 0 {
            continue;
        }
        let val = batch
            .column_by_name("value")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| Error::Index("meta.value column missing".into()))?;
        return Ok(Some(val.value(0).to_string()));
    }
    Ok(None)
}

/// Quote a string for a SQL-style filter literal.
pub fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}
