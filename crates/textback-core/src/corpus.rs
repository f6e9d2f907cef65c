//! Corpus Loader: turns the conversation dataset into index entries once.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::VectorIndex;
use crate::types::{ConversationRecord, DatasetRow, Meta};

pub const DEFAULT_WINDOW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The index already held entries; nothing was read.
    Skipped { existing: usize },
    Loaded { inserted: usize },
}

#[derive(Debug, Clone)]
pub struct CorpusLoader {
    window: usize,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self { window: DEFAULT_WINDOW }
    }
}

impl CorpusLoader {
    pub fn new(window: usize) -> Self {
        Self { window: window.max(1) }
    }

    /// Parse every dataset row. Any malformed line, blank ones included, fails
    /// the whole read. Record ids follow the 0-based line index.
    pub fn parse_records<R: BufRead>(&self, reader: R) -> Result<Vec<ConversationRecord>> {
        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let row: DatasetRow = serde_json::from_str(&line)
                .map_err(|e| Error::Dataset(format!("line {}: {}", line_no + 1, e)))?;
            records.push(ConversationRecord::from_row(line_no, &row, self.window));
        }
        Ok(records)
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<ConversationRecord>> {
        let file = File::open(path)
            .map_err(|e| Error::Dataset(format!("cannot open {}: {}", path.display(), e)))?;
        self.parse_records(BufReader::new(file))
    }

    /// Insert the whole dataset in one `add` call, but only into an empty index.
    pub fn load_if_empty(&self, index: &dyn VectorIndex, path: &Path) -> Result<LoadOutcome> {
        let existing = index.count()?;
        if existing > 0 {
            tracing::info!(existing, "index already populated, skipping corpus load");
            return Ok(LoadOutcome::Skipped { existing });
        }
        let records = self.read_records(path)?;
        tracing::info!(rows = records.len(), path = %path.display(), "loading corpus");

        let mut documents = Vec::with_capacity(records.len());
        let mut metadatas: Vec<Meta> = Vec::with_capacity(records.len());
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            documents.push(record.document);
            metadatas.push(record.metadata);
            ids.push(record.id);
        }
        index.add(&documents, &metadatas, &ids)?;
        Ok(LoadOutcome::Loaded { inserted: ids.len() })
    }
}
