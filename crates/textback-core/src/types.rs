//! Domain types shared by the loader, the index and the reply pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type EntryId = String;
pub type Meta = HashMap<String, String>;

/// One message of a dataset conversation. Only `content` matters here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One line of the newline-delimited JSON dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(default)]
    pub messages: Vec<DatasetMessage>,
}

/// A dataset row reduced to what gets indexed.
///
/// - `id`: `id_{row_index}`, unique within the collection
/// - `document`: the last `window` message contents joined with `\n`
/// - `metadata`: provenance, `{"source": "line_{row_index}"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub id: EntryId,
    pub document: String,
    pub metadata: Meta,
}

impl ConversationRecord {
    pub fn from_row(row_index: usize, row: &DatasetRow, window: usize) -> Self {
        let contents: Vec<&str> = row
            .messages
            .iter()
            .filter_map(|m| m.content.as_deref())
            .collect();
        let start = contents.len().saturating_sub(window);
        let mut metadata = Meta::new();
        metadata.insert("source".to_string(), format!("line_{}", row_index));
        Self {
            id: format!("id_{}", row_index),
            document: contents[start..].join("\n"),
            metadata,
        }
    }
}

/// A single nearest-neighbor match. Lower `distance` is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: EntryId,
    pub document: String,
    pub metadata: Meta,
    pub distance: f32,
}

/// Up to k hits, closest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub hits: Vec<QueryHit>,
}

impl QueryResult {
    pub fn documents(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.document.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message sent to the generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}
