#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use textback_core::traits::{ChatCompleter, DelayProvider, VectorIndex};
use textback_core::types::{ChatMessage, Meta, QueryHit, QueryResult};
use textback_core::{Error, Result};

/// Returns its documents in stored order, at most k of them.
pub struct StubIndex {
    pub documents: Vec<String>,
    pub last_k: Cell<Option<usize>>,
    pub fail: bool,
}

impl StubIndex {
    pub fn with(documents: &[&str]) -> Self {
        Self { documents: documents.iter().map(|d| d.to_string()).collect(), last_k: Cell::new(None), fail: false }
    }

    pub fn failing() -> Self {
        Self { documents: Vec::new(), last_k: Cell::new(None), fail: true }
    }
}

impl VectorIndex for StubIndex {
    fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    fn add(&self, _documents: &[String], _metadatas: &[Meta], _ids: &[String]) -> Result<()> {
        Err(Error::Index("read-only stub".into()))
    }

    fn query(&self, _text: &str, k: usize) -> Result<QueryResult> {
        self.last_k.set(Some(k));
        if self.fail {
            return Err(Error::Index("service unavailable".into()));
        }
        let hits = self
            .documents
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, d)| QueryHit { id: format!("id_{}", i), document: d.clone(), metadata: Meta::new(), distance: i as f32 })
            .collect();
        Ok(QueryResult { hits })
    }
}

pub struct Call {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
}

/// Hands out scripted replies in order; repeats `fallback` once they run out.
pub struct StubChat {
    script: RefCell<VecDeque<Result<String>>>,
    fallback: String,
    pub calls: RefCell<Vec<Call>>,
}

impl StubChat {
    pub fn always(reply: &str) -> Self {
        Self { script: RefCell::new(VecDeque::new()), fallback: reply.to_string(), calls: RefCell::new(Vec::new()) }
    }

    pub fn scripted(script: Vec<Result<String>>, fallback: &str) -> Self {
        Self { script: RefCell::new(script.into()), fallback: fallback.to_string(), calls: RefCell::new(Vec::new()) }
    }
}

impl ChatCompleter for StubChat {
    fn complete(&self, messages: &[ChatMessage], model: &str, temperature: f32) -> Result<String> {
        self.calls.borrow_mut().push(Call { messages: messages.to_vec(), model: model.to_string(), temperature });
        self.script.borrow_mut().pop_front().unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

/// Fixed delay that remembers how often it was asked.
pub struct CountingDelay<'a> {
    pub delay: Duration,
    pub calls: &'a Cell<usize>,
}

impl DelayProvider for CountingDelay<'_> {
    fn next_delay(&mut self) -> Duration {
        self.calls.set(self.calls.get() + 1);
        self.delay
    }
}
