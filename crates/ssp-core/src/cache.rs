//! Extraction cache keyed by document fingerprint.
//!
//! Reconciling the same plan against several catalogs, or re-running a
//! matrix after changing one source, re-extracts identical documents. The
//! cache keys on [`DocumentHash`] so reformatted copies share an entry, and
//! hands out `Arc`s: entries are immutable once inserted.

use ssp_extract::{extract_controls, ControlRecord, DocumentHash};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Bounded, insertion-ordered cache of extracted control lists.
#[derive(Debug)]
pub struct ExtractionCache {
    max_entries: usize,
    entries: HashMap<DocumentHash, Arc<Vec<ControlRecord>>>,
    order: VecDeque<DocumentHash>,
    hits: u64,
    misses: u64,
}

impl ExtractionCache {
    /// Creates a cache holding at most `max_entries` documents.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the document's controls, extracting on a miss.
    pub fn get_or_extract(&mut self, document: &Value) -> Arc<Vec<ControlRecord>> {
        let key = DocumentHash::of(document);

        if let Some(controls) = self.entries.get(&key) {
            self.hits += 1;
            debug!(document = %key, "Extraction cache hit");
            return Arc::clone(controls);
        }

        self.misses += 1;
        let controls = Arc::new(extract_controls(document));
        self.insert(key, Arc::clone(&controls));
        controls
    }

    fn insert(&mut self, key: DocumentHash, controls: Arc<Vec<ControlRecord>>) {
        while self.order.len() >= self.max_entries {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                debug!(document = %oldest, "Evicted extraction cache entry");
            }
        }
        self.order.push_back(key);
        self.entries.insert(key, controls);
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
