//! The document store façade.
//!
//! A [`DocumentStore`] owns every document the engine knows about: its
//! current state, its append-only operation log, and its vector clock.
//! [`DocumentStore::apply_operation`] is the single write entry point; the
//! remaining surface is pull-based queries and log maintenance for the
//! out-of-scope sync/persistence collaborators.
//!
//! The store is a plain struct passed by reference, never a process-wide
//! singleton. It performs no I/O and has no interior locking: callers must
//! serialize submissions per document, while calls for different documents
//! are independent.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;

use crate::apply::apply;
use crate::clock::{concurrent_records, VectorClock};
use crate::transform::transform;
use crate::types::{ApplyResult, Op, OperationRecord, OperationStats};

/// Everything the engine tracks for one document id.
#[derive(Debug, Clone)]
pub struct Document {
    /// The merged document tree. Always equals the fold of every
    /// non-annihilated operation in `operations`, in order, over the empty
    /// initial state.
    pub state: Value,
    /// Append-only log of everything ever submitted for this document.
    pub operations: Vec<OperationRecord>,
    /// Per-user submission counters.
    pub vector_clock: VectorClock,
}

impl Document {
    fn new() -> Self {
        Self {
            state: Value::Object(Map::new()),
            operations: Vec::new(),
            vector_clock: VectorClock::new(),
        }
    }
}

/// Owns all documents, keyed by document id.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
    next_record_seq: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit one operation for a document on behalf of `user_id`.
    ///
    /// The document is created lazily on first use. The operation is
    /// transformed against every logged operation that counts as concurrent
    /// with it (in log order, short-circuiting once annihilated), applied to
    /// the current state, and recorded. The inbound operation may be `None`,
    /// in which case only the clock bump and the log append happen.
    pub fn apply_operation(
        &mut self,
        document_id: &str,
        operation: Option<Op>,
        user_id: &str,
    ) -> ApplyResult {
        self.next_record_seq += 1;
        let record_id = format!("op-{:08x}", self.next_record_seq);

        let doc = self
            .documents
            .entry(document_id.to_string())
            .or_insert_with(Document::new);

        doc.vector_clock.bump(user_id);

        let concurrent = concurrent_records(&doc.operations, &doc.vector_clock, user_id);
        log::debug!(
            "doc {document_id}: op from {user_id} transforms against {} concurrent records",
            concurrent.len()
        );

        let mut transformed = operation;
        for record in concurrent {
            let Some(current) = &transformed else {
                break;
            };
            let Some(against) = &record.operation else {
                continue;
            };
            transformed = transform(current, against);
        }
        if transformed.is_none() {
            log::debug!("doc {document_id}: op from {user_id} annihilated by transform");
        }

        doc.state = apply(&doc.state, transformed.as_ref());

        let record = OperationRecord {
            id: record_id,
            operation: transformed.clone(),
            user_id: user_id.to_string(),
            timestamp: now_millis(),
            vector_clock: doc.vector_clock.snapshot(),
        };
        doc.operations.push(record.clone());

        ApplyResult {
            record,
            new_state: doc.state.clone(),
            transformed_operation: transformed,
        }
    }

    /// The current merged state, or `None` for an unknown document.
    pub fn document_state(&self, document_id: &str) -> Option<&Value> {
        self.documents.get(document_id).map(|doc| &doc.state)
    }

    /// The operation log, optionally filtered to records newer than `since`
    /// (milliseconds since the Unix epoch). Unknown documents yield an
    /// empty list.
    pub fn document_operations(
        &self,
        document_id: &str,
        since: Option<u64>,
    ) -> Vec<&OperationRecord> {
        let Some(doc) = self.documents.get(document_id) else {
            return Vec::new();
        };
        match since {
            Some(cutoff) => doc
                .operations
                .iter()
                .filter(|record| record.timestamp > cutoff)
                .collect(),
            None => doc.operations.iter().collect(),
        }
    }

    /// The document's live vector clock, or `None` for an unknown document.
    pub fn vector_clock(&self, document_id: &str) -> Option<&VectorClock> {
        self.documents.get(document_id).map(|doc| &doc.vector_clock)
    }

    /// Drop log records older than `max_age`. Purely log hygiene: the
    /// document state and clock are untouched. Returns the number of
    /// records dropped.
    pub fn clear_old_operations(&mut self, document_id: &str, max_age: Duration) -> usize {
        let Some(doc) = self.documents.get_mut(document_id) else {
            return 0;
        };
        let cutoff = now_millis().saturating_sub(max_age.as_millis() as u64);
        let before = doc.operations.len();
        doc.operations.retain(|record| record.timestamp >= cutoff);
        let dropped = before - doc.operations.len();
        if dropped > 0 {
            log::debug!("doc {document_id}: trimmed {dropped} records older than {max_age:?}");
        }
        dropped
    }

    /// Drop a document entirely, including its log and clock. Returns
    /// whether the document existed.
    pub fn reset_document(&mut self, document_id: &str) -> bool {
        let existed = self.documents.remove(document_id).is_some();
        if existed {
            log::debug!("doc {document_id}: reset");
        }
        existed
    }

    /// Aggregate counts over the log, or `None` for an unknown document.
    pub fn operation_stats(&self, document_id: &str) -> Option<OperationStats> {
        let doc = self.documents.get(document_id)?;
        let mut by_kind: IndexMap<String, usize> = IndexMap::new();
        let mut by_user: IndexMap<String, usize> = IndexMap::new();
        let mut annihilated = 0usize;
        for record in &doc.operations {
            match &record.operation {
                Some(op) => *by_kind.entry(op.kind().to_string()).or_insert(0) += 1,
                None => annihilated += 1,
            }
            *by_user.entry(record.user_id.clone()).or_insert(0) += 1;
        }
        Some(OperationStats {
            total: doc.operations.len(),
            annihilated,
            by_kind,
            by_user,
            vector_clock: doc.vector_clock.as_map().clone(),
        })
    }

    /// Ids of every document currently held.
    pub fn document_ids(&self) -> Vec<&str> {
        self.documents.keys().map(|id| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
