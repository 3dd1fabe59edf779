//! Core types for the OT engine: the operation model and the structures
//! returned by the document store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::clock::VectorClock;

fn default_delete_length() -> usize {
    1
}

/// A document edit operation.
///
/// Operations arrive as JSON objects tagged by a `type` field
/// (`{"type": "insert", "path": "items", "position": 2, "value": "x"}`)
/// and deserialize directly into this enum. `path` is a dot-delimited
/// address into the document tree; the empty string addresses the root.
///
/// A `type` tag the engine does not recognize becomes [`Op::Unknown`],
/// which is inert: it passes through the transform untouched and leaves
/// the document state unchanged, but is still recorded in the operation
/// log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Op {
    /// Insert `value` at `position` into the array or string at `path`.
    Insert {
        path: String,
        position: usize,
        value: Value,
    },
    /// Remove `length` elements/characters starting at `position` from the
    /// array or string at `path`. `length` defaults to 1 on the wire.
    Delete {
        path: String,
        position: usize,
        #[serde(default = "default_delete_length")]
        length: usize,
    },
    /// Set `path` to `value`. When `position` is present and `path` resolves
    /// to an array, the element at that index is written instead.
    Update {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        value: Value,
    },
    /// Set `path` to `value`. Resolves via the same path-set logic as
    /// [`Op::Update`].
    Replace { path: String, value: Value },
    /// Any unrecognized `type` tag.
    #[serde(other)]
    Unknown,
}

impl Op {
    /// Returns the operation kind string (matching the wire `type` tag).
    pub fn kind(&self) -> &'static str {
        match self {
            Op::Insert { .. } => "insert",
            Op::Delete { .. } => "delete",
            Op::Update { .. } => "update",
            Op::Replace { .. } => "replace",
            Op::Unknown => "unknown",
        }
    }

    /// Returns the path of the operation, if it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Op::Insert { path, .. } => Some(path),
            Op::Delete { path, .. } => Some(path),
            Op::Update { path, .. } => Some(path),
            Op::Replace { path, .. } => Some(path),
            Op::Unknown => None,
        }
    }
}

/// One entry in a document's append-only operation log.
///
/// `operation` holds the operation as it was applied, i.e. *after*
/// transformation against the concurrent portion of the log; `None` means
/// the operation was annihilated and contributed nothing to the state.
/// `vector_clock` is a full snapshot of the document's clock taken at the
/// moment the record was created. Records are immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: String,
    pub operation: Option<Op>,
    pub user_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub vector_clock: VectorClock,
}

/// What a call to [`DocumentStore::apply_operation`] produced.
///
/// [`DocumentStore::apply_operation`]: crate::store::DocumentStore::apply_operation
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResult {
    /// The log record appended for this submission.
    pub record: OperationRecord,
    /// The document state after applying the transformed operation.
    pub new_state: Value,
    /// The operation as applied; `None` if it was annihilated.
    pub transformed_operation: Option<Op>,
}

/// Aggregate counts over a document's operation log.
#[derive(Debug, Clone, Serialize)]
pub struct OperationStats {
    /// Total number of log records, including annihilated ones.
    pub total: usize,
    /// Records whose operation was annihilated by the transform.
    pub annihilated: usize,
    /// Counts keyed by operation kind, in first-seen order.
    pub by_kind: IndexMap<String, usize>,
    /// Counts keyed by submitting user, in first-seen order.
    pub by_user: IndexMap<String, usize>,
    /// The document's current vector clock as a plain map.
    pub vector_clock: HashMap<String, u64>,
}
