//! Per-document vector clocks.
//!
//! A [`VectorClock`] maps each user identity to a monotonically increasing
//! counter. It is the only notion of time the engine has: every submission
//! bumps the submitting user's counter, and every log record carries a full
//! snapshot of the clock taken at creation time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::OperationRecord;

/// A map from user identity to a monotonically increasing counter.
///
/// Serializes transparently as the underlying map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorClock {
    counters: HashMap<String, u64>,
}

impl VectorClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the counter for `user_id`, creating entries for
    /// unseen users starting at 0 (so their first bump yields 1).
    pub fn bump(&mut self, user_id: &str) -> u64 {
        let counter = self.counters.entry(user_id.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// The counter for `user_id`; 0 for unseen users.
    pub fn get(&self, user_id: &str) -> u64 {
        self.counters.get(user_id).copied().unwrap_or(0)
    }

    /// Deep copy of the clock, for embedding in an [`OperationRecord`].
    pub fn snapshot(&self) -> VectorClock {
        self.clone()
    }

    /// The clock as a plain map.
    pub fn as_map(&self) -> &HashMap<String, u64> {
        &self.counters
    }
}

/// Decide whether a previously logged record must be treated as concurrent
/// with an incoming operation from `incoming_user_id`.
///
/// A record counts as concurrent when its author differs from the incoming
/// author AND the record's own snapshot entry for its author has not fallen
/// behind the live clock's entry for that author. The live entry for another
/// author only advances when that author submits, so in practice every
/// cross-author record in history satisfies this check and is folded through
/// the transform on each new submission. This is the contract the engine
/// preserves, not a component-wise causal comparison of the two clocks.
pub fn is_concurrent(
    record: &OperationRecord,
    live: &VectorClock,
    incoming_user_id: &str,
) -> bool {
    if record.user_id == incoming_user_id {
        return false;
    }
    record.vector_clock.get(&record.user_id) >= live.get(&record.user_id)
}

/// The subset of `records` that must be transformed against an incoming
/// operation from `incoming_user_id`, in log order.
pub fn concurrent_records<'a>(
    records: &'a [OperationRecord],
    live: &VectorClock,
    incoming_user_id: &str,
) -> Vec<&'a OperationRecord> {
    records
        .iter()
        .filter(|record| is_concurrent(record, live, incoming_user_id))
        .collect()
}
