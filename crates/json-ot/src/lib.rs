//! json-ot — operational transform engine for JSON-shaped collaborative
//! documents.
//!
//! The engine reconciles concurrent edits from multiple collaborators into
//! one causally consistent state. Per document it keeps the merged state,
//! an append-only operation log, and a vector clock; conflict detection
//! uses per-author logical clocks, and conflicting operations are rewritten
//! by a transform matrix before being applied.
//!
//! [`DocumentStore::apply_operation`] is the single write entry point.
//! The engine performs no I/O and spawns no threads; transport,
//! persistence, presence, and authentication are the caller's concern.
//!
//! ```
//! use json_ot::{DocumentStore, Op};
//! use serde_json::json;
//!
//! let mut store = DocumentStore::new();
//! store.apply_operation(
//!     "doc",
//!     Some(Op::Update { path: "items".into(), position: None, value: json!(["a", "c"]) }),
//!     "alice",
//! );
//! let result = store.apply_operation(
//!     "doc",
//!     Some(Op::Insert { path: "items".into(), position: 1, value: json!("b") }),
//!     "alice",
//! );
//! assert_eq!(result.new_state, json!({"items": ["a", "b", "c"]}));
//! ```

pub mod apply;
pub mod clock;
pub mod store;
pub mod transform;
pub mod types;

pub use apply::apply;
pub use clock::{concurrent_records, is_concurrent, VectorClock};
pub use store::{Document, DocumentStore};
pub use transform::transform;
pub use types::{ApplyResult, Op, OperationRecord, OperationStats};
