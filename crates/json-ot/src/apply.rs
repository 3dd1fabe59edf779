//! Applies a single (already-transformed) operation to a document state.
//!
//! The applier never mutates the caller's tree: the state is cloned first,
//! so concurrent readers of the old state remain valid. It is also total:
//! an operation that cannot be applied (missing target, wrong container
//! kind) degrades to a no-op instead of erroring.

use serde_json::Value;

use json_ot_path::{get_mut, parse_dot_path, set};

use crate::types::Op;

/// Produce the state after applying `operation`. `None` (an annihilated
/// operation) returns the state unchanged.
pub fn apply(state: &Value, operation: Option<&Op>) -> Value {
    let mut next = state.clone();
    let Some(op) = operation else {
        return next;
    };
    match op {
        Op::Insert { path, position, value } => apply_insert(&mut next, path, *position, value),
        Op::Delete { path, position, length } => apply_delete(&mut next, path, *position, *length),
        Op::Update { path, position, value } => apply_set(&mut next, path, *position, value),
        Op::Replace { path, value } => apply_set(&mut next, path, None, value),
        Op::Unknown => {}
    }
    next
}

fn apply_insert(state: &mut Value, path: &str, position: usize, value: &Value) {
    let steps = parse_dot_path(path);
    let Some(target) = get_mut(state, &steps) else {
        log::trace!("insert target {path:?} does not resolve; dropped");
        return;
    };
    match target {
        Value::Array(arr) => {
            arr.insert(position.min(arr.len()), value.clone());
        }
        Value::String(s) => {
            // Positions are char-based; only string values splice into strings.
            let Value::String(ins) = value else {
                log::trace!("non-string insert into string at {path:?}; dropped");
                return;
            };
            let chars: Vec<char> = s.chars().collect();
            let pos = position.min(chars.len());
            let mut out: String = chars[..pos].iter().collect();
            out.push_str(ins);
            out.extend(&chars[pos..]);
            *s = out;
        }
        _ => {
            log::trace!("insert target {path:?} is not an array or string; dropped");
        }
    }
}

fn apply_delete(state: &mut Value, path: &str, position: usize, length: usize) {
    let steps = parse_dot_path(path);
    let Some(target) = get_mut(state, &steps) else {
        log::trace!("delete target {path:?} does not resolve; dropped");
        return;
    };
    match target {
        Value::Array(arr) => {
            let end = (position + length).min(arr.len());
            if position < end {
                arr.drain(position..end);
            }
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let end = (position + length).min(chars.len());
            if position < end {
                *s = chars[..position]
                    .iter()
                    .chain(chars[end..].iter())
                    .collect();
            }
        }
        _ => {
            log::trace!("delete target {path:?} is not an array or string; dropped");
        }
    }
}

fn apply_set(state: &mut Value, path: &str, position: Option<usize>, value: &Value) {
    let steps = parse_dot_path(path);
    if let Some(pos) = position {
        if let Some(Value::Array(arr)) = get_mut(state, &steps) {
            if pos < arr.len() {
                arr[pos] = value.clone();
            } else {
                log::trace!("positional update at {path:?}[{pos}] out of range; dropped");
            }
            return;
        }
        // Position on a non-array target: fall back to a plain path set.
    }
    if set(state, &steps, value.clone()).is_err() {
        log::trace!("update at {path:?} does not resolve to a writable slot; dropped");
    }
}
