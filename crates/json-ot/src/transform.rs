//! Operational transformation for document operations.
//!
//! Provides [`transform`], which rewrites an incoming operation against one
//! previously-applied concurrent operation so that applying it afterwards
//! still expresses its original intent. The document store folds an incoming
//! operation through this function once per concurrent log record.

use serde_json::Value;

use crate::types::Op;

/// How far an insert shifts positions at the same path: string values shift
/// by their character count, any other value spliced into an array shifts
/// by one slot.
fn insert_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        _ => 1,
    }
}

/// Transform `op_a` (the incoming operation) against `op_b` (a
/// previously-applied concurrent operation).
///
/// Returns the adjusted operation, or `None` if `op_b` has made `op_a`
/// meaningless (annihilation). Operations on different paths never
/// interact, and any pairing without an explicit rule passes `op_a`
/// through unchanged.
pub fn transform(op_a: &Op, op_b: &Op) -> Option<Op> {
    let (Some(path_a), Some(path_b)) = (op_a.path(), op_b.path()) else {
        return Some(op_a.clone());
    };
    if path_a != path_b {
        return Some(op_a.clone());
    }

    match (op_a, op_b) {
        (
            Op::Insert { path, position, value },
            Op::Insert { position: pos_b, value: val_b, .. },
        ) => Some(x_insert_insert(path, *position, value, *pos_b, val_b)),
        (
            Op::Delete { path, position, length },
            Op::Delete { position: pos_b, length: len_b, .. },
        ) => Some(x_delete_delete(path, *position, *length, *pos_b, *len_b)),
        (
            Op::Insert { path, position, value },
            Op::Delete { position: pos_b, length: len_b, .. },
        ) => x_insert_delete(path, *position, value, *pos_b, *len_b),
        (
            Op::Delete { path, position, length },
            Op::Insert { position: pos_b, value: val_b, .. },
        ) => Some(x_delete_insert(path, *position, *length, *pos_b, val_b)),
        (
            Op::Update { path, position: Some(pos), value },
            Op::Insert { position: pos_b, value: val_b, .. },
        ) => Some(x_update_insert(path, *pos, value, *pos_b, val_b)),
        (
            Op::Update { path, position: Some(pos), value },
            Op::Delete { position: pos_b, length: len_b, .. },
        ) => x_update_delete(path, *pos, value, *pos_b, *len_b),
        // update/update and replace/replace are last-writer-wins: the
        // incoming operation is appended later in the log, so it prevails
        // at apply time without adjustment.
        (Op::Update { .. }, Op::Update { .. }) => Some(op_a.clone()),
        (Op::Replace { .. }, Op::Replace { .. }) => Some(op_a.clone()),
        // No rule for this pairing.
        _ => Some(op_a.clone()),
    }
}

/// insert/insert: positions at or after the prior insert shift right.
/// Equal positions shift too: the already-applied insert is deemed to have
/// landed first, so simultaneous inserts are ordered by argument order.
fn x_insert_insert(path: &str, pos_a: usize, val_a: &Value, pos_b: usize, val_b: &Value) -> Op {
    let position = if pos_a >= pos_b {
        pos_a + insert_len(val_b)
    } else {
        pos_a
    };
    Op::Insert {
        path: path.to_string(),
        position,
        value: val_a.clone(),
    }
}

/// delete/delete: positions after the prior delete shift left, floored at 0.
/// Only the position is adjusted; overlapping ranges are not trimmed.
fn x_delete_delete(path: &str, pos_a: usize, len_a: usize, pos_b: usize, len_b: usize) -> Op {
    let position = if pos_a > pos_b {
        pos_a.saturating_sub(len_b)
    } else {
        pos_a
    };
    Op::Delete {
        path: path.to_string(),
        position,
        length: len_a,
    }
}

/// insert vs delete: an insert landing inside the deleted range is
/// annihilated; at or beyond the end of the range it shifts left.
fn x_insert_delete(
    path: &str,
    pos_a: usize,
    val_a: &Value,
    pos_b: usize,
    len_b: usize,
) -> Option<Op> {
    if pos_a >= pos_b && pos_a < pos_b + len_b {
        return None;
    }
    let position = if pos_a >= pos_b + len_b {
        pos_a - len_b
    } else {
        pos_a
    };
    Some(Op::Insert {
        path: path.to_string(),
        position,
        value: val_a.clone(),
    })
}

/// delete vs insert: a delete at or after the insert position shifts right.
fn x_delete_insert(path: &str, pos_a: usize, len_a: usize, pos_b: usize, val_b: &Value) -> Op {
    let position = if pos_a >= pos_b {
        pos_a + insert_len(val_b)
    } else {
        pos_a
    };
    Op::Delete {
        path: path.to_string(),
        position,
        length: len_a,
    }
}

/// update vs insert: a position-addressed update at or after the insert
/// position shifts right.
fn x_update_insert(path: &str, pos_a: usize, val_a: &Value, pos_b: usize, val_b: &Value) -> Op {
    let position = if pos_a >= pos_b {
        pos_a + insert_len(val_b)
    } else {
        pos_a
    };
    Op::Update {
        path: path.to_string(),
        position: Some(position),
        value: val_a.clone(),
    }
}

/// update vs delete: an update targeting a position inside the deleted range
/// is annihilated; beyond the end of the range it shifts left.
fn x_update_delete(
    path: &str,
    pos_a: usize,
    val_a: &Value,
    pos_b: usize,
    len_b: usize,
) -> Option<Op> {
    if pos_a >= pos_b && pos_a < pos_b + len_b {
        return None;
    }
    let position = if pos_a >= pos_b + len_b {
        pos_a - len_b
    } else {
        pos_a
    };
    Some(Op::Update {
        path: path.to_string(),
        position: Some(position),
        value: val_a.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert(path: &str, position: usize, value: Value) -> Op {
        Op::Insert {
            path: path.to_string(),
            position,
            value,
        }
    }

    fn delete(path: &str, position: usize, length: usize) -> Op {
        Op::Delete {
            path: path.to_string(),
            position,
            length,
        }
    }

    fn update_at(path: &str, position: usize, value: Value) -> Op {
        Op::Update {
            path: path.to_string(),
            position: Some(position),
            value,
        }
    }

    #[test]
    fn different_paths_never_interact() {
        let a = insert("items", 0, json!("x"));
        let b = delete("other", 0, 3);
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn insert_insert_later_position_shifts_right() {
        let a = insert("items", 3, json!("x"));
        let b = insert("items", 1, json!({"id": 1}));
        // Non-string values shift by one slot.
        assert_eq!(transform(&a, &b), Some(insert("items", 4, json!("x"))));
    }

    #[test]
    fn insert_insert_string_shifts_by_char_count() {
        let a = insert("text", 5, json!("x"));
        let b = insert("text", 2, json!("abc"));
        assert_eq!(transform(&a, &b), Some(insert("text", 8, json!("x"))));
    }

    #[test]
    fn insert_insert_equal_positions_shift_right() {
        // The already-applied insert wins the slot; the incoming one lands
        // after it.
        let a = insert("items", 1, json!("y"));
        let b = insert("items", 1, json!("z"));
        assert_eq!(transform(&a, &b), Some(insert("items", 2, json!("y"))));
    }

    #[test]
    fn insert_insert_earlier_position_unchanged() {
        let a = insert("items", 0, json!("y"));
        let b = insert("items", 2, json!("z"));
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn delete_delete_later_position_shifts_left() {
        let a = delete("items", 5, 1);
        let b = delete("items", 1, 2);
        assert_eq!(transform(&a, &b), Some(delete("items", 3, 1)));
    }

    #[test]
    fn delete_delete_shift_floors_at_zero() {
        let a = delete("items", 2, 1);
        let b = delete("items", 1, 5);
        assert_eq!(transform(&a, &b), Some(delete("items", 0, 1)));
    }

    #[test]
    fn delete_delete_does_not_trim_overlap() {
        // Overlap correctness is not computed: only the position moves.
        let a = delete("items", 0, 4);
        let b = delete("items", 2, 3);
        assert_eq!(transform(&a, &b), Some(delete("items", 0, 4)));
    }

    #[test]
    fn insert_inside_delete_range_is_annihilated() {
        let a = insert("items", 2, json!("x"));
        let b = delete("items", 1, 3);
        assert_eq!(transform(&a, &b), None);
    }

    #[test]
    fn insert_at_delete_start_is_annihilated() {
        let a = insert("items", 1, json!("x"));
        let b = delete("items", 1, 3);
        assert_eq!(transform(&a, &b), None);
    }

    #[test]
    fn insert_past_delete_range_shifts_left() {
        let a = insert("items", 4, json!("x"));
        let b = delete("items", 1, 3);
        assert_eq!(transform(&a, &b), Some(insert("items", 1, json!("x"))));
    }

    #[test]
    fn insert_before_delete_range_unchanged() {
        let a = insert("items", 0, json!("x"));
        let b = delete("items", 1, 3);
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn delete_at_or_after_insert_shifts_right() {
        let a = delete("items", 2, 1);
        let b = insert("items", 2, json!({"id": 1}));
        assert_eq!(transform(&a, &b), Some(delete("items", 3, 1)));

        let a = delete("text", 4, 2);
        let b = insert("text", 0, json!("hi"));
        assert_eq!(transform(&a, &b), Some(delete("text", 6, 2)));
    }

    #[test]
    fn delete_before_insert_unchanged() {
        let a = delete("items", 1, 1);
        let b = insert("items", 3, json!("x"));
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn update_after_insert_shifts_right() {
        let a = update_at("items", 2, json!("v"));
        let b = insert("items", 0, json!({"id": 1}));
        assert_eq!(transform(&a, &b), Some(update_at("items", 3, json!("v"))));
    }

    #[test]
    fn update_before_insert_unchanged() {
        let a = update_at("items", 0, json!("v"));
        let b = insert("items", 2, json!("x"));
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn update_inside_delete_range_is_annihilated() {
        let a = update_at("items", 1, json!("v"));
        let b = delete("items", 0, 2);
        assert_eq!(transform(&a, &b), None);
    }

    #[test]
    fn update_past_delete_range_shifts_left() {
        let a = update_at("items", 3, json!("v"));
        let b = delete("items", 0, 2);
        assert_eq!(transform(&a, &b), Some(update_at("items", 1, json!("v"))));
    }

    #[test]
    fn update_update_is_last_writer_wins() {
        let a = Op::Update {
            path: "title".to_string(),
            position: None,
            value: json!("second"),
        };
        let b = Op::Update {
            path: "title".to_string(),
            position: None,
            value: json!("first"),
        };
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn replace_replace_is_last_writer_wins() {
        let a = Op::Replace {
            path: "cfg".to_string(),
            value: json!({"v": 2}),
        };
        let b = Op::Replace {
            path: "cfg".to_string(),
            value: json!({"v": 1}),
        };
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn positionless_update_against_insert_unchanged() {
        let a = Op::Update {
            path: "items".to_string(),
            position: None,
            value: json!([]),
        };
        let b = insert("items", 0, json!("x"));
        assert_eq!(transform(&a, &b), Some(a.clone()));
    }

    #[test]
    fn unknown_pairings_pass_through() {
        let a = insert("items", 1, json!("x"));
        assert_eq!(transform(&a, &Op::Unknown), Some(a.clone()));
        assert_eq!(transform(&Op::Unknown, &a), Some(Op::Unknown));

        let replace = Op::Replace {
            path: "items".to_string(),
            value: json!([]),
        };
        // replace in a cross-type pairing has no rule.
        assert_eq!(transform(&replace, &a), Some(replace.clone()));
    }
}
