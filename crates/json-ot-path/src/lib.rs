//! Dot-delimited path utilities.
//!
//! This crate implements helper functions for addressing values inside a
//! nested JSON tree with dot-delimited key paths (e.g. `"items.2.name"`).
//!
//! # Example
//!
//! ```
//! use json_ot_path::{parse_dot_path, format_dot_path, get};
//!
//! // Parse a dot path string into path components
//! let path = parse_dot_path("items.2.name");
//! assert_eq!(path, vec!["items".to_string(), "2".to_string(), "name".to_string()]);
//!
//! // Format path components back to a dot path string
//! let dotted = format_dot_path(&path);
//! assert_eq!(dotted, "items.2.name");
//!
//! // Get a value from a JSON document
//! let doc = serde_json::json!({"items": [0, 1, {"name": "x"}]});
//! let val = get(&doc, &path);
//! assert_eq!(val, Some(&serde_json::json!("x")));
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

/// A parsed path: one string per tree level.
pub type Path = Vec<String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("OUT_OF_BOUNDS")]
    OutOfBounds,
}

/// Parse a dot path string into path components.
///
/// The empty string denotes the document root and parses to an empty vec.
/// There is no escape syntax: keys containing literal dots cannot be
/// addressed.
///
/// # Example
///
/// ```
/// use json_ot_path::parse_dot_path;
///
/// assert_eq!(parse_dot_path(""), Vec::<String>::new());
/// assert_eq!(parse_dot_path("foo"), vec!["foo"]);
/// assert_eq!(parse_dot_path("foo.bar.0"), vec!["foo", "bar", "0"]);
/// ```
pub fn parse_dot_path(path: &str) -> Path {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').map(|s| s.to_string()).collect()
}

/// Format path components into a dot path string.
///
/// Returns an empty string for the root path (empty components).
///
/// # Example
///
/// ```
/// use json_ot_path::format_dot_path;
///
/// assert_eq!(format_dot_path(&[]), "");
/// assert_eq!(format_dot_path(&["foo".to_string(), "0".to_string()]), "foo.0");
/// ```
pub fn format_dot_path(path: &[String]) -> String {
    path.join(".")
}

/// Check if a path points to the root value.
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// Check if a string represents a valid non-negative integer array index.
///
/// # Example
///
/// ```
/// use json_ot_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("1.5"));
/// assert!(!is_valid_index("abc"));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be a leading zero unless the index is just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Get a value from a JSON document by path.
///
/// Returns `None` if the path doesn't exist, an array index is invalid or
/// out of range, or the path traverses through a scalar.
///
/// # Example
///
/// ```
/// use json_ot_path::{get, parse_dot_path};
/// use serde_json::json;
///
/// let doc = json!({"foo": {"bar": 42}});
/// assert_eq!(get(&doc, &parse_dot_path("foo.bar")), Some(&json!(42)));
/// assert_eq!(get(&doc, &parse_dot_path("missing")), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                if !is_valid_index(path_step) {
                    return None;
                }
                let idx: usize = path_step.parse().ok()?;
                current = arr.get(idx)?;
            }
            Value::Object(map) => {
                current = map.get(path_step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
///
/// Same resolution rules as [`get`].
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                if !is_valid_index(path_step) {
                    return None;
                }
                let idx: usize = path_step.parse().ok()?;
                current = arr.get_mut(idx)?;
            }
            Value::Object(map) => {
                current = map.get_mut(path_step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Set a value in a JSON document by path, creating missing intermediate
/// objects along the way.
///
/// An empty path replaces the root. An intermediate step that resolves to a
/// scalar is replaced by a fresh object so the walk can continue. Steps into
/// an existing array must be valid in-range indices; the write is refused
/// otherwise.
///
/// # Example
///
/// ```
/// use json_ot_path::{set, parse_dot_path};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set(&mut doc, &parse_dot_path("a.b"), json!(1)).unwrap();
/// assert_eq!(doc, json!({"a": {"b": 1}}));
/// ```
pub fn set(val: &mut Value, path: &[String], new_val: Value) -> Result<(), PathError> {
    if path.is_empty() {
        *val = new_val;
        return Ok(());
    }

    let (walk, last) = path.split_at(path.len() - 1);
    let last = &last[0];

    let mut current = val;
    for path_step in walk {
        // A scalar in the middle of the walk is replaced by a fresh object
        // so the walk can continue.
        if !current.is_object() && !current.is_array() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Array(arr) => {
                if !is_valid_index(path_step) {
                    return Err(PathError::InvalidIndex);
                }
                let idx: usize = path_step.parse().map_err(|_| PathError::InvalidIndex)?;
                arr.get_mut(idx).ok_or(PathError::OutOfBounds)?
            }
            Value::Object(map) => map
                .entry(path_step.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return Err(PathError::InvalidIndex),
        };
    }

    match current {
        Value::Array(arr) => {
            if !is_valid_index(last) {
                return Err(PathError::InvalidIndex);
            }
            let idx: usize = last.parse().map_err(|_| PathError::InvalidIndex)?;
            if idx >= arr.len() {
                return Err(PathError::OutOfBounds);
            }
            arr[idx] = new_val;
        }
        Value::Object(map) => {
            map.insert(last.clone(), new_val);
        }
        other => {
            let mut map = Map::new();
            map.insert(last.clone(), new_val);
            *other = Value::Object(map);
        }
    }

    Ok(())
}
