//! Structural comparison of two object snapshots.
//!
//! Both sides are serialized to `serde_json::Value` and walked together. Every
//! leaf that differs is reported once, keyed by its field path.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// A single differing field. `None` means the field is absent on that side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    pub path: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} != {}",
            self.path,
            display_value(self.old.as_ref()),
            display_value(self.new.as_ref())
        )
    }
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "<none>".to_string(),
    }
}

/// Differences between `old` and `new`; empty when they are structurally equal.
pub fn diff<T: Serialize + ?Sized>(old: &T, new: &T) -> Result<Vec<FieldDiff>> {
    let old = serde_json::to_value(old)?;
    let new = serde_json::to_value(new)?;
    Ok(diff_values(&old, &new))
}

pub fn diff_values(old: &Value, new: &Value) -> Vec<FieldDiff> {
    let mut out = Vec::new();
    walk("", Some(old), Some(new), &mut out);
    out
}

fn walk(path: &str, old: Option<&Value>, new: Option<&Value>, out: &mut Vec<FieldDiff>) {
    match (old, new) {
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            // union of both key sets, sorted
            let keys: std::collections::BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                walk(&join_key(path, key), a.get(key), b.get(key), out);
            }
        }
        (Some(Value::Array(a)), Some(Value::Array(b))) => {
            for i in 0..a.len().max(b.len()) {
                walk(&format!("{}[{}]", path, i), a.get(i), b.get(i), out);
            }
        }
        (Some(a), Some(b)) if a == b => {}
        (None, None) => {}
        _ => out.push(FieldDiff {
            path: if path.is_empty() { ".".to_string() } else { path.to_string() },
            old: old.cloned(),
            new: new.cloned(),
        }),
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}
