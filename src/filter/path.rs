//! Dot-delimited field paths over nested JSON records.

use serde_json::{Map, Value};

/// Resolves a dotted path such as `user.details.city` against a record.
///
/// Numeric segments index into arrays. Any missing segment, an empty path,
/// or an empty segment (`user..name`) resolves to `None`.
pub fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = record;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` into `target` at `path`, creating intermediate objects.
///
/// Siblings sharing a prefix are merged into the same object, and numeric
/// segments descend into arrays already written by an earlier path. Returns
/// `false` when a scalar or a missing array slot is in the way. Blocking
/// values always predate the write, so nothing is created in that case.
pub(crate) fn insert_at(target: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    insert_into_object(target, &segments, value)
}

fn insert_into_object(map: &mut Map<String, Value>, segments: &[&str], value: Value) -> bool {
    match segments {
        [] => false,
        [leaf] => {
            map.insert(leaf.to_string(), value);
            true
        }
        [head, rest @ ..] => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            insert_into(slot, rest, value)
        }
    }
}

fn insert_into(slot: &mut Value, segments: &[&str], value: Value) -> bool {
    match slot {
        Value::Object(map) => insert_into_object(map, segments, value),
        Value::Array(items) => {
            let Some((head, rest)) = segments.split_first() else {
                return false;
            };
            let Some(child) = head.parse::<usize>().ok().and_then(|i| items.get_mut(i)) else {
                return false;
            };
            if rest.is_empty() {
                *child = value;
                true
            } else {
                insert_into(child, rest, value)
            }
        }
        _ => false,
    }
}
