//! Evaluation of document-store filter fragments against JSON documents.
//!
//! Supported: implicit equality, `$in`, `$nin`, `$ne`, `$gt`, `$gte`, `$lt`,
//! `$lte`, `$exists`, `$or` and `$and`. Dotted paths descend through arrays,
//! and a condition on an array field holds when any element satisfies it.

use std::cmp::Ordering;

use anyhow::{Context, bail};
use serde_json::{Map, Value};

/// Whether `doc` satisfies every fragment.
///
/// # Errors
/// Fails on an unsupported operator.
pub fn matches_all(doc: &Value, fragments: &[Value]) -> anyhow::Result<bool> {
    for fragment in fragments {
        if !matches(doc, fragment)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether `doc` satisfies one fragment (an object of path -> condition).
///
/// # Errors
/// Fails on an unsupported operator.
pub fn matches(doc: &Value, fragment: &Value) -> anyhow::Result<bool> {
    let clauses = fragment
        .as_object()
        .context("filter fragment must be an object")?;

    for (key, condition) in clauses {
        let ok = match key.as_str() {
            "$or" => {
                let mut any = false;
                for branch in as_array(key, condition)? {
                    if matches(doc, branch)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$and" => matches_all(doc, as_array(key, condition)?)?,
            path => matches_path(&leaves(doc, path), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn as_array<'a>(op: &str, value: &'a Value) -> anyhow::Result<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .with_context(|| format!("{op} expects an array"))
}

/// Values found at a dotted path, with arrays also contributing their elements.
fn leaves<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => next.extend(map.get(segment)),
                Value::Array(items) => next.extend(
                    items
                        .iter()
                        .filter_map(|item| item.as_object().and_then(|m| m.get(segment))),
                ),
                _ => {}
            }
        }
        current = next;
    }

    let mut out = Vec::with_capacity(current.len());
    for value in current {
        out.push(value);
        if let Value::Array(items) = value {
            out.extend(items.iter());
        }
    }
    out
}

fn is_operator_object(condition: &Value) -> Option<&Map<String, Value>> {
    condition
        .as_object()
        .filter(|m| !m.is_empty() && m.keys().all(|k| k.starts_with('$')))
}

fn matches_path(leaves: &[&Value], condition: &Value) -> anyhow::Result<bool> {
    let Some(operators) = is_operator_object(condition) else {
        return Ok(leaves.iter().any(|v| *v == condition));
    };

    for (op, operand) in operators {
        let ok = match op.as_str() {
            "$in" => {
                let options = as_array(op, operand)?;
                leaves.iter().any(|v| options.contains(v))
            }
            "$nin" => {
                let options = as_array(op, operand)?;
                !leaves.iter().any(|v| options.contains(v))
            }
            "$ne" => !leaves.iter().any(|v| *v == operand),
            "$gt" => any_cmp(leaves, operand, Ordering::is_gt),
            "$gte" => any_cmp(leaves, operand, Ordering::is_ge),
            "$lt" => any_cmp(leaves, operand, Ordering::is_lt),
            "$lte" => any_cmp(leaves, operand, Ordering::is_le),
            "$exists" => {
                let wanted = operand
                    .as_bool()
                    .context("$exists expects a boolean")?;
                leaves.iter().any(|v| !v.is_null()) == wanted
            }
            other => bail!("unsupported filter operator '{other}'"),
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_cmp(leaves: &[&Value], operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    leaves
        .iter()
        .filter_map(|v| compare_scalars(v, operand))
        .any(accept)
}

/// Order of two scalars of the same kind; `None` across kinds.
#[must_use]
pub fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort order of a document field: missing and null first, then by value.
#[must_use]
pub fn compare_at(a: &Value, b: &Value, path: &str) -> Ordering {
    fn first<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
        leaves(doc, path).into_iter().find(|v| !v.is_null())
    }
    match (first(a, path), first(b, path)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_scalars(x, y).unwrap_or(Ordering::Equal),
    }
}
