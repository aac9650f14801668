//! Query matching, update application and ordering over JSON documents.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::error::StoreError;
use super::{Document, SortDirection, SortKey};

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: first by type, then by value.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            left.to_string().cmp(&right.to_string())
        }
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

fn field<'a>(document: &'a Document, name: &str) -> &'a Value {
    document.get(name).unwrap_or(&Value::Null)
}

fn is_operator_document(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) if !map.is_empty() && map.keys().all(|key| key.starts_with('$')) => {
            Some(map)
        }
        _ => None,
    }
}

fn compare_with(operator: &str, actual: &Value, expected: &Value) -> Result<bool, StoreError> {
    if operator == "$eq" {
        return Ok(compare_values(actual, expected) == Ordering::Equal);
    }
    // Range operators only compare values of the same type.
    let comparable = type_rank(actual) == type_rank(expected);
    let ordering = compare_values(actual, expected);
    let matched = match operator {
        "$gt" => ordering == Ordering::Greater,
        "$gte" => ordering != Ordering::Less,
        "$lt" => ordering == Ordering::Less,
        "$lte" => ordering != Ordering::Greater,
        other => return Err(StoreError::UnsupportedOperator(other.to_string())),
    };
    Ok(comparable && matched)
}

/// True if `document` satisfies every clause of `filter`.
pub fn matches(document: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (name, expected) in filter {
        let actual = field(document, name);
        let satisfied = match is_operator_document(expected) {
            Some(operators) => {
                let mut all = true;
                for (operator, operand) in operators {
                    all &= compare_with(operator, actual, operand)?;
                }
                all
            }
            None => compare_values(actual, expected) == Ordering::Equal,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Applies a `{"$set": {...}}` update in place.
pub fn apply_update(document: &mut Document, update: &Document, id_field: &str) -> Result<(), StoreError> {
    for (operator, body) in update {
        if operator != "$set" {
            return Err(StoreError::UnsupportedOperator(operator.clone()));
        }
        let Value::Object(assignments) = body else {
            return Err(StoreError::MalformedDocument("$set expects an object".to_string()));
        };
        for (name, value) in assignments {
            if name == id_field && field(document, name) != value {
                return Err(StoreError::MalformedDocument(format!("{id_field} is immutable")));
            }
            document.insert(name.clone(), value.clone());
        }
    }
    Ok(())
}

pub fn sort_documents(documents: &mut [Document], sort: &[SortKey]) {
    documents.sort_by(|left, right| {
        sort.iter()
            .map(|key| {
                let ordering = compare_values(field(left, &key.field), field(right, &key.field));
                match key.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
