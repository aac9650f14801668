//! Translation of filter/patch structures into store documents.
//!
//! Filters become conjunctive query documents (`{field: value}` or
//! `{field: {"$op": value}}`), patches become `{"$set": {...}}` update
//! documents that always stamp `updated_at`.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::criteria::{ComparisonOperator, TodoFilter, TodoPatch};
use crate::error::TodoError;
use crate::model::{format_date, Status};
use crate::object_id::ObjectId;
use crate::store::{Document, SortDirection, SortKey};

/// Persisted field names.
pub mod fields {
    pub const ID: &str = "_id";
    pub const TITLE: &str = "title";
    pub const STATUS: &str = "status";
    pub const ACTIVE_AT: &str = "active_at";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

pub fn operator_key(operator: ComparisonOperator) -> &'static str {
    match operator {
        ComparisonOperator::Eq => "$eq",
        ComparisonOperator::Gt => "$gt",
        ComparisonOperator::Gte => "$gte",
        ComparisonOperator::Lt => "$lt",
        ComparisonOperator::Lte => "$lte",
    }
}

pub fn id_filter(id: ObjectId) -> Document {
    let mut document = Map::new();
    document.insert(fields::ID.to_string(), Value::String(id.to_hex()));
    document
}

pub fn filter_document(filter: &TodoFilter) -> Document {
    let mut document = Map::new();
    if let Some(id) = filter.id {
        document.insert(fields::ID.to_string(), Value::String(id.to_hex()));
    }
    if let Some(title) = &filter.title {
        document.insert(fields::TITLE.to_string(), Value::String(title.clone()));
    }
    if let Some(status) = filter.status {
        document.insert(fields::STATUS.to_string(), status_value(status));
    }
    if let Some(criterion) = filter.active_at {
        let mut comparison = Map::new();
        comparison.insert(
            operator_key(criterion.operator).to_string(),
            date_value(criterion.date),
        );
        document.insert(fields::ACTIVE_AT.to_string(), Value::Object(comparison));
    }
    document
}

/// Builds the `$set` document for `patch`, or `NothingToUpdate` when only the
/// id is present.
pub fn update_document(patch: &TodoPatch, now: DateTime<Utc>) -> Result<Document, TodoError> {
    if patch.is_empty() {
        return Err(TodoError::NothingToUpdate);
    }

    let mut set = Map::new();
    if let Some(title) = &patch.title {
        set.insert(fields::TITLE.to_string(), Value::String(title.clone()));
    }
    if let Some(date) = patch.active_at {
        set.insert(fields::ACTIVE_AT.to_string(), date_value(date));
    }
    if let Some(status) = patch.status {
        set.insert(fields::STATUS.to_string(), status_value(status));
    }
    set.insert(fields::UPDATED_AT.to_string(), timestamp_value(now));

    let mut document = Map::new();
    document.insert("$set".to_string(), Value::Object(set));
    Ok(document)
}

/// Newest first; equal creation times fall back to ascending id.
pub fn list_sort() -> Vec<SortKey> {
    vec![
        SortKey::new(fields::CREATED_AT, SortDirection::Descending),
        SortKey::new(fields::ID, SortDirection::Ascending),
    ]
}

fn status_value(status: Status) -> Value {
    Value::String(status.as_str().to_string())
}

fn date_value(date: NaiveDate) -> Value {
    Value::String(format_date(date))
}

fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::from(at.timestamp_micros())
}
