//! Optional-field filter and patch structures.
//!
//! Presence is the signal: `None` means "no constraint" in a filter and
//! "leave unchanged" in a patch. `Some(String::new())` is a real value and is
//! never confused with absence.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::TodoError;
use crate::model::Status;
use crate::object_id::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "EQ",
            ComparisonOperator::Gt => "GT",
            ComparisonOperator::Gte => "GTE",
            ComparisonOperator::Lt => "LT",
            ComparisonOperator::Lte => "LTE",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EQ" => Ok(ComparisonOperator::Eq),
            "GT" => Ok(ComparisonOperator::Gt),
            "GTE" => Ok(ComparisonOperator::Gte),
            "LT" => Ok(ComparisonOperator::Lt),
            "LTE" => Ok(ComparisonOperator::Lte),
            _ => Err(TodoError::UnknownComparisonOperator(s.to_string())),
        }
    }
}

/// `activeAt <op> date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCriterion {
    pub operator: ComparisonOperator,
    pub date: NaiveDate,
}

impl DateCriterion {
    pub fn new(operator: ComparisonOperator, date: NaiveDate) -> Self {
        Self { operator, date }
    }
}

/// Criteria for listing todos. Every field is an independent, optional
/// conjunct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub id: Option<ObjectId>,
    pub title: Option<String>,
    pub status: Option<Status>,
    pub active_at: Option<DateCriterion>,
}

impl TodoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_active_at(mut self, operator: ComparisonOperator, date: NaiveDate) -> Self {
        self.active_at = Some(DateCriterion::new(operator, date));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.title.is_none() && self.status.is_none() && self.active_at.is_none()
    }
}

/// Fields to overwrite on the todo identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPatch {
    pub id: ObjectId,
    pub title: Option<String>,
    pub status: Option<Status>,
    pub active_at: Option<NaiveDate>,
}

impl TodoPatch {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            title: None,
            status: None,
            active_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_active_at(mut self, date: NaiveDate) -> Self {
        self.active_at = Some(date);
        self
    }

    /// True when nothing besides the id is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none() && self.active_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parses_known_names() {
        assert_eq!("EQ".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Eq);
        assert_eq!("gte".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Gte);
        assert_eq!("Lt".parse::<ComparisonOperator>().unwrap(), ComparisonOperator::Lt);
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let err = "NE".parse::<ComparisonOperator>().unwrap_err();
        assert!(matches!(err, TodoError::UnknownComparisonOperator(op) if op == "NE"));
        assert!("".parse::<ComparisonOperator>().is_err());
    }

    #[test]
    fn default_filter_is_empty() {
        assert!(TodoFilter::new().is_empty());
        assert!(!TodoFilter::new().with_status(Status::Done).is_empty());
    }

    #[test]
    fn empty_title_patch_is_not_an_empty_patch() {
        let patch = TodoPatch::new(ObjectId::new()).with_title("");
        assert!(!patch.is_empty());
        assert_eq!(patch.title.as_deref(), Some(""));
    }

    #[test]
    fn id_only_patch_is_empty() {
        assert!(TodoPatch::new(ObjectId::new()).is_empty());
    }
}
