//! The `Todo` entity and the input rules shared by create and update.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::TodoError;
use crate::object_id::ObjectId;

/// Longest accepted title, counted in Unicode scalar values.
pub const TITLE_MAX_CHARS: usize = 200;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TodoError;

    /// Case-insensitive: `done`, `Done` and `DONE` are the same status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ACTIVE") {
            Ok(Status::Active)
        } else if s.eq_ignore_ascii_case("DONE") {
            Ok(Status::Done)
        } else {
            Err(TodoError::UnknownStatus(s.to_string()))
        }
    }
}

/// A stored todo item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: ObjectId,
    pub title: String,
    pub status: Status,
    pub active_at: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn active_at_string(&self) -> String {
        format_date(self.active_at)
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.active_at.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Fields the caller decides when creating a todo. The store assigns the id
/// and the repository stamps `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub status: Status,
    pub active_at: NaiveDate,
}

pub fn validate_title(title: &str) -> Result<(), TodoError> {
    let length = title.chars().count();
    if length > TITLE_MAX_CHARS {
        return Err(TodoError::TitleTooLong {
            length,
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// chrono alone accepts unpadded fields such as `2023-8-4`, so the shape is
/// checked byte by byte before handing the string over.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TodoError> {
    let invalid = || TodoError::InvalidDateFormat(raw.to_string());
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
