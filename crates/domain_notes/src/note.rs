//! Note records and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{NotesError, NotesResult};

/// Maximum title length accepted by the store (`VARCHAR(255)`)
pub const MAX_TITLE_LEN: u64 = 255;

/// Default number of results returned by a search
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Upper bound on search results per call
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Store-assigned surrogate key of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Wraps a raw key value
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw key value
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Parses a caller-supplied id, reporting malformed input as a validation error
    pub fn parse(input: &str) -> NotesResult<Self> {
        input.parse()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(NoteId)
            .map_err(|_| NotesError::validation_field(format!("invalid note id '{}'", s), "id"))
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<NoteId> for i64 {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

/// A persisted note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

impl CreateNoteRequest {
    /// Builds a request and validates it
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> NotesResult<Self> {
        let request = Self {
            title: title.into(),
            content: content.into(),
        };
        request.validate()?;
        Ok(request)
    }
}

/// Request for a partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateNoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    /// An update touching only the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    /// An update touching only the content
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Title search parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchQuery")]
pub struct SearchQuery {
    pub text: String,
    pub limit: u32,
}

#[derive(Deserialize)]
struct RawSearchQuery {
    text: String,
    #[serde(default)]
    limit: Option<u32>,
}

impl TryFrom<RawSearchQuery> for SearchQuery {
    type Error = NotesError;

    fn try_from(raw: RawSearchQuery) -> Result<Self, Self::Error> {
        Self::new(raw.text, raw.limit)
    }
}

impl SearchQuery {
    /// Builds a search, defaulting the limit to 10 and bounding it to 1..=100
    pub fn new(text: impl Into<String>, limit: Option<u32>) -> NotesResult<Self> {
        let query = Self {
            text: text.into(),
            limit: limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        };
        query.validate()?;
        Ok(query)
    }

    /// Checks the text is present and the limit within 1..=100
    ///
    /// The fields are public, so stores call this again before querying.
    pub fn validate(&self) -> NotesResult<()> {
        if self.text.trim().is_empty() {
            return Err(NotesError::validation_field("search text is required", "q"));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.limit) {
            return Err(NotesError::validation_field(
                format!("limit must be between 1 and {}", MAX_SEARCH_LIMIT),
                "limit",
            ));
        }
        Ok(())
    }
}

/// Result of a delete by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    /// Maps an affected-row count to an outcome
    pub fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted
        }
    }

    pub fn is_deleted(self) -> bool {
        self == DeleteOutcome::Deleted
    }
}
