//! Keyset pagination
//!
//! Pages are read in `(created_at DESC, id DESC)` order. Each query fetches
//! `limit + 1` rows: the extra row only signals that another page exists and
//! is trimmed before the page is returned. The cost of a page does not depend
//! on how deep into the listing it sits, unlike `OFFSET` pagination.

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::error::{NotesError, NotesResult};
use crate::note::Note;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page a caller may request
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Parameters for listing notes
///
/// Deserialized input goes through the same bounds check as [`PaginationParams::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPaginationParams")]
pub struct PaginationParams {
    limit: u32,
    cursor: Option<Cursor>,
}

#[derive(Deserialize)]
struct RawPaginationParams {
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    cursor: Option<Cursor>,
}

impl TryFrom<RawPaginationParams> for PaginationParams {
    type Error = NotesError;

    fn try_from(raw: RawPaginationParams) -> Result<Self, Self::Error> {
        let params = Self::new(raw.limit.unwrap_or(DEFAULT_PAGE_LIMIT))?;
        Ok(match raw.cursor {
            Some(cursor) => params.with_cursor(cursor),
            None => params,
        })
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
        }
    }
}

impl PaginationParams {
    /// First page with the given size
    ///
    /// # Errors
    ///
    /// Returns a validation error when `limit` is outside `1..=100`
    pub fn new(limit: u32) -> NotesResult<Self> {
        check_limit(limit)?;
        Ok(Self { limit, cursor: None })
    }

    /// Builds parameters from raw caller input
    pub fn from_query(limit: Option<u32>, cursor: Option<&str>) -> NotesResult<Self> {
        let params = Self::new(limit.unwrap_or(DEFAULT_PAGE_LIMIT))?;
        match cursor.map(str::trim).filter(|c| !c.is_empty()) {
            Some(token) => Ok(params.with_cursor(Cursor::decode(token)?)),
            None => Ok(params),
        }
    }

    /// Continues after the given cursor
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Re-checks the page size bound
    pub fn validate(&self) -> NotesResult<()> {
        check_limit(self.limit)
    }

    /// Number of rows to request from the store, one past the page size
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }
}

fn check_limit(limit: u32) -> NotesResult<()> {
    if (1..=MAX_PAGE_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(NotesError::validation_field(
            format!("limit must be between 1 and {}", MAX_PAGE_LIMIT),
            "limit",
        ))
    }
}

/// One page of notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub has_next: bool,
    /// Token for the next page; present exactly when `has_next` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl NotesPage {
    /// Builds a page from rows fetched with [`PaginationParams::fetch_limit`]
    ///
    /// `rows` must already be in `(created_at DESC, id DESC)` order.
    pub fn from_overfetch(mut rows: Vec<Note>, limit: u32) -> Self {
        let limit = limit as usize;
        let has_next = rows.len() > limit;
        if has_next {
            rows.truncate(limit);
        }

        let cursor = if has_next {
            rows.last().map(|last| Cursor::after(last).encode())
        } else {
            None
        };

        Self {
            notes: rows,
            has_next: cursor.is_some(),
            cursor,
        }
    }

    /// Parameters for the page following this one, if any
    pub fn next_params(&self, limit: u32) -> NotesResult<Option<PaginationParams>> {
        match &self.cursor {
            Some(token) => {
                let cursor = Cursor::decode(token)?;
                Ok(Some(PaginationParams::new(limit)?.with_cursor(cursor)))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteId;
    use chrono::{Duration, TimeZone, Utc};

    fn notes_desc(count: i64) -> Vec<Note> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (1..=count)
            .rev()
            .map(|i| Note {
                id: NoteId::new(i),
                title: format!("Note {}", i),
                content: "body".to_string(),
                created_at: base + Duration::seconds(i),
                updated_at: base + Duration::seconds(i),
            })
            .collect()
    }

    #[test]
    fn test_limit_bounds() {
        assert!(PaginationParams::new(0).is_err());
        assert!(PaginationParams::new(101).is_err());
        assert_eq!(PaginationParams::new(100).unwrap().fetch_limit(), 101);
        assert_eq!(PaginationParams::default().limit(), DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn test_overfetch_trims_and_sets_cursor() {
        let page = NotesPage::from_overfetch(notes_desc(4), 3);
        assert_eq!(page.notes.len(), 3);
        assert!(page.has_next);

        let cursor = Cursor::decode(page.cursor.as_deref().unwrap()).unwrap();
        assert_eq!(cursor.id, NoteId::new(2));
    }

    #[test]
    fn test_exact_fit_has_no_next() {
        let page = NotesPage::from_overfetch(notes_desc(3), 3);
        assert_eq!(page.notes.len(), 3);
        assert!(!page.has_next);
        assert!(page.cursor.is_none());
    }

    #[test]
    fn test_empty_page() {
        let page = NotesPage::from_overfetch(Vec::new(), 20);
        assert!(page.notes.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn test_deserialize_enforces_limit_bounds() {
        assert!(serde_json::from_str::<PaginationParams>(r#"{"limit":0,"cursor":null}"#).is_err());
        assert!(serde_json::from_str::<PaginationParams>(r#"{"limit":5000}"#).is_err());

        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PaginationParams::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_serialized_params_deserialize_back() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let params = PaginationParams::new(7)
            .unwrap()
            .with_cursor(Cursor::new(ts, NoteId::new(3)));
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(serde_json::from_str::<PaginationParams>(&json).unwrap(), params);
    }

    #[test]
    fn test_from_query_blank_cursor_is_first_page() {
        let params = PaginationParams::from_query(None, Some("  ")).unwrap();
        assert!(params.cursor().is_none());
        assert!(PaginationParams::from_query(Some(5), Some("nope")).is_err());
    }
}
