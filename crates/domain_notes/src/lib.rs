//! Notes Domain
//!
//! Records, requests and the repository contract for a note-taking store.
//!
//! # Pagination
//!
//! Listing uses keyset pagination over the composite key
//! `(created_at DESC, id DESC)`. Timestamps alone are not unique, so the id
//! breaks ties and makes the order total. A page hands back an opaque
//! [`Cursor`] token that the caller echoes to get the following page.
//!
//! # Examples
//!
//! ```rust
//! use domain_notes::{Cursor, NoteId, PaginationParams};
//! use chrono::{TimeZone, Utc};
//!
//! let cursor = Cursor::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(), NoteId::new(17));
//! let token = cursor.encode();
//!
//! let params = PaginationParams::from_query(Some(20), Some(&token)).unwrap();
//! assert_eq!(params.cursor(), Some(&cursor));
//! ```

pub mod note;
pub mod cursor;
pub mod pagination;
pub mod context;
pub mod stats;
pub mod error;
pub mod ports;

pub use note::{
    CreateNoteRequest, DeleteOutcome, Note, NoteId, SearchQuery, UpdateNoteRequest,
    DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT,
};
pub use cursor::Cursor;
pub use pagination::{NotesPage, PaginationParams, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use context::{CallContext, CancelHandle};
pub use stats::{PoolStats, QueryStats, StatementStats, StoreStats};
pub use error::{CancelReason, NotesError, NotesResult};
pub use ports::NotesPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockNotesPort;
