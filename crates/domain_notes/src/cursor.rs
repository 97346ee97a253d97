//! Keyset pagination cursor
//!
//! A cursor captures the `(created_at, id)` ordering key of the last note on a
//! page. The next page holds every note strictly below that key in
//! `(created_at DESC, id DESC)` order.
//!
//! # Wire Format
//!
//! ```text
//! cursor_time=2024-03-01T10:15:30.123456Z&cursor_id=42
//! ```
//!
//! The timestamp keeps every sub-second digit so decoding yields the exact
//! key that was encoded; truncating it would skip or repeat rows that share
//! the same second.
//!
//! RFC3339 only covers years 0000 through 9999. Timestamps outside that range
//! are written as Unix seconds and nanoseconds instead:
//!
//! ```text
//! cursor_time=253402300800.000000000&cursor_id=42
//! ```

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NotesError;
use crate::note::{Note, NoteId};

const TIME_KEY: &str = "cursor_time";
const ID_KEY: &str = "cursor_id";
const FIELD: &str = "cursor";

/// Position in the `(created_at, id)` total order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: NoteId,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: NoteId) -> Self {
        Self { created_at, id }
    }

    /// Cursor pointing just past the given note
    pub fn after(note: &Note) -> Self {
        Self::new(note.created_at, note.id)
    }

    /// Serializes the cursor into its opaque token
    pub fn encode(&self) -> String {
        format!(
            "{}={}&{}={}",
            TIME_KEY,
            encode_time(&self.created_at),
            ID_KEY,
            self.id
        )
    }

    /// Parses a token previously produced by [`Cursor::encode`]
    ///
    /// # Errors
    ///
    /// Returns `NotesError::Validation` for any malformed token
    pub fn decode(token: &str) -> Result<Self, NotesError> {
        let mut created_at = None;
        let mut id = None;

        for pair in token.trim().split('&') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(format!("malformed segment '{}'", pair)))?;

            match key {
                TIME_KEY if created_at.is_none() => {
                    created_at = Some(decode_time(value)?);
                }
                ID_KEY if id.is_none() => {
                    let parsed = value
                        .parse::<i64>()
                        .map_err(|_| invalid(format!("bad id '{}'", value)))?;
                    if parsed < 0 {
                        return Err(invalid(format!("negative id {}", parsed)));
                    }
                    id = Some(NoteId::new(parsed));
                }
                TIME_KEY | ID_KEY => return Err(invalid(format!("duplicate key '{}'", key))),
                _ => return Err(invalid(format!("unknown key '{}'", key))),
            }
        }

        match (created_at, id) {
            (Some(created_at), Some(id)) => Ok(Self { created_at, id }),
            (None, _) => Err(invalid(format!("missing {}", TIME_KEY))),
            (_, None) => Err(invalid(format!("missing {}", ID_KEY))),
        }
    }

    /// True when `note` sorts strictly after this cursor in descending order
    pub fn precedes(&self, note: &Note) -> bool {
        (note.created_at, note.id) < (self.created_at, self.id)
    }
}

fn encode_time(ts: &DateTime<Utc>) -> String {
    if (0..=9999).contains(&ts.year()) {
        ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    } else {
        format!("{}.{:09}", ts.timestamp(), ts.timestamp_subsec_nanos())
    }
}

fn decode_time(value: &str) -> Result<DateTime<Utc>, NotesError> {
    if value.contains('T') {
        return DateTime::parse_from_rfc3339(value)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|e| invalid(format!("bad timestamp '{}': {}", value, e)));
    }

    let bad = || invalid(format!("bad timestamp '{}'", value));
    let (secs, nanos) = value.split_once('.').ok_or_else(bad)?;
    if nanos.len() != 9 || !nanos.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let secs = secs.parse::<i64>().map_err(|_| bad())?;
    let nanos = nanos.parse::<u32>().map_err(|_| bad())?;
    Utc.timestamp_opt(secs, nanos).single().ok_or_else(bad)
}

fn invalid(reason: String) -> NotesError {
    NotesError::validation_field(format!("invalid cursor: {}", reason), FIELD)
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cursor::decode(s)
    }
}
