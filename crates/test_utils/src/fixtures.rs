//! Pre-built Test Fixtures
//!
//! Ready-made note requests. The numbered fixtures are predictable; the
//! `fake` ones vary per run but always pass validation.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;

use domain_notes::{CreateNoteRequest, Note, NoteId};

/// Fixture for note requests
pub struct NoteFixtures;

impl NoteFixtures {
    /// A request with a fixed title and content
    pub fn request(title: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            title: title.to_string(),
            content: format!("content of {}", title),
        }
    }

    /// `Note 1` through `Note {count}`, in insertion order
    pub fn numbered(count: usize) -> Vec<CreateNoteRequest> {
        (1..=count).map(|i| Self::request(&format!("Note {}", i))).collect()
    }

    /// A request with random lorem text
    pub fn random() -> CreateNoteRequest {
        let title: String = Sentence(1..6).fake();
        let content: String = Paragraph(1..4).fake();
        CreateNoteRequest { title, content }
    }

    /// `count` random requests
    pub fn random_batch(count: usize) -> Vec<CreateNoteRequest> {
        (0..count).map(|_| Self::random()).collect()
    }

    /// A title exactly at the column limit
    pub fn max_length_title() -> CreateNoteRequest {
        CreateNoteRequest {
            title: "t".repeat(255),
            content: "long title".to_string(),
        }
    }
}

/// Fixture for stored note records
pub struct RecordFixtures;

impl RecordFixtures {
    /// Fixed reference instant (2024-01-15 10:30:00 UTC)
    pub fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    /// A stored note as the store would return it
    pub fn note(id: i64, title: &str) -> Note {
        let at = Self::reference_time();
        Note {
            id: NoteId::new(id),
            title: title.to_string(),
            content: format!("content of {}", title),
            created_at: at,
            updated_at: at,
        }
    }
}
