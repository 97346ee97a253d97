//! Custom Test Assertions
//!
//! Assertion helpers for note listings that report which neighbours broke
//! an ordering rule.

use domain_notes::{Note, NoteId};

/// Asserts notes are in strictly descending `(created_at, id)` order
///
/// # Panics
///
/// Panics at the first adjacent pair that is equal or ascending
pub fn assert_strictly_descending(notes: &[Note]) {
    for pair in notes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            (a.created_at, a.id) > (b.created_at, b.id),
            "Notes out of order: ({}, {}) precedes ({}, {})",
            a.created_at,
            a.id,
            b.created_at,
            b.id
        );
    }
}

/// Asserts notes are sorted by ascending id
pub fn assert_ascending_ids(notes: &[Note]) {
    let ids: Vec<NoteId> = notes.iter().map(|n| n.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted, "Expected ascending ids");
}

/// Asserts no id appears twice
pub fn assert_unique_ids(notes: &[Note]) {
    let mut ids: Vec<NoteId> = notes.iter().map(|n| n.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), notes.len(), "Duplicate note ids in result");
}
