//! Behavioural tests for the notes port, run against the in-memory store

use std::collections::HashSet;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use domain_notes::{
    CallContext, CreateNoteRequest, Cursor, DeleteOutcome, MockNotesPort, NoteId, NotesError,
    NotesPort, PaginationParams, SearchQuery, UpdateNoteRequest,
};

fn request(title: &str) -> CreateNoteRequest {
    CreateNoteRequest::new(title, format!("content of {}", title)).unwrap()
}

async fn seeded(count: usize) -> MockNotesPort {
    let requests = (1..=count).map(|i| request(&format!("Note {}", i))).collect();
    MockNotesPort::with_notes(requests).await.unwrap()
}

// ============================================================================
// CRUD
// ============================================================================

mod crud {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let port = MockNotesPort::new();
        let ctx = CallContext::background();

        let created = port.create(&ctx, &request("Groceries")).await.unwrap();
        let fetched = port.get_by_id(&ctx, created.id).await.unwrap().unwrap();

        assert_eq!(fetched.title, "Groceries");
        assert_eq!(fetched.content, "content of Groceries");
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let port = seeded(2).await;
        let found = port
            .get_by_id(&CallContext::background(), NoteId::new(99))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_empty_update_is_a_read() {
        let port = seeded(1).await;
        let ctx = CallContext::background();
        let before = port.get_by_id(&ctx, NoteId::new(1)).await.unwrap().unwrap();

        let after = port
            .update(&ctx, NoteId::new(1), &UpdateNoteRequest::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_title_update_touches_only_title() {
        let port = seeded(1).await;
        let ctx = CallContext::background();
        let before = port.get_by_id(&ctx, NoteId::new(1)).await.unwrap().unwrap();

        let after = port
            .update(&ctx, NoteId::new(1), &UpdateNoteRequest::title("Renamed"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.title, "Renamed");
        assert_eq!(after.content, before.content);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let port = seeded(1).await;
        let result = port
            .update(&CallContext::background(), NoteId::new(5), &UpdateNoteRequest::content("x"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_empty_field() {
        let port = seeded(1).await;
        let err = port
            .update(&CallContext::background(), NoteId::new(1), &UpdateNoteRequest::title(""))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_delete_reports_not_found() {
        let port = seeded(1).await;
        let ctx = CallContext::background();

        assert_eq!(port.delete(&ctx, NoteId::new(1)).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(port.delete(&ctx, NoteId::new(1)).await.unwrap(), DeleteOutcome::NotFound);
        assert!(port.get_by_id(&ctx, NoteId::new(1)).await.unwrap().is_none());
    }
}

// ============================================================================
// Batch and search
// ============================================================================

mod lookups {
    use super::*;

    #[tokio::test]
    async fn test_batch_returns_existing_sorted() {
        let port = seeded(5).await;
        let ids = [NoteId::new(4), NoteId::new(42), NoteId::new(2), NoteId::new(4)];

        let notes = port.get_batch(&CallContext::background(), &ids).await.unwrap();
        let found: Vec<i64> = notes.iter().map(|n| n.id.value()).collect();

        assert_eq!(found, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_store() {
        let port = seeded(3).await;
        let (ctx, handle) = CallContext::cancellable();
        handle.cancel();

        // Even a cancelled context succeeds, because nothing is executed.
        let notes = port.get_batch(&ctx, &[]).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_titles_by_recency() {
        let mut requests: Vec<_> = (1..=5).map(|i| request(&format!("Note {}", i))).collect();
        requests.push(request("Other"));
        let port = MockNotesPort::with_notes(requests).await.unwrap();

        let query = SearchQuery::new("Note", None).unwrap();
        let found = port.search(&CallContext::background(), &query).await.unwrap();
        let titles: Vec<&str> = found.iter().map(|n| n.title.as_str()).collect();

        assert_eq!(titles, vec!["Note 5", "Note 4", "Note 3", "Note 2", "Note 1"]);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let port = seeded(5).await;
        let query = SearchQuery::new("note", Some(2)).unwrap();
        let found = port.search(&CallContext::background(), &query).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].title, "Note 5");
    }

    #[tokio::test]
    async fn test_search_rejects_unbounded_limit() {
        let port = seeded(3).await;
        let query = SearchQuery {
            text: "note".to_string(),
            limit: 5_000,
        };
        let err = port.search(&CallContext::background(), &query).await.unwrap_err();
        assert!(err.is_validation());
    }
}

// ============================================================================
// Pagination
// ============================================================================

mod pagination {
    use super::*;

    #[tokio::test]
    async fn test_twenty_five_notes_in_two_pages() {
        let port = seeded(25).await;
        let ctx = CallContext::background();

        let first = port.list(&ctx, &PaginationParams::new(20).unwrap()).await.unwrap();
        assert_eq!(first.notes.len(), 20);
        assert!(first.has_next);
        let token = first.cursor.clone().unwrap();
        assert!(!token.is_empty());

        let params = PaginationParams::from_query(Some(20), Some(&token)).unwrap();
        let second = port.list(&ctx, &params).await.unwrap();
        assert_eq!(second.notes.len(), 5);
        assert!(!second.has_next);
        assert!(second.cursor.is_none());
    }

    #[tokio::test]
    async fn test_cursor_past_everything_is_empty() {
        let port = seeded(3).await;
        let floor = Cursor::new(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(), NoteId::new(1));
        let params = PaginationParams::new(10).unwrap().with_cursor(floor);

        let page = port.list(&CallContext::background(), &params).await.unwrap();
        assert!(page.notes.is_empty());
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_list_honours_deadline() {
        let port = seeded(1).await;
        let ctx = CallContext::background().with_timeout(Duration::ZERO);
        let err = port.list(&ctx, &PaginationParams::default()).await.unwrap_err();
        assert!(matches!(err, NotesError::Cancelled { operation: "list", .. }));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_cursor_round_trip(
        // Roughly 4700 BC through year 250000, inside what TIMESTAMPTZ stores.
        secs in -210_000_000_000i64..7_900_000_000_000i64,
        micros in 0u32..1_000_000u32,
        id in 0i64..i64::MAX,
    ) {
        let ts = Utc.timestamp_opt(secs, micros * 1_000).unwrap();
        let cursor = Cursor::new(ts, NoteId::new(id));
        prop_assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn prop_pagination_visits_every_note_once(total in 0usize..60, limit in 1u32..15) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let port = seeded(total).await;
            let ctx = CallContext::background();

            let mut seen = Vec::new();
            let mut params = PaginationParams::new(limit).unwrap();
            loop {
                let page = port.list(&ctx, &params).await.unwrap();
                assert!(page.notes.len() <= limit as usize);
                seen.extend(page.notes.iter().map(|n| (n.created_at, n.id)));
                match page.next_params(limit).unwrap() {
                    Some(next) => params = next,
                    None => break,
                }
            }

            assert_eq!(seen.len(), total);
            let unique: HashSet<_> = seen.iter().map(|(_, id)| *id).collect();
            assert_eq!(unique.len(), total);
            assert!(seen.windows(2).all(|w| w[0] > w[1]), "keys must strictly descend");
        });
    }
}
