//! Notes Repository Port
//!
//! This module defines the contract every notes store implements. The
//! PostgreSQL adapter in `infra_db` is the production implementation; the
//! in-memory [`mock::MockNotesPort`] (feature `mock`) stands in for it in
//! tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notes::{CallContext, NotesPort, CreateNoteRequest};
//! use std::sync::Arc;
//!
//! pub struct NoteService {
//!     notes: Arc<dyn NotesPort>,
//! }
//!
//! impl NoteService {
//!     pub async fn create(&self, ctx: &CallContext, req: CreateNoteRequest) -> NotesResult<Note> {
//!         self.notes.create(ctx, &req).await
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::NotesResult;
use crate::note::{CreateNoteRequest, DeleteOutcome, Note, NoteId, SearchQuery, UpdateNoteRequest};
use crate::pagination::{NotesPage, PaginationParams};
use crate::stats::StoreStats;

/// Data access contract for notes
///
/// Every method honors the cancellation signal and deadline of `ctx`.
/// Absence is reported through `Option` or [`DeleteOutcome`], never as an
/// error.
#[async_trait]
pub trait NotesPort: Send + Sync {
    /// Inserts a note and returns it with its store-assigned id and timestamps
    async fn create(&self, ctx: &CallContext, request: &CreateNoteRequest) -> NotesResult<Note>;

    /// Looks up a note by primary key
    async fn get_by_id(&self, ctx: &CallContext, id: NoteId) -> NotesResult<Option<Note>>;

    /// Fetches every existing note among `ids` in one round trip, sorted by id
    ///
    /// An empty `ids` slice returns an empty vector without touching the store.
    async fn get_batch(&self, ctx: &CallContext, ids: &[NoteId]) -> NotesResult<Vec<Note>>;

    /// Returns one page in `(created_at DESC, id DESC)` order
    async fn list(&self, ctx: &CallContext, params: &PaginationParams) -> NotesResult<NotesPage>;

    /// Matches `query.text` against titles, most recent first
    async fn search(&self, ctx: &CallContext, query: &SearchQuery) -> NotesResult<Vec<Note>>;

    /// Applies the fields present in `request`
    ///
    /// An empty request returns the stored note unchanged.
    async fn update(
        &self,
        ctx: &CallContext,
        id: NoteId,
        request: &UpdateNoteRequest,
    ) -> NotesResult<Option<Note>>;

    /// Deletes a note by id
    async fn delete(&self, ctx: &CallContext, id: NoteId) -> NotesResult<DeleteOutcome>;

    /// Collects pool and statement statistics
    async fn stats(&self, ctx: &CallContext) -> NotesResult<StoreStats>;
}

/// In-memory implementation for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use validator::Validate;

    use crate::cursor::Cursor;
    use crate::stats::{PoolStats, QueryStats};

    #[derive(Debug, Default)]
    struct MockState {
        next_id: i64,
        last_timestamp: Option<DateTime<Utc>>,
        notes: BTreeMap<NoteId, Note>,
    }

    impl MockState {
        // Strictly increasing, so every mutation moves updated_at forward.
        fn tick(&mut self) -> DateTime<Utc> {
            let now = Utc::now();
            let ts = match self.last_timestamp {
                Some(last) if now <= last => last + Duration::microseconds(1),
                _ => now,
            };
            self.last_timestamp = Some(ts);
            ts
        }

        fn sorted_desc(&self) -> Vec<&Note> {
            let mut notes: Vec<&Note> = self.notes.values().collect();
            notes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            notes
        }
    }

    /// In-memory notes store mirroring the PostgreSQL adapter's semantics
    #[derive(Debug, Clone, Default)]
    pub struct MockNotesPort {
        state: Arc<RwLock<MockState>>,
    }

    impl MockNotesPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store by creating each request in order
        pub async fn with_notes(requests: Vec<CreateNoteRequest>) -> NotesResult<Self> {
            let port = Self::new();
            let ctx = CallContext::background();
            for request in &requests {
                port.create(&ctx, request).await?;
            }
            Ok(port)
        }

        pub async fn len(&self) -> usize {
            self.state.read().await.notes.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.state.read().await.notes.is_empty()
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    #[async_trait]
    impl NotesPort for MockNotesPort {
        async fn create(
            &self,
            ctx: &CallContext,
            request: &CreateNoteRequest,
        ) -> NotesResult<Note> {
            ctx.run("create", async {
                request.validate()?;
                let mut state = self.state.write().await;
                state.next_id += 1;
                let id = NoteId::new(state.next_id);
                let now = state.tick();
                let note = Note {
                    id,
                    title: request.title.clone(),
                    content: request.content.clone(),
                    created_at: now,
                    updated_at: now,
                };
                state.notes.insert(id, note.clone());
                Ok(note)
            })
            .await
        }

        async fn get_by_id(&self, ctx: &CallContext, id: NoteId) -> NotesResult<Option<Note>> {
            ctx.run("get_by_id", async {
                Ok(self.state.read().await.notes.get(&id).cloned())
            })
            .await
        }

        async fn get_batch(&self, ctx: &CallContext, ids: &[NoteId]) -> NotesResult<Vec<Note>> {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            ctx.run("get_batch", async {
                let state = self.state.read().await;
                // BTreeMap iteration is already ascending by id.
                Ok(state
                    .notes
                    .values()
                    .filter(|note| ids.contains(&note.id))
                    .cloned()
                    .collect())
            })
            .await
        }

        async fn list(
            &self,
            ctx: &CallContext,
            params: &PaginationParams,
        ) -> NotesResult<NotesPage> {
            ctx.run("list", async {
                params.validate()?;
                let state = self.state.read().await;
                let cursor: Option<&Cursor> = params.cursor();
                let rows: Vec<Note> = state
                    .sorted_desc()
                    .into_iter()
                    .filter(|note| cursor.map_or(true, |c| c.precedes(note)))
                    .take(params.fetch_limit() as usize)
                    .cloned()
                    .collect();
                Ok(NotesPage::from_overfetch(rows, params.limit()))
            })
            .await
        }

        async fn search(&self, ctx: &CallContext, query: &SearchQuery) -> NotesResult<Vec<Note>> {
            ctx.run("search", async {
                query.validate()?;
                let wanted = tokens(&query.text);
                let state = self.state.read().await;
                Ok(state
                    .sorted_desc()
                    .into_iter()
                    .filter(|note| {
                        let title = tokens(&note.title);
                        !wanted.is_empty() && wanted.iter().all(|w| title.contains(w))
                    })
                    .take(query.limit as usize)
                    .cloned()
                    .collect())
            })
            .await
        }

        async fn update(
            &self,
            ctx: &CallContext,
            id: NoteId,
            request: &UpdateNoteRequest,
        ) -> NotesResult<Option<Note>> {
            if request.is_empty() {
                return self.get_by_id(ctx, id).await;
            }
            ctx.run("update", async {
                request.validate()?;
                let mut state = self.state.write().await;
                if !state.notes.contains_key(&id) {
                    return Ok(None);
                }
                let now = state.tick();
                let Some(note) = state.notes.get_mut(&id) else {
                    return Ok(None);
                };
                if let Some(title) = &request.title {
                    note.title = title.clone();
                }
                if let Some(content) = &request.content {
                    note.content = content.clone();
                }
                note.updated_at = now;
                Ok(Some(note.clone()))
            })
            .await
        }

        async fn delete(&self, ctx: &CallContext, id: NoteId) -> NotesResult<DeleteOutcome> {
            ctx.run("delete", async {
                let removed = self.state.write().await.notes.remove(&id);
                Ok(if removed.is_some() {
                    DeleteOutcome::Deleted
                } else {
                    DeleteOutcome::NotFound
                })
            })
            .await
        }

        async fn stats(&self, ctx: &CallContext) -> NotesResult<StoreStats> {
            ctx.run("get_stats", async {
                Ok(StoreStats {
                    pool: PoolStats::default(),
                    query_stats: QueryStats::unavailable(
                        "in-memory store has no statement statistics",
                    ),
                    collected_at: Utc::now(),
                })
            })
            .await
        }
    }
}
