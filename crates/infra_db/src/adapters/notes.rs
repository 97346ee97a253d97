//! PostgreSQL Notes Adapter
//!
//! Implements the [`NotesPort`] contract on top of [`NoteRepository`] and
//! [`StatsCollector`].
//!
//! Each call runs under its [`CallContext`]: when the caller cancels or the
//! deadline passes, the in-flight statement future is dropped, which returns
//! its pooled connection, and the call fails with `NotesError::Cancelled`.
//! Database failures are reported as `NotesError::Store` tagged with the
//! operation name.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, NotesPool, PostgresNotesAdapter};
//! use domain_notes::{CallContext, NotesPort};
//! use std::sync::Arc;
//!
//! let pool = NotesPool::connect(DatabaseConfig::default()).await?;
//! let notes: Arc<dyn NotesPort> = Arc::new(PostgresNotesAdapter::new(pool));
//! let page = notes.list(&CallContext::background(), &Default::default()).await?;
//! ```

use async_trait::async_trait;
use tracing::{debug, instrument};
use validator::Validate;

use domain_notes::{
    CallContext, CreateNoteRequest, DeleteOutcome, Note, NoteId, NotesError, NotesPage,
    NotesPort, NotesResult, PaginationParams, SearchQuery, StoreStats, UpdateNoteRequest,
};

use crate::error::DatabaseError;
use crate::pool::NotesPool;
use crate::repositories::NoteRepository;
use crate::stats::StatsCollector;

/// PostgreSQL-backed implementation of the NotesPort trait
#[derive(Debug, Clone)]
pub struct PostgresNotesAdapter {
    repository: NoteRepository,
    stats: StatsCollector,
}

impl PostgresNotesAdapter {
    /// Creates a new adapter sharing `pool`
    pub fn new(pool: NotesPool) -> Self {
        Self {
            repository: NoteRepository::new(pool.clone()),
            stats: StatsCollector::new(pool),
        }
    }

    pub fn pool(&self) -> &NotesPool {
        self.repository.pool()
    }
}

fn store_error(operation: &'static str) -> impl Fn(DatabaseError) -> NotesError {
    move |e| e.into_notes_error(operation)
}

#[async_trait]
impl NotesPort for PostgresNotesAdapter {
    #[instrument(skip(self, ctx, request))]
    async fn create(&self, ctx: &CallContext, request: &CreateNoteRequest) -> NotesResult<Note> {
        ctx.run("create", async {
            request.validate()?;
            let note = self
                .repository
                .insert(request)
                .await
                .map_err(store_error("create"))?;
            debug!(id = %note.id, "Created note");
            Ok(note)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn get_by_id(&self, ctx: &CallContext, id: NoteId) -> NotesResult<Option<Note>> {
        ctx.run("get_by_id", async {
            self.repository
                .find_by_id(id)
                .await
                .map_err(store_error("get_by_id"))
        })
        .await
    }

    #[instrument(skip(self, ctx, ids), fields(requested = ids.len()))]
    async fn get_batch(&self, ctx: &CallContext, ids: &[NoteId]) -> NotesResult<Vec<Note>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        ctx.run("get_batch", async {
            let notes = self
                .repository
                .find_batch(ids)
                .await
                .map_err(store_error("get_batch"))?;
            debug!(found = notes.len(), "Fetched note batch");
            Ok(notes)
        })
        .await
    }

    #[instrument(skip(self, ctx, params), fields(limit = params.limit()))]
    async fn list(&self, ctx: &CallContext, params: &PaginationParams) -> NotesResult<NotesPage> {
        ctx.run("list", async {
            params.validate()?;
            self.repository
                .list_page(params)
                .await
                .map_err(store_error("list"))
        })
        .await
    }

    #[instrument(skip(self, ctx, query), fields(limit = query.limit))]
    async fn search(&self, ctx: &CallContext, query: &SearchQuery) -> NotesResult<Vec<Note>> {
        ctx.run("search", async {
            query.validate()?;
            let notes = self
                .repository
                .search_titles(query)
                .await
                .map_err(store_error("search"))?;
            debug!(matches = notes.len(), "Searched note titles");
            Ok(notes)
        })
        .await
    }

    #[instrument(skip(self, ctx, request))]
    async fn update(
        &self,
        ctx: &CallContext,
        id: NoteId,
        request: &UpdateNoteRequest,
    ) -> NotesResult<Option<Note>> {
        ctx.run("update", async {
            request.validate()?;
            self.repository
                .update_partial(id, request)
                .await
                .map_err(store_error("update"))
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn delete(&self, ctx: &CallContext, id: NoteId) -> NotesResult<DeleteOutcome> {
        ctx.run("delete", async {
            let outcome = self
                .repository
                .delete(id)
                .await
                .map_err(store_error("delete"))?;
            debug!(?outcome, "Deleted note");
            Ok(outcome)
        })
        .await
    }

    #[instrument(skip(self, ctx))]
    async fn stats(&self, ctx: &CallContext) -> NotesResult<StoreStats> {
        ctx.run("get_stats", async { Ok(self.stats.collect().await) }).await
    }
}
