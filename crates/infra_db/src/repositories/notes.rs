//! Note repository implementation
//!
//! Every method borrows one pooled connection for the duration of a single
//! statement. Statements are issued with fixed SQL text so the per-connection
//! prepared statement cache can reuse them.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::debug;

use domain_notes::{
    CreateNoteRequest, DeleteOutcome, Note, NoteId, NotesPage, PaginationParams, SearchQuery,
    UpdateNoteRequest,
};

use crate::error::DatabaseError;
use crate::pool::NotesPool;
use crate::query::PartialUpdate;

const INSERT_NOTE: &str = r#"
    INSERT INTO notes (title, content)
    VALUES ($1, $2)
    RETURNING id, title, content, created_at, updated_at
"#;

const SELECT_BY_ID: &str = r#"
    SELECT id, title, content, created_at, updated_at
    FROM notes
    WHERE id = $1
"#;

const SELECT_BATCH: &str = r#"
    SELECT id, title, content, created_at, updated_at
    FROM notes
    WHERE id = ANY($1)
    ORDER BY id
"#;

const SELECT_FIRST_PAGE: &str = r#"
    SELECT id, title, content, created_at, updated_at
    FROM notes
    ORDER BY created_at DESC, id DESC
    LIMIT $1
"#;

const SELECT_PAGE_AFTER: &str = r#"
    SELECT id, title, content, created_at, updated_at
    FROM notes
    WHERE (created_at, id) < ($1, $2)
    ORDER BY created_at DESC, id DESC
    LIMIT $3
"#;

const SEARCH_TITLES: &str = r#"
    SELECT id, title, content, created_at, updated_at
    FROM notes
    WHERE to_tsvector('simple', title) @@ plainto_tsquery('simple', $1)
    ORDER BY created_at DESC, id DESC
    LIMIT $2
"#;

const DELETE_NOTE: &str = "DELETE FROM notes WHERE id = $1";

/// Database row for the `notes` table
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: NoteId::new(row.id),
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for note records
#[derive(Debug, Clone)]
pub struct NoteRepository {
    pool: NotesPool,
}

impl NoteRepository {
    /// Creates a new NoteRepository over the given pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The notes connection pool
    pub fn new(pool: NotesPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &NotesPool {
        &self.pool
    }

    /// Inserts a note; the store assigns the id and both timestamps
    pub async fn insert(&self, request: &CreateNoteRequest) -> Result<Note, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, NoteRow>(INSERT_NOTE)
            .bind(&request.title)
            .bind(&request.content)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row.into())
    }

    /// Retrieves a note by id
    ///
    /// # Returns
    ///
    /// `None` when no row has that id
    pub async fn find_by_id(&self, id: NoteId) -> Result<Option<Note>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, NoteRow>(SELECT_BY_ID)
            .bind(id.value())
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Note::from))
    }

    /// Retrieves every existing note among `ids`, ordered by ascending id
    ///
    /// Missing ids are skipped and duplicates collapse. An empty input never
    /// touches the store.
    pub async fn find_batch(&self, ids: &[NoteId]) -> Result<Vec<Note>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, NoteRow>(SELECT_BATCH)
            .bind(keys)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    /// Fetches one keyset page, newest first
    ///
    /// Reads `limit + 1` rows; the extra row only signals that another page
    /// exists.
    pub async fn list_page(&self, params: &PaginationParams) -> Result<NotesPage, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let rows = match params.cursor() {
            None => {
                sqlx::query_as::<_, NoteRow>(SELECT_FIRST_PAGE)
                    .bind(params.fetch_limit())
                    .fetch_all(&mut *conn)
                    .await?
            }
            Some(cursor) => {
                sqlx::query_as::<_, NoteRow>(SELECT_PAGE_AFTER)
                    .bind(cursor.created_at)
                    .bind(cursor.id.value())
                    .bind(params.fetch_limit())
                    .fetch_all(&mut *conn)
                    .await?
            }
        };

        debug!(fetched = rows.len(), limit = params.limit(), "Fetched notes page");
        let notes = rows.into_iter().map(Note::from).collect();
        Ok(NotesPage::from_overfetch(notes, params.limit()))
    }

    /// Full-text search over titles, newest first
    pub async fn search_titles(&self, query: &SearchQuery) -> Result<Vec<Note>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, NoteRow>(SEARCH_TITLES)
            .bind(&query.text)
            .bind(i64::from(query.limit))
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    /// Applies the fields present in `request` and bumps `updated_at`
    ///
    /// An empty request issues no write and behaves like [`Self::find_by_id`].
    pub async fn update_partial(
        &self,
        id: NoteId,
        request: &UpdateNoteRequest,
    ) -> Result<Option<Note>, DatabaseError> {
        let update = PartialUpdate::from_request(request);
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let sql = update.to_sql();
        let mut query = sqlx::query_as::<_, NoteRow>(&sql);
        for value in update.values() {
            query = query.bind(value);
        }

        let mut conn = self.pool.acquire().await?;
        let row = query.bind(id.value()).fetch_optional(&mut *conn).await?;

        Ok(row.map(Note::from))
    }

    /// Removes a note, reporting whether a row existed
    pub async fn delete(&self, id: NoteId) -> Result<DeleteOutcome, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(DELETE_NOTE)
            .bind(id.value())
            .execute(&mut *conn)
            .await?;

        Ok(DeleteOutcome::from_rows_affected(result.rows_affected()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_row_into_note() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let note: Note = NoteRow {
            id: 7,
            title: "Title".into(),
            content: "Body".into(),
            created_at: ts,
            updated_at: ts,
        }
        .into();

        assert_eq!(note.id, NoteId::new(7));
        assert_eq!(note.title, "Title");
        assert_eq!(note.created_at, ts);
    }

    #[test]
    fn test_keyset_statements_share_order() {
        for sql in [SELECT_FIRST_PAGE, SELECT_PAGE_AFTER, SEARCH_TITLES] {
            assert!(sql.contains("ORDER BY created_at DESC, id DESC"));
        }
        assert!(SELECT_PAGE_AFTER.contains("(created_at, id) < ($1, $2)"));
    }
}
