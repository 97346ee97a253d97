//! Store statistics collection
//!
//! Pool counters are always available. Statement statistics come from the
//! `pg_stat_statements` extension when the server has it; otherwise the
//! report carries an unavailable marker instead of failing.

use chrono::Utc;
use sqlx::FromRow;
use tracing::{debug, warn};

use domain_notes::stats::TOP_STATEMENTS;
use domain_notes::{QueryStats, StatementStats, StoreStats};

use crate::error::DatabaseError;
use crate::pool::NotesPool;

const TOP_STATEMENTS_SQL: &str = r#"
    SELECT query, calls, total_exec_time, mean_exec_time, rows
    FROM pg_stat_statements
    WHERE query NOT LIKE '%pg_stat_statements%'
    ORDER BY total_exec_time DESC
    LIMIT $1
"#;

#[derive(Debug, FromRow)]
struct StatementRow {
    query: String,
    calls: i64,
    total_exec_time: f64,
    mean_exec_time: f64,
    rows: i64,
}

/// Gathers [`StoreStats`] for a pool
#[derive(Debug, Clone)]
pub struct StatsCollector {
    pool: NotesPool,
}

impl StatsCollector {
    pub fn new(pool: NotesPool) -> Self {
        Self { pool }
    }

    /// Snapshot of pool counters plus the most expensive statements
    ///
    /// Never fails: a missing extension, a permission error, or an exhausted
    /// pool only turns the statement section into [`QueryStats::Unavailable`].
    pub async fn collect(&self) -> StoreStats {
        let pool = self.pool.stats();

        let query_stats = match self.top_statements().await {
            Ok(top_queries) => {
                debug!(statements = top_queries.len(), "Collected statement statistics");
                QueryStats::Available { top_queries }
            }
            Err(e) => {
                warn!(error = %e, "Statement statistics unavailable");
                QueryStats::unavailable(e.to_string())
            }
        };

        StoreStats {
            pool,
            query_stats,
            collected_at: Utc::now(),
        }
    }

    async fn top_statements(&self) -> Result<Vec<StatementStats>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, StatementRow>(TOP_STATEMENTS_SQL)
            .bind(TOP_STATEMENTS)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from(&e))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                StatementStats::new(
                    &row.query,
                    row.calls,
                    row.total_exec_time,
                    row.mean_exec_time,
                    row.rows,
                )
            })
            .collect())
    }
}
