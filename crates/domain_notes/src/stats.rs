//! Diagnostic snapshot types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters of statement text kept in a preview
pub const QUERY_PREVIEW_LEN: usize = 100;

/// Number of statements reported in a stats snapshot
pub const TOP_STATEMENTS: i64 = 10;

/// Connection pool utilization counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total_connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
    pub acquired_connections: u32,
    /// Acquisitions currently opening a fresh connection
    pub constructing_connections: u32,
    pub acquire_count: u64,
    /// Acquisitions that found no idle connection and had to wait or connect
    pub empty_acquire_count: u64,
    /// Acquisitions abandoned by the caller before a connection was handed out
    pub canceled_acquire_count: u64,
    pub acquire_wait_ms: u64,
}

/// Aggregated execution statistics for one statement fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementStats {
    pub query: String,
    pub calls: i64,
    pub total_exec_time_ms: f64,
    pub mean_exec_time_ms: f64,
    pub rows: i64,
}

impl StatementStats {
    /// Builds an entry, shortening long statement text to a preview
    pub fn new(
        query: &str,
        calls: i64,
        total_exec_time_ms: f64,
        mean_exec_time_ms: f64,
        rows: i64,
    ) -> Self {
        Self {
            query: preview(query),
            calls,
            total_exec_time_ms,
            mean_exec_time_ms,
            rows,
        }
    }
}

/// Store-side statement statistics, when the store exposes them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryStats {
    Available { top_queries: Vec<StatementStats> },
    Unavailable { reason: String },
}

impl QueryStats {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        QueryStats::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, QueryStats::Available { .. })
    }
}

/// Snapshot returned by the stats operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub pool: PoolStats,
    pub query_stats: QueryStats,
    pub collected_at: DateTime<Utc>,
}

/// Truncates statement text to [`QUERY_PREVIEW_LEN`] characters plus `...`
pub fn preview(query: &str) -> String {
    match query.char_indices().nth(QUERY_PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &query[..cut]),
        None => query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("SELECT 1"), "SELECT 1");
        let exact = "a".repeat(QUERY_PREVIEW_LEN);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(QUERY_PREVIEW_LEN + 20);
        let shortened = preview(&long);
        assert!(shortened.ends_with("..."));
        assert_eq!(shortened.chars().count(), QUERY_PREVIEW_LEN + 3);
    }

    #[test]
    fn test_unavailable_serializes_marker() {
        let stats = QueryStats::unavailable("pg_stat_statements not enabled");
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["status"], "unavailable");
    }
}
