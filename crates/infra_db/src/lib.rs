//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the notes store, built on SQLx.
//!
//! # Architecture
//!
//! - [`pool`]: bounded connection pool with background health checks
//! - [`repositories`]: SQL per table, row mapping
//! - [`query`]: dynamic SQL for partial updates
//! - [`stats`]: pool and `pg_stat_statements` reporting
//! - [`adapters`]: the [`NotesPort`](domain_notes::NotesPort) implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseSettings, NotesPool, PostgresNotesAdapter};
//!
//! let config = DatabaseSettings::from_env()?.into_config();
//! let pool = NotesPool::connect(config).await?;
//! let notes = PostgresNotesAdapter::new(pool.clone());
//! // ...
//! pool.close().await;
//! ```

pub mod config;
pub mod pool;
pub mod error;
pub mod query;
pub mod repositories;
pub mod stats;
pub mod adapters;

pub use crate::config::{DatabaseConfig, DatabaseSettings, DEFAULT_DATABASE_URL};
pub use pool::{NotesPool, PooledConnection};
pub use error::DatabaseError;
pub use repositories::NoteRepository;
pub use stats::StatsCollector;
pub use adapters::PostgresNotesAdapter;
