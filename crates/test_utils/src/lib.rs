//! Test Utilities Crate
//!
//! Shared test infrastructure for the notes workspace.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built note requests and records
//! - `database`: PostgreSQL test containers with the notes schema
//! - `assertions`: Ordering and identity checks on note listings
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
