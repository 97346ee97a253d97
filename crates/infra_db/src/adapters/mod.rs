//! Port adapters
//!
//! Connects the domain's [`NotesPort`](domain_notes::NotesPort) to the
//! PostgreSQL repository layer.

pub mod notes;

pub use notes::PostgresNotesAdapter;
