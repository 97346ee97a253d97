//! Repository implementations
//!
//! Repositories own the SQL for a table and map between its rows and the
//! domain types. They return [`DatabaseError`](crate::DatabaseError); the
//! adapters translate that at the port boundary.

pub mod notes;

pub use notes::{NoteRepository, NoteRow};
