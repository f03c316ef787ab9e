//! SQLite storage backend implementation.
//!
//! Implements the repository traits using `rusqlite` for statements and
//! `tokio-rusqlite` to run them on a dedicated connection thread. All
//! statements of one repository call run inside a single `call` closure,
//! so they are strictly ordered; structural mutations additionally take an
//! `IMMEDIATE` transaction.

mod conversions;
mod error;
mod hierarchical;
mod repository;
mod schema;
mod tree;

pub use repository::SqliteRepository;
