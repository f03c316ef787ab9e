//! In-memory storage backend.
//!
//! Users and settings are kept in insertion-ordered vectors, media and
//! taxonomies in a [`curator_core::hierarchy::NestedForest`] each, all behind
//! `Arc<tokio::sync::RwLock<_>>`. Each structural mutation holds the
//! forest's write lock for its whole duration, so concurrent inserts and
//! moves serialize. Useful for tests and for running without a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use curator::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
