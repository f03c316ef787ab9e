//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `curator_core::storage`, selected at compile time via feature flags, plus
//! the cache-aside decorators that wrap whichever backend is active.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//! - `inmemory`: process-local storage, data is lost on exit
//!
//! These features are mutually exclusive. The in-memory backend is always
//! compiled for tests, where it serves as the fake behind handlers and
//! decorators.
//!
//! # Examples
//!
//! Build with SQLite (default):
//! ```bash
//! cargo build -p curator
//! ```
//!
//! Build with the in-memory backend:
//! ```bash
//! cargo build -p curator --no-default-features --features inmemory,memory
//! ```

#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!(
    "Features 'sqlite' and 'inmemory' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "sqlite", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'sqlite' or 'inmemory' feature. \
    Example: cargo build -p curator --features sqlite"
);

pub mod cached;

#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
