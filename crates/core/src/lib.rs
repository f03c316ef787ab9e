//! Functional core for curator.
//!
//! Everything in this crate is free of I/O: domain records, the cache key
//! scheme and byte encoding, nested-set interval arithmetic, the pagination
//! engine, and the repository traits that storage backends implement.

pub mod cache;
pub mod hierarchy;
pub mod pagination;
pub mod records;
pub mod serde;
pub mod storage;
