//! Cache module for storing fetched data on disk
//!
//! This module provides a key-value store that persists payloads to the
//! filesystem together with their write timestamps. Freshness is judged at
//! read time against a caller-supplied maximum age, and every failure mode
//! (missing storage, unreadable files, corrupt records) degrades to a cache
//! miss so callers simply fetch fresh data instead.

mod store;

pub use store::CacheStore;
