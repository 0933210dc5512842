//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! content locally. Data is cached in JSON format with the time it was
//! written, so the UI can show how old the displayed data is.
//!
//! Only the library (chapter list + last-read marker) is persisted.
//! Chapter verses live in memory for the session.

pub mod manager;

pub use manager::{CachedData, CacheManager};
