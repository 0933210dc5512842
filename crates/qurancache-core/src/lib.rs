//! Core library for qurancache.
//!
//! Contains everything that does not depend on a terminal:
//!
//! - `api`: HTTP client for the alquran.cloud content API and the
//!   `ContentSource` trait the loader talks to
//! - `models`: chapters, verses, the last-read marker and the cached library
//! - `cache`: JSON file cache for offline display
//! - `state`: the reader state container and its transitions
//! - `loader`: cache-then-refresh orchestration and on-demand chapter fetches

pub mod api;
pub mod cache;
pub mod loader;
pub mod models;
pub mod state;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use api::{ApiClient, ApiError, ContentSource};
pub use cache::CacheManager;
pub use loader::{DataLoader, LoaderOptions};
pub use models::{ChapterSummary, LastReadMarker, Library, RevelationType, Verse};
pub use state::{Action, Command, Notice, ReaderState};
