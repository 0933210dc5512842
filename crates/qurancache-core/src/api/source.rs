use async_trait::async_trait;

use crate::models::{ChapterSummary, LastReadMarker, Verse};

use super::ApiError;

/// Where chapter and verse content comes from.
///
/// `ApiClient` is the production implementation. Everything the loader
/// needs from the remote service goes through these three calls.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Full chapter list in canonical order.
    async fn fetch_chapters(&self) -> Result<Vec<ChapterSummary>, ApiError>;

    /// A single verse by its global number, in the given edition.
    async fn fetch_verse(&self, verse: u32, edition: &str) -> Result<LastReadMarker, ApiError>;

    /// All verses of one chapter, in the given edition.
    async fn fetch_chapter_verses(&self, chapter: u32, edition: &str)
        -> Result<Vec<Verse>, ApiError>;
}
