//! Cache-then-refresh data loading.
//!
//! `DataLoader` connects the reader state to its two collaborators: the
//! remote `ContentSource` and the on-disk `CacheManager`.
//!
//! The building blocks (`restore`, `fetch_library`, `fetch_verses`,
//! `run_local`) are used by the TUI, which runs the network calls in
//! background tasks. `initialize`, `refresh` and `toggle_chapter` chain the
//! same blocks sequentially for headless callers and tests.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiError, ContentSource};
use crate::cache::CacheManager;
use crate::models::{Library, Verse};
use crate::state::{Action, Command, ReaderState};

/// Translation used for the last-read verse and chapter verses.
pub const DEFAULT_EDITION: &str = "en.asad";

/// Global verse number shown on the last-read card.
pub const DEFAULT_LAST_READ_VERSE: u32 = 262;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    pub edition: String,
    pub last_read_verse: u32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            edition: DEFAULT_EDITION.to_string(),
            last_read_verse: DEFAULT_LAST_READ_VERSE,
        }
    }
}

/// Cheap to clone; the source is shared.
#[derive(Clone)]
pub struct DataLoader {
    source: Arc<dyn ContentSource>,
    cache: CacheManager,
    options: LoaderOptions,
}

impl DataLoader {
    pub fn new(source: Arc<dyn ContentSource>, cache: CacheManager, options: LoaderOptions) -> Self {
        Self {
            source,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Read the cached library. Read failures are logged and count as a miss.
    pub fn load_cached(&self) -> Option<Library> {
        match self.cache.load_library() {
            Ok(Some(cached)) => {
                debug!(age = %cached.age_display(), "Loaded cached library");
                Some(cached.data)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached library, treating as empty");
                None
            }
        }
    }

    /// Apply the cached library to `state`. Must run before any refresh.
    pub fn restore(&self, state: &mut ReaderState) {
        state.apply(Action::CacheLoaded(self.load_cached()));
    }

    /// Fetch the chapter list and the last-read verse concurrently.
    pub async fn fetch_library(&self) -> Action {
        let (chapters, last_read) = tokio::join!(
            self.source.fetch_chapters(),
            self.source
                .fetch_verse(self.options.last_read_verse, &self.options.edition),
        );

        match (chapters, last_read) {
            (Ok(chapters), Ok(last_read)) => Action::RefreshSucceeded(Library {
                chapters,
                last_read,
            }),
            (Err(e), _) => {
                warn!(error = %e, offline = e.is_offline(), "Failed to fetch chapter list");
                Action::RefreshFailed(e.to_string())
            }
            (_, Err(e)) => {
                warn!(
                    error = %e,
                    offline = e.is_offline(),
                    verse = self.options.last_read_verse,
                    "Failed to fetch last-read verse"
                );
                Action::RefreshFailed(e.to_string())
            }
        }
    }

    pub async fn fetch_verses(&self, chapter: u32) -> Result<Vec<Verse>, ApiError> {
        self.source
            .fetch_chapter_verses(chapter, &self.options.edition)
            .await
    }

    /// Persist the library. A failed write is logged; in-memory state stays.
    pub fn persist(&self, library: &Library) {
        match self.cache.save_library(library) {
            Ok(()) => debug!(chapters = library.chapters.len(), "Library cached"),
            Err(e) => warn!(error = %e, "Failed to cache library"),
        }
    }

    /// Carry out the commands that need no network and return the rest.
    pub fn run_local(&self, commands: Vec<Command>) -> Vec<Command> {
        commands
            .into_iter()
            .filter_map(|command| match command {
                Command::PersistLibrary(library) => {
                    self.persist(&library);
                    None
                }
                other => Some(other),
            })
            .collect()
    }

    /// Startup: show the cache if it is complete, then refresh.
    pub async fn initialize(&self, state: &mut ReaderState) -> Vec<Command> {
        self.restore(state);
        self.refresh(state).await
    }

    /// Refresh the library from the network. Returns the commands left for
    /// the caller, i.e. the offline notice when there is nothing to show.
    pub async fn refresh(&self, state: &mut ReaderState) -> Vec<Command> {
        info!("Refreshing library");
        let action = self.fetch_library().await;
        let commands = state.apply(action);
        self.run_local(commands)
    }

    /// Toggle a chapter, fetching its verses first if they are not cached.
    /// Returns the chapter expanded afterwards.
    pub async fn toggle_chapter(
        &self,
        state: &mut ReaderState,
        chapter: u32,
    ) -> Result<Option<u32>, ApiError> {
        for command in state.apply(Action::ToggleChapter(chapter)) {
            let Command::FetchVerses {
                chapter,
                generation,
            } = command
            else {
                continue;
            };

            match self.fetch_verses(chapter).await {
                Ok(verses) => {
                    state.apply(Action::VersesLoaded {
                        chapter,
                        generation,
                        verses,
                    });
                }
                Err(e) => {
                    warn!(chapter, error = %e, "Failed to fetch chapter verses");
                    state.apply(Action::VersesFailed {
                        chapter,
                        generation,
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        Ok(state.expanded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LastReadMarker;
    use crate::state::Notice;
    use crate::testing::{sample_chapters, sample_verses, StaticSource};
    use tempfile::{tempdir, TempDir};

    fn loader_with(source: Arc<StaticSource>) -> (DataLoader, TempDir) {
        let dir = tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");
        (DataLoader::new(source, cache, LoaderOptions::default()), dir)
    }

    fn seed_cache(loader: &DataLoader, count: u32, text: &str) {
        loader
            .cache()
            .save_library(&Library {
                chapters: sample_chapters(count),
                last_read: LastReadMarker::new(text),
            })
            .expect("Failed to seed cache");
    }

    #[tokio::test]
    async fn test_offline_with_cache_shows_cached_data_without_notice() {
        let source = Arc::new(StaticSource::offline());
        let (loader, _dir) = loader_with(source.clone());
        seed_cache(&loader, 114, "In the beginning...");

        let mut state = ReaderState::default();
        let commands = loader.initialize(&mut state).await;

        assert!(commands.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.chapters().len(), 114);
        assert_eq!(state.last_read().map(|m| m.text.as_str()), Some("In the beginning..."));
        assert_eq!(state.notice(), None);
        assert_eq!(source.chapter_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_and_online_populates_state_and_cache() {
        let source = Arc::new(StaticSource::new(
            sample_chapters(114),
            LastReadMarker::new("Those who believe..."),
        ));
        let (loader, _dir) = loader_with(source.clone());

        let mut state = ReaderState::default();
        let commands = loader.initialize(&mut state).await;

        assert!(commands.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.chapters(), sample_chapters(114).as_slice());
        assert_eq!(state.last_read().map(|m| m.text.as_str()), Some("Those who believe..."));

        let cached = loader.load_cached().expect("library should be cached");
        assert_eq!(cached.chapters, sample_chapters(114));
        assert_eq!(cached.last_read.text, "Those who believe...");
        assert_eq!(source.verse_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_and_offline_raises_notice() {
        let source = Arc::new(StaticSource::offline());
        let (loader, _dir) = loader_with(source);

        let mut state = ReaderState::default();
        let commands = loader.initialize(&mut state).await;

        assert_eq!(commands, vec![Command::ShowNotice(Notice::Offline)]);
        assert!(!state.is_loading());
        assert!(state.chapters().is_empty());

        // A second failed attempt notifies again
        let commands = loader.refresh(&mut state).await;
        assert_eq!(commands, vec![Command::ShowNotice(Notice::Offline)]);
    }

    #[tokio::test]
    async fn test_failed_refresh_after_success_keeps_data() {
        let source = Arc::new(StaticSource::new(sample_chapters(5), LastReadMarker::new("x")));
        let (loader, _dir) = loader_with(source.clone());

        let mut state = ReaderState::default();
        loader.initialize(&mut state).await;
        source.set_offline(true);

        let commands = loader.refresh(&mut state).await;
        assert!(commands.is_empty());
        assert_eq!(state.chapters().len(), 5);
    }

    #[tokio::test]
    async fn test_refresh_needs_both_calls_to_succeed() {
        let source = Arc::new(
            StaticSource::new(sample_chapters(114), LastReadMarker::new("x")).with_verse_failure(),
        );
        let (loader, _dir) = loader_with(source.clone());

        let mut state = ReaderState::default();
        let commands = loader.initialize(&mut state).await;

        assert_eq!(commands, vec![Command::ShowNotice(Notice::Offline)]);
        assert!(!state.is_loading());
        assert!(state.chapters().is_empty());
        assert!(state.last_read().is_none());
        assert!(loader.load_cached().is_none());
        assert_eq!(source.chapter_list_calls(), 1);
        assert_eq!(source.verse_calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_keeps_refreshed_state() {
        let source = Arc::new(StaticSource::new(
            sample_chapters(114),
            LastReadMarker::new("Those who believe..."),
        ));
        let (loader, dir) = loader_with(source);

        // Replace the cache directory with a plain file so writes fail
        std::fs::remove_dir_all(dir.path()).expect("remove failed");
        std::fs::write(dir.path(), "not a directory").expect("write failed");
        assert!(loader.cache().save_library(&Library::default()).is_err());

        let mut state = ReaderState::default();
        let commands = loader.initialize(&mut state).await;

        assert!(commands.is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.chapters(), sample_chapters(114).as_slice());
        assert_eq!(state.last_read().map(|m| m.text.as_str()), Some("Those who believe..."));
        assert!(loader.load_cached().is_none());

        std::fs::remove_file(dir.path()).expect("cleanup failed");
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_treated_as_miss() {
        let source = Arc::new(StaticSource::new(sample_chapters(2), LastReadMarker::new("x")));
        let (loader, dir) = loader_with(source);
        std::fs::write(dir.path().join("library.json"), "garbage").expect("write failed");

        let mut state = ReaderState::default();
        loader.restore(&mut state);
        assert!(state.is_loading());

        loader.refresh(&mut state).await;
        assert_eq!(state.chapters().len(), 2);
        assert!(loader.load_cached().is_some());
    }

    #[tokio::test]
    async fn test_toggle_fetches_once_then_toggles_locally() {
        let source = Arc::new(
            StaticSource::new(sample_chapters(114), LastReadMarker::new("x"))
                .with_chapter(2, sample_verses(286)),
        );
        let (loader, _dir) = loader_with(source.clone());
        let mut state = ReaderState::default();

        let expanded = loader.toggle_chapter(&mut state, 2).await.expect("toggle failed");
        assert_eq!(expanded, Some(2));
        assert_eq!(source.chapter_verse_calls(), vec![(2, "en.asad".to_string())]);
        assert_eq!(state.verses(2).map(|v| v.len()), Some(286));

        let expanded = loader.toggle_chapter(&mut state, 2).await.expect("toggle failed");
        assert_eq!(expanded, None);
        let expanded = loader.toggle_chapter(&mut state, 2).await.expect("toggle failed");
        assert_eq!(expanded, Some(2));
        assert_eq!(source.chapter_verse_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_failure_is_returned_and_state_unchanged() {
        let source = Arc::new(
            StaticSource::new(sample_chapters(114), LastReadMarker::new("x"))
                .with_chapter(1, sample_verses(7)),
        );
        let (loader, _dir) = loader_with(source.clone());
        let mut state = ReaderState::default();
        loader.toggle_chapter(&mut state, 1).await.expect("toggle failed");

        // Chapter 9 is not known to the source
        let err = loader.toggle_chapter(&mut state, 9).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(state.expanded(), Some(1));
        assert!(!state.has_verses(9));
    }
}
