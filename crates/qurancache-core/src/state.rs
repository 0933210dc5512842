//! Reader state and its transitions.
//!
//! `ReaderState` holds everything the reader screen renders. It is changed
//! only through [`ReaderState::apply`], which takes an [`Action`] and returns
//! the [`Command`]s the caller must carry out (network fetches, cache writes,
//! user notices). `apply` itself never performs I/O.
//!
//! Chapter expansion is tagged with a generation counter. Every toggle bumps
//! it, and a verse fetch only expands its chapter if no toggle happened while
//! it was in flight. A late response still fills the verse cache.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::{debug, info};

use crate::models::{ChapterSummary, LastReadMarker, Library, Verse};

/// Enough room for every chapter, so nothing is evicted in a normal session.
pub const DEFAULT_VERSE_CACHE_CAPACITY: usize = 114;

/// A message the UI should put in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Refresh failed and there is nothing cached to show.
    Offline,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Offline => "Offline Mode",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::Offline => "Unable to fetch data, showing cached data.",
        }
    }
}

/// Inputs to the reader state.
#[derive(Debug, Clone)]
pub enum Action {
    /// Result of the startup cache read (`None` on miss or read failure).
    CacheLoaded(Option<Library>),
    /// Both refresh calls came back "OK".
    RefreshSucceeded(Library),
    /// Either refresh call failed.
    RefreshFailed(String),
    /// User selected a chapter row.
    ToggleChapter(u32),
    /// Verses for a chapter arrived.
    VersesLoaded {
        chapter: u32,
        generation: u64,
        verses: Vec<Verse>,
    },
    /// Fetching verses for a chapter failed.
    VersesFailed {
        chapter: u32,
        generation: u64,
        error: String,
    },
    DismissNotice,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchVerses { chapter: u32, generation: u64 },
    PersistLibrary(Library),
    ShowNotice(Notice),
}

pub struct ReaderState {
    chapters: Vec<ChapterSummary>,
    last_read: Option<LastReadMarker>,
    loading: bool,
    verses: LruCache<u32, Vec<Verse>>,
    expanded: Option<u32>,
    generation: u64,
    in_flight: HashSet<u32>,
    notice: Option<Notice>,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new(DEFAULT_VERSE_CACHE_CAPACITY)
    }
}

impl ReaderState {
    /// Fresh state: loading, nothing shown. A zero capacity is treated as one.
    pub fn new(verse_cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(verse_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            chapters: Vec::new(),
            last_read: None,
            loading: true,
            verses: LruCache::new(capacity),
            expanded: None,
            generation: 0,
            in_flight: HashSet::new(),
            notice: None,
        }
    }

    // ===== Accessors =====

    pub fn chapters(&self) -> &[ChapterSummary] {
        &self.chapters
    }

    pub fn last_read(&self) -> Option<&LastReadMarker> {
        self.last_read.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn expanded(&self) -> Option<u32> {
        self.expanded
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn has_verses(&self, chapter: u32) -> bool {
        self.verses.contains(&chapter)
    }

    pub fn verses(&self, chapter: u32) -> Option<&[Verse]> {
        self.verses.peek(&chapter).map(Vec::as_slice)
    }

    /// Verses under the expanded chapter, if they are cached.
    pub fn expanded_verses(&self) -> Option<(u32, &[Verse])> {
        let chapter = self.expanded?;
        self.verses(chapter).map(|v| (chapter, v))
    }

    pub fn is_fetching(&self, chapter: u32) -> bool {
        self.in_flight.contains(&chapter)
    }

    pub fn cached_chapter_count(&self) -> usize {
        self.verses.len()
    }

    // ===== Transitions =====

    pub fn apply(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::CacheLoaded(library) => {
                match library {
                    Some(library) if library.is_displayable() => {
                        debug!(chapters = library.chapters.len(), "Showing cached library");
                        self.chapters = library.chapters;
                        self.last_read = Some(library.last_read);
                        self.loading = false;
                    }
                    Some(_) => debug!("Cached library has no last-read text, waiting for refresh"),
                    None => debug!("No cached library"),
                }
                Vec::new()
            }
            Action::RefreshSucceeded(library) => {
                info!(chapters = library.chapters.len(), "Library refreshed");
                self.chapters = library.chapters.clone();
                self.last_read = Some(library.last_read.clone());
                self.loading = false;
                vec![Command::PersistLibrary(library)]
            }
            Action::RefreshFailed(reason) => {
                self.loading = false;
                if self.chapters.is_empty() {
                    info!(%reason, "Refresh failed with nothing to show");
                    self.notice = Some(Notice::Offline);
                    vec![Command::ShowNotice(Notice::Offline)]
                } else {
                    debug!(%reason, "Refresh failed, keeping current data");
                    Vec::new()
                }
            }
            Action::ToggleChapter(chapter) => self.toggle(chapter),
            Action::VersesLoaded {
                chapter,
                generation,
                verses,
            } => {
                self.in_flight.remove(&chapter);
                if let Some((evicted, _)) = self.verses.push(chapter, verses) {
                    // An expanded chapter must always have cached verses
                    if evicted != chapter && self.expanded == Some(evicted) {
                        debug!(chapter = evicted, "Expanded chapter evicted, collapsing");
                        self.expanded = None;
                    }
                }
                if generation == self.generation {
                    self.expanded = Some(chapter);
                } else {
                    debug!(chapter, generation, current = self.generation, "Discarding stale expansion");
                }
                Vec::new()
            }
            Action::VersesFailed {
                chapter, error, ..
            } => {
                self.in_flight.remove(&chapter);
                debug!(chapter, %error, "Chapter fetch failed, expansion unchanged");
                Vec::new()
            }
            Action::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
        }
    }

    fn toggle(&mut self, chapter: u32) -> Vec<Command> {
        self.generation += 1;

        // `get` rather than `contains` so the chapter counts as recently used.
        if self.verses.get(&chapter).is_some() {
            self.expanded = if self.expanded == Some(chapter) {
                None
            } else {
                Some(chapter)
            };
            return Vec::new();
        }

        if !self.in_flight.insert(chapter) {
            // Second tap while loading: the bumped generation already means
            // the pending response will not expand anything.
            debug!(chapter, "Chapter fetch already in flight");
            return Vec::new();
        }

        vec![Command::FetchVerses {
            chapter,
            generation: self.generation,
        }]
    }
}
