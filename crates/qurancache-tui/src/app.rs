//! Application state management for the reader.
//!
//! `App` owns the `ReaderState` and all UI-only state (selection, scroll,
//! overlays). Network work runs in spawned tasks that send `Action`s back
//! through a channel; `check_background_tasks` applies them on the UI task,
//! so the reader state is only ever touched from one place.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use qurancache_core::{
    Action, ApiClient, CacheManager, ChapterSummary, Command, DataLoader, ReaderState,
};

use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

const REFRESHING_STATUS: &str = "Refreshing...";

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub loader: Arc<DataLoader>,
    pub reader: ReaderState,

    // UI State
    pub state: AppState,
    pub reader_name: Option<String>,
    /// Index into the chapter list.
    pub selection: usize,
    /// Extra lines scrolled past the selected row, for reading long chapters.
    pub text_scroll: usize,
    /// Advances every event-loop tick; drives the loading spinner.
    pub tick: usize,

    // Background task channel
    task_rx: mpsc::Receiver<Action>,
    task_tx: mpsc::Sender<Action>,
    refresh_in_progress: bool,

    // Status bar
    pub status_message: Option<String>,
    pub cache_age: Option<String>,
}

impl App {
    /// Create the application from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let cache = CacheManager::new(cache_dir)?;
        let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
        let loader = DataLoader::new(Arc::new(api), cache, config.loader_options());

        let mut app = Self::with_loader(loader, config.verse_cache_capacity);
        app.reader_name = config.reader_name.clone();
        Ok(app)
    }

    pub fn with_loader(loader: DataLoader, verse_cache_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            loader: Arc::new(loader),
            reader: ReaderState::new(verse_cache_capacity),
            state: AppState::Normal,
            reader_name: None,
            selection: 0,
            text_scroll: 0,
            tick: 0,
            task_rx: rx,
            task_tx: tx,
            refresh_in_progress: false,
            status_message: None,
            cache_age: None,
        }
    }

    /// Show whatever is cached, then refresh in the background.
    ///
    /// The cache is applied before the refresh task exists, so cached data
    /// is always on screen before any network result can arrive.
    pub fn start(&mut self) {
        self.loader.restore(&mut self.reader);
        self.cache_age = self.loader.cache().library_age();
        self.refresh_background();
    }

    /// Spawn a background refresh of the chapter list and last-read verse.
    pub fn refresh_background(&mut self) {
        if self.refresh_in_progress {
            debug!("Refresh already in progress");
            return;
        }
        info!("Starting background refresh");
        self.refresh_in_progress = true;
        self.status_message = Some(REFRESHING_STATUS.to_string());

        let loader = Arc::clone(&self.loader);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let action = loader.fetch_library().await;
            Self::send_result(&tx, action).await;
        });
    }

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<Action>, action: Action) {
        if let Err(e) = tx.send(action).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    // =========================================================================
    // Chapter selection
    // =========================================================================

    pub fn selected_chapter(&self) -> Option<&ChapterSummary> {
        self.reader.chapters().get(self.selection)
    }

    /// Expand or collapse the selected chapter.
    pub fn toggle_selected(&mut self) {
        let Some(number) = self.selected_chapter().map(|c| c.number) else {
            return;
        };
        self.text_scroll = 0;
        let commands = self.reader.apply(Action::ToggleChapter(number));
        self.run_commands(commands);
    }

    pub fn select_next(&mut self) {
        self.select(self.selection.saturating_add(1));
    }

    pub fn select_prev(&mut self) {
        self.select(self.selection.saturating_sub(1));
    }

    pub fn page_down(&mut self) {
        self.select(self.selection.saturating_add(PAGE_SCROLL_SIZE));
    }

    pub fn page_up(&mut self) {
        self.select(self.selection.saturating_sub(PAGE_SCROLL_SIZE));
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(usize::MAX);
    }

    fn select(&mut self, index: usize) {
        let last = self.reader.chapters().len().saturating_sub(1);
        self.selection = index.min(last);
        self.text_scroll = 0;
    }

    pub fn scroll_text_down(&mut self, lines: usize) {
        self.text_scroll = self.text_scroll.saturating_add(lines);
    }

    pub fn scroll_text_up(&mut self, lines: usize) {
        self.text_scroll = self.text_scroll.saturating_sub(lines);
    }

    pub fn dismiss_notice(&mut self) {
        self.reader.apply(Action::DismissNotice);
    }

    // =========================================================================
    // Command execution
    // =========================================================================

    fn run_commands(&mut self, commands: Vec<Command>) {
        for command in self.loader.run_local(commands) {
            match command {
                Command::FetchVerses {
                    chapter,
                    generation,
                } => self.spawn_fetch_verses(chapter, generation),
                Command::ShowNotice(notice) => {
                    // Rendered from the reader state as an overlay
                    info!(?notice, "Showing notice");
                }
                Command::PersistLibrary(_) => {}
            }
        }
    }

    fn spawn_fetch_verses(&mut self, chapter: u32, generation: u64) {
        debug!(chapter, generation, "Fetching chapter verses");
        self.status_message = Some(format!("Loading chapter {}...", chapter));

        let loader = Arc::clone(&self.loader);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let action = match loader.fetch_verses(chapter).await {
                Ok(verses) => Action::VersesLoaded {
                    chapter,
                    generation,
                    verses,
                },
                Err(e) => {
                    warn!(chapter, error = %e, "Failed to fetch chapter verses");
                    Action::VersesFailed {
                        chapter,
                        generation,
                        error: e.to_string(),
                    }
                }
            };
            Self::send_result(&tx, action).await;
        });
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Apply every result the background tasks have produced so far.
    pub fn check_background_tasks(&mut self) {
        while let Ok(action) = self.task_rx.try_recv() {
            self.process_task_result(action);
        }
    }

    fn process_task_result(&mut self, action: Action) {
        match &action {
            Action::RefreshSucceeded(_) => {
                self.refresh_in_progress = false;
                self.status_message = None;
            }
            Action::RefreshFailed(reason) => {
                self.refresh_in_progress = false;
                self.status_message = Some(format!("Update failed: {}", reason));
            }
            Action::VersesLoaded { .. } => {
                // Fall back to the refresh status if one is still running
                self.status_message = self
                    .refresh_in_progress
                    .then(|| REFRESHING_STATUS.to_string());
            }
            Action::VersesFailed { chapter, error, .. } => {
                self.status_message = Some(format!("Could not load chapter {}: {}", chapter, error));
            }
            _ => {}
        }

        let refreshed = matches!(action, Action::RefreshSucceeded(_));
        let commands = self.reader.apply(action);
        self.run_commands(commands);

        if refreshed {
            self.cache_age = self.loader.cache().library_age();
        }
        // Chapter list may have shrunk
        self.selection = self.selection.min(self.reader.chapters().len().saturating_sub(1));
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_progress
    }

    /// Wait for the next background result and apply it.
    #[cfg(test)]
    pub async fn wait_for_task(&mut self) {
        if let Some(action) = self.task_rx.recv().await {
            self.process_task_result(action);
        }
    }
}
