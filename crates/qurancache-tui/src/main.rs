//! qurancache - a terminal Quran reader.
//!
//! Lists the chapters, shows the last-read verse and expands a chapter's
//! verses on demand. The chapter list and last-read verse are cached on
//! disk, so the reader opens instantly and keeps working offline.

mod app;
mod config;
mod ui;
mod utils;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qurancache_core::{ApiClient, CacheManager, Command, ContentSource, DataLoader, ReaderState};

use app::{App, AppState};
use config::Config;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory while the TUI owns the terminal
const LOG_FILE_NAME: &str = "qurancache.log";

/// Initialize tracing. The TUI logs to a file so output does not land on the
/// alternate screen; headless commands log to stderr.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {:#}, using defaults", e);
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = load_config();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--dump-chapters") => {
            init_tracing(None);
            return dump_chapters(&config).await;
        }
        Some("--dump-chapter") => {
            init_tracing(None);
            let chapter = args
                .get(2)
                .context("Usage: qurancache --dump-chapter <number>")?
                .parse::<u32>()
                .context("Chapter must be a number")?;
            return dump_chapter(&config, chapter).await;
        }
        Some(other) => {
            anyhow::bail!("Unknown argument: {}", other);
        }
        None => {}
    }

    // Create app (and its cache directory) before logging into it
    let mut app = App::new(&config)?;
    let _log_guard = init_tracing(Some(app.loader.cache().cache_dir()));
    info!("qurancache starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Cached data first, then the background refresh
    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("qurancache shutting down");
    Ok(())
}

fn headless_loader(config: &Config) -> Result<DataLoader> {
    let cache_dir = config.cache_dir()?;
    let cache = CacheManager::new(cache_dir)?;
    let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
    let source: Arc<dyn ContentSource> = Arc::new(api);
    Ok(DataLoader::new(source, cache, config.loader_options()))
}

/// Print the chapter list as JSON, falling back to the cache when offline.
async fn dump_chapters(config: &Config) -> Result<()> {
    let loader = headless_loader(config)?;
    let mut state = ReaderState::new(config.verse_cache_capacity);

    for command in loader.initialize(&mut state).await {
        if let Command::ShowNotice(notice) = command {
            anyhow::bail!("{}: {}", notice.title(), notice.message());
        }
    }
    if let Some(age) = loader.cache().library_age() {
        eprintln!("Cache updated {}", age);
    }

    let json = serde_json::to_string_pretty(state.chapters())?;
    println!("{}", json);
    eprintln!("{} chapters", state.chapters().len());
    Ok(())
}

/// Print one chapter's verses as JSON.
async fn dump_chapter(config: &Config, chapter: u32) -> Result<()> {
    let loader = headless_loader(config)?;
    let mut state = ReaderState::new(config.verse_cache_capacity);

    loader
        .toggle_chapter(&mut state, chapter)
        .await
        .with_context(|| format!("Failed to fetch chapter {}", chapter))?;

    let verses = state.verses(chapter).unwrap_or_default();
    let json = serde_json::to_string_pretty(verses)?;
    println!("{}", json);
    eprintln!("{} verses in {}", verses.len(), loader.options().edition);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    if handle_input(app, key) {
                        return Ok(());
                    }
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();
        app.tick = app.tick.wrapping_add(1);

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            if app.is_refreshing() {
                warn!("Quitting with a refresh still in flight");
            }
            return Ok(());
        }
    }
}
