//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

/// Lines moved per J/K press when reading an expanded chapter.
const TEXT_SCROLL_STEP: usize = 3;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Offline notice sits on top of everything else
    if app.reader.notice().is_some() {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => app.dismiss_notice(),
            KeyCode::Char('u') => {
                app.dismiss_notice();
                app.refresh_background();
            }
            KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('u') => app.refresh_background(),
        // Nothing to navigate until the first load finishes
        _ if app.reader.is_loading() => {}
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('J') => app.scroll_text_down(TEXT_SCROLL_STEP),
        KeyCode::Char('K') => app.scroll_text_up(TEXT_SCROLL_STEP),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        _ => {}
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use qurancache_core::testing::{sample_chapters, StaticSource};
    use qurancache_core::{Action, CacheManager, DataLoader, LastReadMarker, Library, LoaderOptions};
    use tempfile::{tempdir, TempDir};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (App, TempDir) {
        let dir = tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");
        let loader = DataLoader::new(Arc::new(StaticSource::offline()), cache, LoaderOptions::default());
        (App::with_loader(loader, 114), dir)
    }

    fn load(app: &mut App, chapters: u32) {
        app.reader.apply(Action::CacheLoaded(Some(Library {
            chapters: sample_chapters(chapters),
            last_read: LastReadMarker::new("x"),
        })));
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let (mut app, _dir) = app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q')));
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_toggles() {
        let (mut app, _dir) = app();
        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_navigation_ignored_while_loading() {
        let (mut app, _dir) = app();
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.selection, 0);
    }

    #[test]
    fn test_navigation_keys() {
        let (mut app, _dir) = app();
        load(&mut app, 114);

        handle_input(&mut app, key(KeyCode::Char('j')));
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.selection, 2);
        handle_input(&mut app, key(KeyCode::PageDown));
        assert_eq!(app.selection, 12);
        handle_input(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.selection, 11);
        handle_input(&mut app, key(KeyCode::End));
        assert_eq!(app.selection, 113);
        handle_input(&mut app, key(KeyCode::Home));
        assert_eq!(app.selection, 0);
    }

    #[test]
    fn test_text_scroll_resets_on_selection_change() {
        let (mut app, _dir) = app();
        load(&mut app, 5);

        handle_input(&mut app, key(KeyCode::Char('J')));
        handle_input(&mut app, key(KeyCode::Char('J')));
        assert_eq!(app.text_scroll, 6);
        handle_input(&mut app, key(KeyCode::Char('K')));
        assert_eq!(app.text_scroll, 3);

        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.text_scroll, 0);
    }

    #[test]
    fn test_notice_is_dismissed_before_other_keys() {
        let (mut app, _dir) = app();
        app.reader.apply(Action::RefreshFailed("offline".into()));
        assert!(app.reader.notice().is_some());

        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Enter));
        assert!(app.reader.notice().is_none());
    }
}
