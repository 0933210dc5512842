use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{fit_to_width, wrap_indented};

const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Column widths of a chapter row
const NAME_WIDTH: usize = 20;
const DETAILS_WIDTH: usize = 22;

/// Left margin of expanded verse text
const VERSE_INDENT: usize = 6;

/// The last-read card never shrinks below this many text lines.
const CARD_MIN_TEXT_LINES: usize = 2;
const CARD_MAX_TEXT_LINES: usize = 6;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.reader.is_loading() {
        render_loading(frame, app, area);
        return;
    }

    let card_height = last_read_card_height(app, area.width);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),           // Greeting
            Constraint::Length(card_height), // Last read card
            Constraint::Min(5),              // Chapter list
        ])
        .split(area);

    render_greeting(frame, app, chunks[0]);
    render_last_read(frame, app, chunks[1]);
    render_chapters(frame, app, chunks[2]);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let spinner = SPINNER_FRAMES[app.tick % SPINNER_FRAMES.len()];
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(spinner, styles::title_style()),
        Span::styled(" Loading chapters...", styles::muted_style()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, line_area);
}

fn render_greeting(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        " Assalamu Alaikum",
        styles::muted_style(),
    ))];
    if let Some(ref name) = app.reader_name {
        lines.push(Line::from(Span::styled(format!(" {}", name), styles::title_style())));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn last_read_card_height(app: &App, width: u16) -> u16 {
    let text = app
        .reader
        .last_read()
        .map(|m| m.text.as_str())
        .unwrap_or_default();
    let text_lines = wrap_indented(text, (width as usize).saturating_sub(4), 0)
        .len()
        .clamp(CARD_MIN_TEXT_LINES, CARD_MAX_TEXT_LINES);
    // Borders plus the location line
    (text_lines + 3) as u16
}

fn render_last_read(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.reader.last_read() {
        Some(marker) => vec![
            Line::from(Span::styled(marker.location_display(), styles::title_style())),
            Line::from(Span::styled(marker.text.clone(), styles::verse_style())),
        ],
        None => vec![Line::from(Span::styled(
            "Nothing read yet",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Last Read ")
        .title_style(styles::card_style())
        .borders(Borders::ALL)
        .border_style(styles::card_style());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Rendered chapter list plus the line the selected row landed on.
pub struct ChapterLines {
    pub lines: Vec<Line<'static>>,
    pub selected_line: usize,
}

/// One line per chapter, in list order; the expanded chapter's verses follow
/// its row, wrapped to `width`.
pub fn chapter_lines(app: &App, width: usize) -> ChapterLines {
    let expanded = app.reader.expanded();
    let mut lines = Vec::new();
    let mut selected_line = 0;

    for (i, chapter) in app.reader.chapters().iter().enumerate() {
        let is_expanded = expanded == Some(chapter.number);
        let selected = i == app.selection;
        if selected {
            selected_line = lines.len();
        }

        let marker = if is_expanded { "▾" } else { "▸" };
        let row = format!(
            " {} {:>3}. {} {} ",
            marker,
            chapter.number,
            fit_to_width(&chapter.english_name, NAME_WIDTH),
            fit_to_width(&chapter.details_display(), DETAILS_WIDTH),
        );
        let (row_style, arabic_style) = if selected {
            (styles::selected_style(), styles::selected_style().fg(styles::PRIMARY))
        } else {
            (styles::list_item_style(), styles::arabic_style())
        };
        lines.push(Line::from(vec![
            Span::styled(row, row_style),
            Span::styled(chapter.arabic_name.clone(), arabic_style),
        ]));

        if app.reader.is_fetching(chapter.number) {
            lines.push(Line::from(Span::styled(
                format!("{}loading...", " ".repeat(VERSE_INDENT)),
                styles::muted_style(),
            )));
        }

        if is_expanded {
            if let Some(verses) = app.reader.verses(chapter.number) {
                for verse in verses {
                    for text in wrap_indented(&verse.display_line(), width, VERSE_INDENT) {
                        lines.push(Line::from(Span::styled(text, styles::verse_style())));
                    }
                }
            }
        }
    }

    ChapterLines {
        lines,
        selected_line,
    }
}

/// First visible line: the selected row sits a third of the way down, moved
/// by any manual text scroll, and never past the point where the last line
/// reaches the bottom.
pub fn scroll_offset(selected_line: usize, text_scroll: usize, height: usize, total: usize) -> usize {
    let base = selected_line.saturating_sub(height / 3);
    let max_offset = total.saturating_sub(height);
    (base + text_scroll).min(max_offset)
}

fn render_chapters(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Surah ({}) ", app.reader.chapters().len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if app.reader.chapters().is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            " No chapters available",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;
    let ChapterLines {
        lines,
        selected_line,
    } = chapter_lines(app, inner_width);
    let offset = scroll_offset(selected_line, app.text_scroll, inner_height, lines.len());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use qurancache_core::testing::{sample_chapters, sample_verses, StaticSource};
    use qurancache_core::{Action, CacheManager, Command, DataLoader, LastReadMarker, Library, LoaderOptions};
    use tempfile::{tempdir, TempDir};

    fn ready_app(chapters: u32) -> (App, TempDir) {
        let dir = tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("Failed to create cache");
        let loader = DataLoader::new(Arc::new(StaticSource::offline()), cache, LoaderOptions::default());
        let mut app = App::with_loader(loader, 114);
        app.reader.apply(Action::CacheLoaded(Some(Library {
            chapters: sample_chapters(chapters),
            last_read: LastReadMarker::new("In the beginning..."),
        })));
        (app, dir)
    }

    fn expand(app: &mut App, chapter: u32, verses: u32) {
        let commands = app.reader.apply(Action::ToggleChapter(chapter));
        let Some(Command::FetchVerses { generation, .. }) = commands.into_iter().next() else {
            panic!("expected a fetch command");
        };
        app.reader.apply(Action::VersesLoaded {
            chapter,
            generation,
            verses: sample_verses(verses),
        });
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_one_row_per_chapter() {
        let (app, _dir) = ready_app(114);
        let rendered = chapter_lines(&app, 80);
        assert_eq!(rendered.lines.len(), 114);
        assert!(text(&rendered.lines[0]).contains("1. Chapter 1"));
        assert!(text(&rendered.lines[113]).contains("114. Chapter 114"));
    }

    #[test]
    fn test_expanded_chapter_lists_verses_below_its_row() {
        let (mut app, _dir) = ready_app(5);
        expand(&mut app, 2, 3);
        app.selection = 3;

        let rendered = chapter_lines(&app, 80);
        assert_eq!(rendered.lines.len(), 8);
        assert!(text(&rendered.lines[1]).contains("▾"));
        assert_eq!(text(&rendered.lines[2]), "      1. Verse 1");
        assert_eq!(text(&rendered.lines[4]), "      3. Verse 3");
        assert!(text(&rendered.lines[5]).contains("3. Chapter 3"));
        // Chapter 4 is pushed down by the three verse lines
        assert_eq!(rendered.selected_line, 6);
    }

    #[test]
    fn test_collapsed_chapter_hides_verses() {
        let (mut app, _dir) = ready_app(5);
        expand(&mut app, 2, 3);
        app.reader.apply(Action::ToggleChapter(2));

        assert_eq!(chapter_lines(&app, 80).lines.len(), 5);
    }

    #[test]
    fn test_fetching_chapter_shows_loading_line() {
        let (mut app, _dir) = ready_app(3);
        app.reader.apply(Action::ToggleChapter(1));

        let rendered = chapter_lines(&app, 80);
        assert_eq!(rendered.lines.len(), 4);
        assert_eq!(text(&rendered.lines[1]).trim(), "loading...");
    }

    #[test]
    fn test_scroll_offset() {
        // Near the top nothing scrolls
        assert_eq!(scroll_offset(2, 0, 30, 114), 0);
        // Selection is kept a third of the way down
        assert_eq!(scroll_offset(50, 0, 30, 114), 40);
        // Manual scroll moves further
        assert_eq!(scroll_offset(50, 5, 30, 114), 45);
        // Never scroll past the end
        assert_eq!(scroll_offset(113, 50, 30, 114), 84);
        // Everything fits
        assert_eq!(scroll_offset(10, 3, 30, 20), 0);
    }
}
