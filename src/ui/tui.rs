// Full-screen list drawn with crossterm.
//
// Owns the terminal (raw mode + alternate screen) from `enter` until drop.
// All state lives in the `Navigator`; this module only reads keys into
// it and paints what it says.

use super::keymap::{edit_key, is_press, nav_key};
use super::navigator::{clip, truncate, EditOutcome, NavOutcome, Navigator, Phase, MARKER_WIDTH};
use super::Frontend;
use crate::article::Article;
use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event};
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthStr;

const HEADER: &str = "Articles in list:";
const EMPTY: &str = "No unread articles.";
const HELP: &str = "↑/↓ move  ←/→ scroll  enter rename  q quit";
const OLD_NAME_LABEL: &str = "Old name: ";
const NEW_NAME_LABEL: &str = "Enter a new name: ";
/// Header and help line.
const CHROME_ROWS: u16 = 2;

pub struct TuiFrontend {
    out: Stdout,
    nav: Navigator,
    rows: u16,
}

impl TuiFrontend {
    /// Switch the terminal into full-screen mode.
    pub fn enter() -> Result<Self> {
        let (columns, rows) = terminal::size().context("Reading terminal size")?;
        terminal::enable_raw_mode().context("Enabling raw mode")?;
        // From here on `Drop` puts the terminal back, even if the rest fails.
        let mut tui = TuiFrontend {
            out: io::stdout(),
            nav: Navigator::new(columns as usize, rows.saturating_sub(CHROME_ROWS) as usize),
            rows,
        };
        execute!(tui.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(tui)
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        self.rows = rows;
        self.nav
            .resize(columns as usize, rows.saturating_sub(CHROME_ROWS) as usize);
    }

    fn draw_list(&mut self) -> Result<()> {
        let columns = self.nav.columns();
        let width = columns.saturating_sub(MARKER_WIDTH);
        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            PrintStyledContent(clip(HEADER, 0, columns).bold())
        )?;

        if self.nav.items().is_empty() {
            queue!(self.out, MoveTo(0, 1), Print(clip(EMPTY, 0, columns)))?;
        }

        let skip = self.nav.h_offset();
        for (row, index) in self.nav.visible_range().enumerate() {
            let article = &self.nav.items()[index];
            let marker = if index == self.nav.cursor() { "> " } else { "  " };
            let title = format!("{}: ", article.display_title());
            let title_part = clip(&title, skip, width);
            let url_part = clip(
                article.canonical_url(true),
                skip.saturating_sub(title.width()),
                width.saturating_sub(title_part.width()),
            );
            queue!(
                self.out,
                MoveTo(0, 1 + row as u16),
                Print(marker),
                Print(title_part),
                PrintStyledContent(url_part.underlined())
            )?;
        }

        if let Some(row) = footer_row(self.rows) {
            queue!(
                self.out,
                MoveTo(0, row),
                PrintStyledContent(truncate(HELP, columns).dim())
            )?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn draw_editor(&mut self, old: &str) -> Result<()> {
        let columns = self.nav.columns();
        let old = truncate(old, columns.saturating_sub(OLD_NAME_LABEL.len() + 1));

        // Keep the end of a long name in view.
        let room = columns.saturating_sub(NEW_NAME_LABEL.len() + 1);
        let typed = self.nav.editor().text();
        let typed = clip(typed, typed.width().saturating_sub(room), room);

        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            PrintStyledContent(OLD_NAME_LABEL.bold()),
            Print(old),
            MoveTo(0, 1),
            Print(NEW_NAME_LABEL),
            Print(typed),
            Show
        )?;
        self.out.flush()?;
        Ok(())
    }
}

impl Frontend for TuiFrontend {
    fn present(&mut self, items: &[Article]) -> Result<()> {
        self.nav.load(items.to_vec());
        self.draw_list()
    }

    fn prompt_selection(&mut self, _count: usize) -> Result<Option<usize>> {
        self.draw_list()?;
        loop {
            match event::read()? {
                Event::Key(key) if is_press(&key) => match self.nav.handle(nav_key(&key)) {
                    NavOutcome::Moved => self.draw_list()?,
                    NavOutcome::Selected(index) => return Ok(Some(index)),
                    NavOutcome::Quit => return Ok(None),
                    NavOutcome::Unchanged | NavOutcome::Ignored => {}
                },
                Event::Resize(columns, rows) => {
                    self.resize(columns, rows);
                    self.draw_list()?;
                }
                _ => {}
            }
        }
    }

    fn prompt_new_name(&mut self, old: &str) -> Result<Option<String>> {
        if self.nav.phase() != Phase::Editing {
            return Ok(None);
        }
        self.draw_editor(old)?;
        loop {
            match event::read()? {
                Event::Key(key) if is_press(&key) => {
                    let Some(edit) = edit_key(&key) else {
                        continue;
                    };
                    match self.nav.edit(edit) {
                        EditOutcome::Submitted(name) => {
                            execute!(self.out, Hide, Clear(ClearType::All))?;
                            return Ok(Some(name));
                        }
                        EditOutcome::Cancelled => {
                            execute!(self.out, Hide)?;
                            return Ok(None);
                        }
                        EditOutcome::Pending => self.draw_editor(old)?,
                    }
                }
                Event::Resize(columns, rows) => {
                    self.resize(columns, rows);
                    self.draw_editor(old)?;
                }
                _ => {}
            }
        }
    }

    fn draw_progress(&mut self, message: &str, frame: usize) -> Result<()> {
        if frame == 0 {
            self.nav.start_loading();
            queue!(self.out, Hide, Clear(ClearType::All))?;
        }
        let dots = ".".repeat((frame + 2) % 4);
        queue!(
            self.out,
            MoveTo(0, 0),
            Clear(ClearType::CurrentLine),
            Print(format!("{message}{dots}"))
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn clear_progress(&mut self) -> Result<()> {
        execute!(self.out, MoveTo(0, 0), Clear(ClearType::CurrentLine))?;
        Ok(())
    }
}

/// The help line sits on the last row, below the list. Terminals without
/// room for a list row go without it.
fn footer_row(rows: u16) -> Option<u16> {
    (rows > CHROME_ROWS).then(|| rows - 1)
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
    }
}
