// State machine behind the full-screen list.
//
// The Navigator never touches the terminal. `tui` feeds it keys and draws
// whatever state it is in:
//
//   Loading ──load()──▶ Browsing ──Enter──▶ Editing ──submit──▶ Loading
//                        │   ▲                 │
//                        │   └────cancel───────┘
//                        └──quit──▶ Exiting

use super::keymap::{EditKey, NavKey};
use crate::article::Article;
use std::ops::Range;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns taken by the `> ` selection marker.
pub const MARKER_WIDTH: usize = 2;
/// Columns moved per left/right press.
pub const HSCROLL_STEP: usize = 8;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Browsing,
    Editing,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// State changed, redraw.
    Moved,
    /// Valid key with nothing to do (e.g. already at the top).
    Unchanged,
    /// Enter on an item; the Navigator is now editing.
    Selected(usize),
    Quit,
    /// Unbound key or a key that does not apply in the current phase.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Pending,
    Submitted(String),
    Cancelled,
}

/// Single-line input for the new name. Never submits an empty name.
#[derive(Debug, Default, Clone)]
pub struct NameEditor {
    buffer: String,
}

impl NameEditor {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn handle(&mut self, key: EditKey) -> EditOutcome {
        match key {
            EditKey::Char(c) => {
                self.buffer.push(c);
                EditOutcome::Pending
            }
            EditKey::Backspace => {
                self.buffer.pop();
                EditOutcome::Pending
            }
            EditKey::Submit => {
                let name = self.buffer.trim();
                if name.is_empty() {
                    EditOutcome::Pending
                } else {
                    EditOutcome::Submitted(name.to_string())
                }
            }
            EditKey::Cancel => EditOutcome::Cancelled,
        }
    }
}

#[derive(Debug)]
pub struct Navigator {
    items: Vec<Article>,
    cursor: usize,
    offset: usize,
    h_offset: usize,
    visible_rows: usize,
    columns: usize,
    phase: Phase,
    editor: NameEditor,
}

impl Navigator {
    pub fn new(columns: usize, visible_rows: usize) -> Self {
        Navigator {
            items: Vec::new(),
            cursor: 0,
            offset: 0,
            h_offset: 0,
            visible_rows: visible_rows.max(1),
            columns,
            phase: Phase::Loading,
            editor: NameEditor::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[Article] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn h_offset(&self) -> usize {
        self.h_offset
    }

    #[cfg(test)]
    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn editor(&self) -> &NameEditor {
        &self.editor
    }

    /// Indices of the items inside the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.visible_rows).min(self.items.len());
        self.offset.min(end)..end
    }

    pub fn start_loading(&mut self) {
        self.phase = Phase::Loading;
    }

    /// A fetch finished: show `items` from the top.
    pub fn load(&mut self, items: Vec<Article>) {
        self.items = items;
        self.cursor = 0;
        self.offset = 0;
        self.h_offset = 0;
        self.phase = Phase::Browsing;
    }

    /// Keep the cursor inside the viewport after the terminal changed size.
    pub fn resize(&mut self, columns: usize, visible_rows: usize) {
        self.columns = columns;
        self.visible_rows = visible_rows.max(1);
        if self.cursor >= self.offset + self.visible_rows {
            self.offset = self.cursor + 1 - self.visible_rows;
        }
        self.h_offset = self.h_offset.min(self.max_h_offset());
    }

    pub fn handle(&mut self, key: NavKey) -> NavOutcome {
        if self.phase != Phase::Browsing {
            return NavOutcome::Ignored;
        }
        match key {
            NavKey::Up => self.move_up(),
            NavKey::Down => self.move_down(),
            NavKey::Left => self.scroll_horizontally(-1),
            NavKey::Right => self.scroll_horizontally(1),
            NavKey::Enter => {
                if self.items.is_empty() {
                    return NavOutcome::Unchanged;
                }
                self.editor = NameEditor::default();
                self.phase = Phase::Editing;
                NavOutcome::Selected(self.cursor)
            }
            NavKey::Quit => {
                self.phase = Phase::Exiting;
                NavOutcome::Quit
            }
            NavKey::Unknown(description) => {
                log::warn!("unknown key: {description}");
                NavOutcome::Ignored
            }
        }
    }

    /// Feed the name editor. A submitted name moves on to `Loading`, a
    /// cancel goes back to browsing the same list.
    pub fn edit(&mut self, key: EditKey) -> EditOutcome {
        if self.phase != Phase::Editing {
            return EditOutcome::Pending;
        }
        let outcome = self.editor.handle(key);
        match outcome {
            EditOutcome::Submitted(_) => self.phase = Phase::Loading,
            EditOutcome::Cancelled => self.phase = Phase::Browsing,
            EditOutcome::Pending => {}
        }
        outcome
    }

    fn move_up(&mut self) -> NavOutcome {
        if self.cursor == 0 {
            return NavOutcome::Unchanged;
        }
        self.cursor -= 1;
        if self.cursor < self.offset {
            self.offset -= 1;
        }
        NavOutcome::Moved
    }

    fn move_down(&mut self) -> NavOutcome {
        if self.cursor + 1 >= self.items.len() {
            return NavOutcome::Unchanged;
        }
        self.cursor += 1;
        if self.cursor >= self.offset + self.visible_rows {
            self.offset += 1;
        }
        NavOutcome::Moved
    }

    fn scroll_horizontally(&mut self, direction: isize) -> NavOutcome {
        let target = if direction < 0 {
            self.h_offset.saturating_sub(HSCROLL_STEP)
        } else {
            (self.h_offset + HSCROLL_STEP).min(self.max_h_offset())
        };
        if target == self.h_offset {
            return NavOutcome::Unchanged;
        }
        self.h_offset = target;
        NavOutcome::Moved
    }

    fn max_h_offset(&self) -> usize {
        let longest = self
            .items
            .iter()
            .map(|a| a.to_string().width())
            .max()
            .unwrap_or(0);
        (MARKER_WIDTH + longest).saturating_sub(self.columns)
    }
}

/// Cut `text` to at most `max_width` columns, ending in `...` when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    // Too narrow for an ellipsis: plain cut.
    let (budget, suffix) = if max_width >= ELLIPSIS.len() {
        (max_width - ELLIPSIS.len(), ELLIPSIS)
    } else {
        (max_width, "")
    };
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(suffix);
    out
}

/// The part of `text` between column `skip` and `skip + width`.
pub fn clip(text: &str, skip: usize, width: usize) -> String {
    let mut out = String::new();
    let mut col = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if col >= skip + width || col + w > skip + width {
            break;
        }
        if col >= skip {
            out.push(c);
        }
        col += w;
    }
    out
}
