// Fallback interface: numbered listing, numeric selection and a plain
// prompt for the new name. Used when the config turns the full-screen list
// off or the terminal cannot host it.

use super::Frontend;
use crate::article::Article;
use crate::console::Console;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

const SELECTION_PROMPT: &str = "Select an article you wish to rename: (q to quit)";
const SELECTION_ERROR: &str = "Please select a valid number from the list";
const NAME_PROMPT: &str = "Enter a new name";

pub struct LineFrontend<C: Console> {
    console: C,
    spinner: Option<ProgressBar>,
}

impl<C: Console> LineFrontend<C> {
    pub fn new(console: C) -> Self {
        LineFrontend { console, spinner: None }
    }

    pub fn console(&self) -> &C {
        &self.console
    }
}

/// 1-based `input` to a 0-based index into `count` items.
pub fn parse_selection(input: &str, count: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

impl<C: Console> Frontend for LineFrontend<C> {
    fn present(&mut self, items: &[Article]) -> Result<()> {
        self.console.write_line("Articles in list:")?;
        for (idx, article) in items.iter().enumerate() {
            self.console.write_line(&format!("{}. {}", idx + 1, article))?;
        }
        Ok(())
    }

    fn prompt_selection(&mut self, count: usize) -> Result<Option<usize>> {
        if count == 0 {
            self.console.write_line("There is nothing to rename.")?;
            return Ok(None);
        }
        loop {
            let Some(input) = self.console.read_line(SELECTION_PROMPT)? else {
                return Ok(None);
            };
            if input.trim() == "q" {
                return Ok(None);
            }
            match parse_selection(&input, count) {
                Some(index) => return Ok(Some(index)),
                None => self.console.write_line(SELECTION_ERROR)?,
            }
        }
    }

    fn prompt_new_name(&mut self, old: &str) -> Result<Option<String>> {
        self.console.write_line(&format!("Selected article: {old}"))?;
        loop {
            let Some(input) = self.console.read_line(NAME_PROMPT)? else {
                return Ok(None);
            };
            let name = input.trim();
            if !name.is_empty() {
                return Ok(Some(name.to_string()));
            }
        }
    }

    fn draw_progress(&mut self, message: &str, _frame: usize) -> Result<()> {
        let spinner = self.spinner.get_or_insert_with(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                spinner.set_style(style);
            }
            spinner
        });
        spinner.set_message(format!("{message}..."));
        spinner.tick();
        Ok(())
    }

    fn clear_progress(&mut self) -> Result<()> {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        Ok(())
    }
}
