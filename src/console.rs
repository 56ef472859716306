// Line-oriented human interaction. The authorization acknowledgment and the
// fallback interface both go through `Console` so they can be driven by a
// script in tests.

use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};

pub trait Console {
    /// Show `prompt` and read one line. `None` means input is closed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Standard input/output. Prompts go through `dialoguer` when stdin is a
/// terminal and fall back to plain buffered reads when it is piped.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        StdConsole
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if io::stdin().is_terminal() {
            // `allow_empty` so the caller decides what an empty line means.
            let line: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?;
            return Ok(Some(line));
        }

        let mut stdout = io::stdout();
        write!(stdout, "{prompt}: ")?;
        stdout.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout(), "{line}")
    }
}

/// Replays canned input lines and records everything written.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    pub inputs: std::collections::VecDeque<String>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
}

#[cfg(test)]
impl ScriptedConsole {
    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }
}
