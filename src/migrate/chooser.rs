//! The selection seam for interactive flows.
//!
//! `TermChooser` drives the real terminal in raw mode with arrow-key
//! navigation; `ScriptedChooser` replays a canned pick sequence for
//! tests. Both present the same synchronous "show choices, return one
//! index" contract.

use crate::error::{Result, SyncError};
use crossterm::cursor::MoveUp;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType};
use std::collections::VecDeque;
use std::io::{IsTerminal, Write, stderr};

/// Present choices, return the selected index.
pub trait Chooser {
    /// Show `options` under `prompt` and block until one is selected.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` when the operator aborts, or an I/O error
    /// from the underlying terminal.
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<usize>;
}

/// Raw-terminal chooser with arrow-key navigation.
///
/// Up/Down move, Enter selects, Esc / `q` / Ctrl-C abort.
pub struct TermChooser {
    _private: (),
}

impl TermChooser {
    /// Build a chooser, failing fast when stdin is not a terminal.
    ///
    /// # Errors
    ///
    /// Returns `NotInteractive` outside a capable terminal; interactive
    /// flows treat this as a fatal precondition.
    pub fn new() -> Result<Self> {
        if !std::io::stdin().is_terminal() {
            return Err(SyncError::NotInteractive);
        }
        Ok(Self { _private: () })
    }
}

impl Chooser for TermChooser {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Result<usize> {
        let mut out = stderr();
        writeln!(out, "{prompt}")?;

        terminal::enable_raw_mode()?;
        let result = run_selection(&mut out, options);
        terminal::disable_raw_mode()?;
        writeln!(out)?;
        result
    }
}

fn run_selection(out: &mut impl Write, options: &[String]) -> Result<usize> {
    let rows = u16::try_from(options.len()).unwrap_or(u16::MAX);
    let mut selected = 0usize;

    loop {
        for (i, option) in options.iter().enumerate() {
            let marker = if i == selected { '>' } else { ' ' };
            write!(out, "{marker} {option}\r\n")?;
        }
        out.flush()?;

        let code = loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    break (key.code, key.modifiers);
                }
            }
        };

        execute!(out, MoveUp(rows), Clear(ClearType::FromCursorDown))?;

        match code {
            (KeyCode::Up, _) => selected = selected.saturating_sub(1),
            (KeyCode::Down, _) => {
                selected = (selected + 1).min(options.len().saturating_sub(1));
            }
            (KeyCode::Enter, _) => return Ok(selected),
            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => return Err(SyncError::Interrupted),
            (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
                return Err(SyncError::Interrupted);
            }
            _ => {}
        }
    }
}

/// Test chooser replaying a scripted pick sequence.
pub struct ScriptedChooser {
    picks: VecDeque<usize>,
    abort: bool,
}

impl ScriptedChooser {
    /// Chooser that returns the given indices in order.
    #[must_use]
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
            abort: false,
        }
    }

    /// Chooser that aborts on the first prompt.
    #[must_use]
    pub fn aborting() -> Self {
        Self {
            picks: VecDeque::new(),
            abort: true,
        }
    }

    /// True once every scripted pick has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.picks.is_empty()
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&mut self, _prompt: &str, options: &[String]) -> Result<usize> {
        if self.abort {
            return Err(SyncError::Interrupted);
        }
        let pick = self
            .picks
            .pop_front()
            .ok_or_else(|| SyncError::Config("scripted chooser exhausted".to_string()))?;
        if pick >= options.len() {
            return Err(SyncError::Config(format!(
                "scripted pick {pick} out of range ({} options)",
                options.len()
            )));
        }
        Ok(pick)
    }
}
