use std::io::{self, IsTerminal};

use crossterm::cursor::Show;
use crossterm::execute;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("not attached to an interactive terminal")]
    Unavailable,
    #[error("failed to switch the terminal into raw mode")]
    ModeSwitch(#[source] io::Error),
}

/// Restores whatever input mode was in effect before the dashboard started.
pub trait TerminalMode {
    fn restore(&mut self) -> io::Result<()>;
}

/// Raw mode and alternate screen as set up by `ratatui::try_init`.
#[derive(Debug, Default)]
pub struct CrosstermMode;

impl TerminalMode for CrosstermMode {
    fn restore(&mut self) -> io::Result<()> {
        ratatui::try_restore()?;
        execute!(io::stdout(), Show)
    }
}

/// Owns the terminal's raw-mode state. Restores it once, either explicitly
/// or when dropped (including during a panic unwind).
pub struct TerminalSession<M: TerminalMode> {
    mode: M,
    restored: bool,
}

impl<M: TerminalMode> TerminalSession<M> {
    pub fn new(mode: M) -> Self {
        Self {
            mode,
            restored: false,
        }
    }

    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(err) = self.mode.restore() {
            tracing::warn!(error = %err, "failed to restore terminal mode");
        }
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }
}

impl<M: TerminalMode> Drop for TerminalSession<M> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Enters raw mode on the controlling terminal.
pub fn init() -> Result<(ratatui::DefaultTerminal, TerminalSession<CrosstermMode>), TerminalError> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(TerminalError::Unavailable);
    }
    let terminal = ratatui::try_init().map_err(TerminalError::ModeSwitch)?;
    Ok((terminal, TerminalSession::new(CrosstermMode)))
}
