use crate::error::Error;
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

fn require_terminal(is_tty: bool) -> Result<(), Error> {
    if is_tty {
        Ok(())
    } else {
        Err(Error::NotATerminal)
    }
}

/// Takes over the terminal: alternate screen, raw (no echo, unbuffered)
/// input, hidden cursor.
pub fn init() -> Result<Tui, Error> {
    require_terminal(io::stdout().is_tty())?;

    enable_raw_mode().map_err(Error::Terminal)?;
    if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, cursor::Hide) {
        let _ = disable_raw_mode();
        return Err(Error::Terminal(err));
    }

    let backend = CrosstermBackend::new(io::stdout());
    match Terminal::new(backend) {
        Ok(terminal) => Ok(terminal),
        Err(err) => {
            let _ = restore();
            Err(Error::Terminal(err))
        }
    }
}

pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

// RAII wrapper for automatic cleanup
pub struct TuiGuard {
    pub terminal: Tui,
}

impl TuiGuard {
    pub fn new() -> Result<Self, Error> {
        let terminal = init()?;
        Ok(TuiGuard { terminal })
    }
}

impl Drop for TuiGuard {
    fn drop(&mut self) {
        if let Err(err) = restore() {
            tracing::error!(error = %err, "failed to restore terminal");
            eprintln!("Error restoring terminal: {}", err);
        }
    }
}

impl std::ops::Deref for TuiGuard {
    type Target = Tui;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl std::ops::DerefMut for TuiGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}
