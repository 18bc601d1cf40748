use std::io::{IsTerminal, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::metrics::ProgressSink;

/// Overwritable `Completed x from n requests` line on stderr. Only drawn
/// when stderr is a terminal; cleared again before the report is printed.
pub(crate) struct ProgressLine {
    enabled: bool,
    no_color: bool,
    drawn: bool,
}

impl ProgressLine {
    pub(crate) fn new(enabled: bool, no_color: bool) -> Self {
        Self {
            enabled: enabled && std::io::stderr().is_terminal(),
            no_color,
            drawn: false,
        }
    }
}

impl ProgressSink for ProgressLine {
    fn update(&mut self, completed: u64, total: u64) {
        if !self.enabled {
            return;
        }
        if let Err(err) = render_progress_line(completed, total, self.no_color) {
            tracing::debug!("Disabling progress line: {}", err);
            self.enabled = false;
            return;
        }
        self.drawn = true;
    }

    fn finish(&mut self) {
        if !self.drawn {
            return;
        }
        if let Err(err) = clear_progress_line() {
            tracing::debug!("Failed to clear progress line: {}", err);
        }
        self.drawn = false;
    }
}

pub(crate) fn progress_text(completed: u64, total: u64) -> String {
    format!("Completed {} from {} requests", completed, total)
}

fn render_progress_line(completed: u64, total: u64, no_color: bool) -> Result<(), std::io::Error> {
    let text = progress_text(completed, total);
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    if no_color {
        queue!(out, Print(text))?;
    } else {
        queue!(out, SetForegroundColor(Color::Cyan), Print(text), ResetColor)?;
    }
    out.flush()?;
    Ok(())
}

fn clear_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    out.flush()?;
    Ok(())
}
