//! Terminal output formatting.
//!
//! Command results go to stdout so they can be piped; status lines,
//! warnings and errors go to stderr. ANSI styling is applied only when both
//! streams are terminals and `NO_COLOR` is unset.

use std::io::{self, IsTerminal};

pub mod errors;

/// ANSI styles used by forge output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Dim,
    Red,
    Green,
    Yellow,
}

impl Style {
    fn code(self) -> u8 {
        match self {
            Style::Dim => 2,
            Style::Red => 31,
            Style::Green => 32,
            Style::Yellow => 33,
        }
    }
}

/// Whether output is styled
#[derive(Debug, Clone, Copy)]
pub struct ColorSupport {
    enabled: bool,
}

impl ColorSupport {
    /// Detect from `NO_COLOR` and the terminal state of stdout and stderr
    pub fn detect() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none()
            && io::stderr().is_terminal()
            && io::stdout().is_terminal();
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", style.code(), text)
        } else {
            text.to_string()
        }
    }
}

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Output handler with colors disabled
    pub fn plain() -> Self {
        Self {
            colors: ColorSupport::disabled(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a status line to stderr
    pub fn status(&self, message: &str) {
        eprintln!("{}", self.colors.paint(Style::Dim, message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.paint(Style::Green, "✓"), message);
    }

    /// Print a negative result to stdout
    pub fn failure(&self, message: &str) {
        println!("{} {}", self.colors.paint(Style::Red, "✗"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.paint(Style::Yellow, "⚠"), message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
