//! Error message formatting with actionable suggestions.

use super::{ColorSupport, Style};
use forge_core::error::ForgeError;
use std::error::Error;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with its location, suggestion and source chain
    pub fn format_error(&self, error: &ForgeError) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.paint(Style::Red, "error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        if let ForgeError::TomlParse { line, column, .. } = error {
            if *line > 0 {
                output.push_str(&self.format_location(*line, *column));
                output.push('\n');
            }
        }

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.paint(Style::Dim, "help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        let mut source = error.source();
        while let Some(err) = source {
            output.push('\n');
            output.push_str(&self.colors.paint(Style::Dim, "caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            source = err.source();
        }

        output
    }

    /// Format a simple error message
    pub fn format_simple(&self, message: &str) -> String {
        format!("{}: {}", self.colors.paint(Style::Red, "error"), message)
    }

    fn format_location(&self, line: usize, column: usize) -> String {
        format!("{} line {}, column {}", self.colors.paint(Style::Dim, "-->"), line, column)
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
