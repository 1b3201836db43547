//! # Character Display
//!
//! Line based status display.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::Infallible;

use log::info;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for character displays.
pub trait CharDisplay {
    type Error;

    /// Blank the whole display.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Show `message` on `line`, counted from 1. Text past the end of the line is cut off.
    fn show_line(&mut self, line: usize, message: &str) -> Result<(), Self::Error>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Display which writes to the log, keeping the current contents so they can be inspected.
pub struct LogDisplay {
    lines: Vec<String>,
    width: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LogDisplay {
    /// Same shape as the common 16x2 LCD.
    pub fn new() -> Self {
        Self::with_size(2, 16)
    }

    pub fn with_size(num_lines: usize, width: usize) -> Self {
        Self {
            lines: vec![String::new(); num_lines],
            width,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDisplay for LogDisplay {
    type Error = Infallible;

    fn clear(&mut self) -> Result<(), Infallible> {
        for line in self.lines.iter_mut() {
            line.clear();
        }
        Ok(())
    }

    fn show_line(&mut self, line: usize, message: &str) -> Result<(), Infallible> {
        // Lines off the display are dropped like on the real thing
        if line == 0 || line > self.lines.len() {
            return Ok(());
        }

        let text: String = message.chars().take(self.width).collect();
        info!("[display {}] {}", line, text);
        self.lines[line - 1] = text;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
