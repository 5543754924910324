//! Write the report to standard output
//! It is the default writer, each piece of the report is printed as
//! soon as it is produced.

use std::io::{stdout, Write};

use super::ReportWriter;
use crate::errors::Error;

/// A writer to print the report in the terminal.
pub struct TextStdoutWriter;

impl TextStdoutWriter {
    /// Creates a new TextStdoutWriter
    pub fn new() -> Self {
        TextStdoutWriter
    }
}

impl ReportWriter for TextStdoutWriter {
    /// Prints a piece of the report on STDOUT
    fn write(&mut self, text: &str) {
        print!("{}", text);
    }

    /// Makes sure everything reached the terminal
    fn finish(&mut self) -> Result<(), Error> {
        stdout().flush().ok();
        Ok(())
    }
}
