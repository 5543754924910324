//! Writing reports
//!
//! Once the queries are done, it's up to a writer to handle the report
//! text. It provides a common interface, allowing to route the same
//! report to standard output or to a pastebin without affecting the
//! execution of the application.

pub mod pastebin;
pub mod textstdout;

use crate::errors::Error;

/// A trait to have a common interface between writers.
/// A writer receives the report piece by piece while the queries run,
/// and settles it once the run is over.
pub trait ReportWriter {
    /// Hands one piece of report text to the writer.
    fn write(&mut self, text: &str);

    /// Settles the report. For a buffering writer this is the moment
    /// the content leaves the program.
    fn finish(&mut self) -> Result<(), Error>;
}
