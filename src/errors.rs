//! This module declares the errors that rhsecq distinguishes.
//!
//! The taxonomy is deliberately small. What matters to the caller is
//! whether a failure concerns one identifier or the whole run, not
//! which layer produced it.

use thiserror::Error;

/// Represents a failure raised while querying or reporting.
#[derive(Debug, Error)]
pub enum Error {
    /// The API doesn't know the requested resource.
    ///
    /// Raised on a 4xx answer. A lookup batch recovers from it by
    /// printing a fallback block and moving on, a search doesn't.
    #[error("{0}: not found in the Red Hat security data")]
    NotFound(String),

    /// The API couldn't be reached, answered 5xx or sent back a body
    /// that doesn't decode. Always fatal.
    #[error("{0}")]
    Transport(String),

    /// A field selection or an extracted search result that can't be
    /// understood. Detected before any network activity when it comes
    /// from the command line.
    #[error("{0}")]
    MalformedSelection(String),

    /// The pastebin couldn't be reached or refused the report.
    #[error("pastebin error: {0}")]
    SinkRejected(String),
}
