//! This module normalizes and wraps the long text fields of a CVE
//! report (acknowledgement, details, statement).

use regex::Regex;
use textwrap::wrap_algorithms::WrapAlgorithm;
use textwrap::Options;

use crate::models::record::OneOrMany;

/// The indent put in front of every wrapped line.
const WRAP_INDENT: &str = "   ";

/// The width used when no --wrap is given and the terminal width
/// can't be determined.
const FALLBACK_WIDTH: usize = 70;

/// Represents the wrapping behavior of a report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WrapMode {
    /// Long text stays joined on a single line.
    Disabled,
    /// Long text is folded to this many columns.
    Columns(usize),
}

impl WrapMode {
    /// Builds the mode from the value of the --wrap option.
    ///
    /// Without the option the width is the terminal width minus two,
    /// or 70 columns when the terminal width can't be determined. A
    /// width of 0 disables wrapping.
    pub fn from_flag(flag: Option<usize>) -> Self {
        match flag {
            Some(width) => WrapMode::from_width(width),
            None => WrapMode::from_width(
                term_size::dimensions().map_or(FALLBACK_WIDTH, |(w, _)| w.saturating_sub(2)),
            ),
        }
    }

    fn from_width(width: usize) -> Self {
        if width == 0 {
            WrapMode::Disabled
        } else {
            WrapMode::Columns(width)
        }
    }
}

/// Represents the text processor applied to the long fields of a
/// record before they are printed.
pub struct TextWrapper {
    mode: WrapMode,
    newline_runs: Regex,
}

impl TextWrapper {
    /// Creates a new text wrapper.
    pub fn new(mode: WrapMode) -> Self {
        TextWrapper {
            mode,
            newline_runs: Regex::new(r"\n+").unwrap(),
        }
    }

    /// Flattens a text field into a single printable paragraph.
    ///
    /// Each value is stripped of surrounding whitespace and the values
    /// are joined with two spaces, as are the lines inside a value.
    /// When wrapping is on, the paragraph is folded to the configured
    /// width with a three-space indent and pushed to the line below
    /// its label by a leading newline.
    pub fn stripjoin(&self, input: &OneOrMany<String>) -> String {
        let joined = input
            .as_slice()
            .iter()
            .map(|value| value.trim())
            .collect::<Vec<&str>>()
            .join("  ");
        let text = self.newline_runs.replace_all(&joined, "  ");
        match self.mode {
            WrapMode::Disabled => text.into_owned(),
            WrapMode::Columns(width) => {
                // Greedy folding, so that re-wrapping an already
                // wrapped report reproduces it line for line.
                let options = Options::new(width)
                    .initial_indent(WRAP_INDENT)
                    .subsequent_indent(WRAP_INDENT)
                    .wrap_algorithm(WrapAlgorithm::FirstFit);
                format!("\n{}", textwrap::fill(&text, options))
            }
        }
    }
}
