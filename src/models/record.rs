//! This module declares the CVE records sent back by the API.
//!
//! The API is loose about shapes. A field holding a list when several
//! values exist is sent bare when there is only one, and the CVSS
//! scores are strings on most records but bare numbers on a few. The
//! types here absorb both shapes so the reports don't have to care.

use serde::Deserialize;
use std::fmt;

/// Represents a value the API sends either bare or wrapped in a list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single bare value.
    One(T),
    /// A list of values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Returns the values as a slice, whatever shape was received.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

/// Represents a CVSS base score, a string on most records but a bare
/// number on some.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScoreValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreValue::Text(text) => write!(f, "{}", text),
            // Scores read x.y even when the value is whole
            ScoreValue::Number(number) if number.fract() == 0.0 => {
                write!(f, "{:.1}", number)
            }
            ScoreValue::Number(number) => write!(f, "{}", number),
        }
    }
}

/// Represents the CVSSv2 rating of a CVE.
#[derive(Clone, Debug, Deserialize)]
pub struct Cvss {
    pub cvss_base_score: ScoreValue,
    pub cvss_scoring_vector: String,
}

/// Represents the CVSSv3 rating of a CVE.
#[derive(Clone, Debug, Deserialize)]
pub struct Cvss3 {
    pub cvss3_base_score: ScoreValue,
    pub cvss3_scoring_vector: String,
}

/// Represents the Bugzilla bug attached to a CVE.
#[derive(Clone, Debug, Deserialize)]
pub struct Bugzilla {
    /// The bug number, e.g. 1326598.
    pub id: String,
    /// The URL of the bug.
    pub url: String,
}

/// Represents a release for which an erratum fixed the CVE.
#[derive(Clone, Debug, Deserialize)]
pub struct AffectedRelease {
    pub product_name: String,
    /// The fixed package NVR. Not always sent.
    pub package: Option<String>,
    /// The advisory carrying the fix, e.g. RHSA-2016:1486.
    pub advisory: String,
}

/// Represents the fix state of a package still without an erratum.
#[derive(Clone, Debug, Deserialize)]
pub struct PackageState {
    pub product_name: String,
    /// The package name. Not always sent.
    pub package_name: Option<String>,
    /// The state, e.g. "Not affected" or "Will not fix".
    pub fix_state: String,
}

/// Represents a CVE record.
///
/// Only the fields the reports know how to print are declared here,
/// anything else in the answer is ignored at decoding time.
#[derive(Clone, Debug, Deserialize)]
pub struct CveRecord {
    /// The canonical CVE identifier of the record. Not part of every
    /// answer.
    pub name: Option<String>,
    pub threat_severity: Option<String>,
    pub public_date: Option<String>,
    /// The CWE identifier, e.g. CWE-119. May chain several with
    /// arrows, e.g. CWE-190->CWE-122.
    pub cwe: Option<String>,
    pub cvss: Option<Cvss>,
    pub cvss3: Option<Cvss3>,
    pub bugzilla: Option<Bugzilla>,
    pub acknowledgement: Option<OneOrMany<String>>,
    pub details: Option<OneOrMany<String>>,
    pub statement: Option<OneOrMany<String>>,
    pub affected_release: Option<OneOrMany<AffectedRelease>>,
    pub package_state: Option<OneOrMany<PackageState>>,
}
