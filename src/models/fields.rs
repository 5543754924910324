//! This module declares the printable fields of a CVE report and the
//! selection built from the --fields option.

use std::str::FromStr;

use crate::errors::Error;

/// The fields shown when no display option is given.
pub const DEFAULT_FIELDS: &str = "threat_severity,bugzilla,affected_release,package_state";

/// The fields shown by --all.
pub const ALL_FIELDS: &str = "threat_severity,public_date,cwe,cvss,cvss3,bugzilla,acknowledgement,details,statement,affected_release,package_state";

/// The fields shown by --most, i.e. everything except the heavy text
/// blocks (acknowledgement, details, statement).
pub const MOST_FIELDS: &str =
    "threat_severity,public_date,cwe,cvss,cvss3,bugzilla,affected_release,package_state";

/// Represents a printable field of a CVE record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    ThreatSeverity,
    PublicDate,
    Cwe,
    Cvss,
    Cvss3,
    Bugzilla,
    Acknowledgement,
    Details,
    Statement,
    AffectedRelease,
    PackageState,
}

/// The order in which selected fields appear in a report. The order
/// of the names given to --fields doesn't matter.
pub const RENDER_ORDER: [Field; 11] = [
    Field::ThreatSeverity,
    Field::PublicDate,
    Field::Cwe,
    Field::Cvss,
    Field::Cvss3,
    Field::Bugzilla,
    Field::Acknowledgement,
    Field::Details,
    Field::Statement,
    Field::AffectedRelease,
    Field::PackageState,
];

impl Field {
    /// Returns the name of the field, as found in the API answers and
    /// in the --fields option.
    pub fn name(&self) -> &'static str {
        match self {
            Field::ThreatSeverity => "threat_severity",
            Field::PublicDate => "public_date",
            Field::Cwe => "cwe",
            Field::Cvss => "cvss",
            Field::Cvss3 => "cvss3",
            Field::Bugzilla => "bugzilla",
            Field::Acknowledgement => "acknowledgement",
            Field::Details => "details",
            Field::Statement => "statement",
            Field::AffectedRelease => "affected_release",
            Field::PackageState => "package_state",
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "threat_severity" => Ok(Field::ThreatSeverity),
            "public_date" => Ok(Field::PublicDate),
            "cwe" => Ok(Field::Cwe),
            "cvss" => Ok(Field::Cvss),
            "cvss3" => Ok(Field::Cvss3),
            "bugzilla" => Ok(Field::Bugzilla),
            "acknowledgement" => Ok(Field::Acknowledgement),
            "details" => Ok(Field::Details),
            "statement" => Ok(Field::Statement),
            "affected_release" => Ok(Field::AffectedRelease),
            "package_state" => Ok(Field::PackageState),
            _ => Err(Error::MalformedSelection(format!(
                "unknown field \"{}\"; supported fields are: {}",
                name, ALL_FIELDS
            ))),
        }
    }
}

/// Represents the set of fields a report should show.
#[derive(Clone, Debug)]
pub struct FieldSelection {
    fields: Vec<Field>,
}

impl FieldSelection {
    /// Parses a comma-separated list of field names.
    ///
    /// Empty pieces are skipped, so the empty string (or a string made
    /// only of commas) is a valid selection of nothing. A duplicated
    /// name is kept once. An unknown name is an error.
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let mut fields: Vec<Field> = Vec::new();
        for name in spec.split(',') {
            if name.is_empty() {
                continue;
            }
            let field = name.parse::<Field>()?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Ok(FieldSelection { fields })
    }

    /// Reports whether the given field has been selected.
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Reports whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
