//! This module builds the query string for a search against the
//! security data API.

use clap::builder::PossibleValue;
use clap::ValueEnum;
use std::fmt;

/// Represents the severity ratings used by Red Hat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Severity {
    Low,
    Moderate,
    Important,
    Critical,
}

impl ValueEnum for Severity {
    /// Lists the variants available for clap
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Severity::Low,
            Severity::Moderate,
            Severity::Important,
            Severity::Critical,
        ]
    }

    /// Map each value to a possible value in clap
    fn to_possible_value(&self) -> Option<PossibleValue> {
        match &self {
            Severity::Low => Some(PossibleValue::new("low")),
            Severity::Moderate => Some(PossibleValue::new("moderate")),
            Severity::Important => Some(PossibleValue::new("important")),
            Severity::Critical => Some(PossibleValue::new("critical")),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::Important => "important",
            Severity::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// Represents the filters of a CVE search.
///
/// Every filter is optional. An empty set of filters means no search
/// was requested on the command line.
#[derive(Debug, Default)]
pub struct SearchFilters {
    /// Keep the CVEs with a public date more recent than this one.
    /// The API accepts dates like 2016-01-01.
    pub after: Option<String>,
    /// Keep the CVEs with a public date older than this one.
    pub before: Option<String>,
    /// Keep the CVEs attached to this Bugzilla number.
    pub bug: Option<String>,
    /// Keep the CVEs fixed by this advisory, e.g. RHSA-2016:0614.
    pub advisory: Option<String>,
    /// Keep the CVEs rated with this severity.
    pub severity: Option<Severity>,
    /// Keep the CVEs affecting this package, e.g. samba.
    pub package: Option<String>,
    /// Keep the CVEs classified under this CWE identifier.
    pub cwe: Option<String>,
    /// Keep the CVEs with this CVSSv2 base score.
    pub cvss_score: Option<String>,
    /// Keep the CVEs with this CVSSv3 base score.
    pub cvss3_score: Option<String>,
    /// A raw query fragment appended verbatim, e.g. per_page=500.
    pub raw_query: Option<String>,
}

impl SearchFilters {
    /// Assembles the query string understood by the CVE search
    /// endpoint. The filters are serialized in a fixed order, each
    /// one as an &name=value pair, so a given set of filters always
    /// produces the same URL.
    ///
    /// Returns an empty string when no filter is set.
    pub fn to_query(&self) -> String {
        let mut query = String::new();
        let mut push = |name: &str, value: &str| {
            if !value.is_empty() {
                query.push_str(&format!("&{}={}", name, value));
            }
        };
        if let Some(before) = &self.before {
            push("before", before);
        }
        if let Some(after) = &self.after {
            push("after", after);
        }
        if let Some(bug) = &self.bug {
            push("bug", bug);
        }
        if let Some(advisory) = &self.advisory {
            push("advisory", advisory);
        }
        if let Some(severity) = &self.severity {
            push("severity", &severity.to_string());
        }
        if let Some(package) = &self.package {
            push("package", package);
        }
        if let Some(cwe) = &self.cwe {
            push("cwe", cwe);
        }
        if let Some(score) = &self.cvss_score {
            push("cvss_score", score);
        }
        if let Some(score) = &self.cvss3_score {
            push("cvss3_score", score);
        }
        if let Some(fragment) = &self.raw_query {
            if !fragment.is_empty() {
                query.push_str(&format!("&{}", fragment));
            }
        }
        query
    }

    /// Reports whether at least one filter is set.
    pub fn is_active(&self) -> bool {
        !self.to_query().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_build_an_empty_query() {
        let filters = SearchFilters::default();
        assert_eq!(filters.to_query(), "");
        assert!(!filters.is_active());
    }

    #[test]
    fn test_filters_keep_a_fixed_order() {
        let filters = SearchFilters {
            after: Some("2016-01-01".to_string()),
            before: Some("2016-06-01".to_string()),
            severity: Some(Severity::Critical),
            package: Some("samba".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            "&before=2016-06-01&after=2016-01-01&severity=critical&package=samba"
        );
    }

    #[test]
    fn test_raw_fragment_is_appended_last() {
        let filters = SearchFilters {
            package: Some("rhev-hypervisor".to_string()),
            raw_query: Some("per_page=500&product=Supplementary".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            "&package=rhev-hypervisor&per_page=500&product=Supplementary"
        );
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let filters = SearchFilters {
            bug: Some(String::new()),
            advisory: Some("RHSA-2016:0614".to_string()),
            raw_query: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filters.to_query(), "&advisory=RHSA-2016:0614");
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Low.to_string(), "low");
        assert_eq!(Severity::Important.to_string(), "important");
    }
}
