//! This module turns CVE records into the text blocks of a report.
//!
//! The layout is plain text: a header line with the identifier, then
//! one two-space indented line (or sub-block) per selected field, in
//! a fixed order, then a blank line closing the record.

use serde_json::Value;

use crate::models::fields::{Field, FieldSelection, RENDER_ORDER};
use crate::models::record::CveRecord;
use crate::text::TextWrapper;

/// Builds the printable blocks of a report.
pub struct CveRenderer {
    /// The fields to show.
    fields: FieldSelection,
    /// Whether to decorate the fields with their reference URLs.
    print_urls: bool,
    /// The processor applied to the long text fields.
    wrapper: TextWrapper,
}

impl CveRenderer {
    /// Creates a new renderer.
    pub fn new(fields: FieldSelection, print_urls: bool, wrapper: TextWrapper) -> Self {
        CveRenderer {
            fields,
            print_urls,
            wrapper,
        }
    }

    /// Renders the block of one record.
    ///
    /// `queried` is the identifier given on the command line. It is
    /// kept as the block header even when its case differs from the
    /// canonical name, which is then shown next to it.
    pub fn render(&self, queried: &str, record: &CveRecord) -> String {
        let mut out = String::new();

        let mut name = String::new();
        if let Some(canonical) = &record.name {
            if queried != canonical.as_str() {
                name = format!(" [{}]", canonical);
            }
        }
        let mut url = String::new();
        if self.print_urls {
            url = format!(" (https://access.redhat.com/security/cve/{})", queried);
        }
        out.push_str(&format!("{}{}{}\n", queried, name, url));

        // --fields='' means the headers alone make the report
        if self.fields.is_empty() {
            return out;
        }

        for field in RENDER_ORDER {
            if !self.fields.contains(field) {
                continue;
            }
            match field {
                Field::ThreatSeverity => {
                    if let Some(severity) = &record.threat_severity {
                        let url = if self.print_urls {
                            " (https://access.redhat.com/security/updates/classification)"
                        } else {
                            ""
                        };
                        out.push_str(&format!("  IMPACT:  {}{}\n", severity, url));
                    }
                }
                Field::PublicDate => {
                    if let Some(date) = &record.public_date {
                        out.push_str(&format!("  PUBLIC_DATE:  {}\n", date));
                    }
                }
                Field::Cwe => {
                    if let Some(cwe) = &record.cwe {
                        let mut url = String::new();
                        if self.print_urls {
                            let id = cwe.strip_prefix("CWE-").unwrap_or(cwe);
                            url =
                                format!(" (http://cwe.mitre.org/data/definitions/{}.html)", id);
                        }
                        out.push_str(&format!("  CWE:  {}{}\n", cwe, url));
                    }
                }
                Field::Cvss => {
                    if let Some(cvss) = &record.cvss {
                        let vector = if self.print_urls {
                            format!(
                                "http://nvd.nist.gov/cvss.cfm?version=2&vector=({})",
                                cvss.cvss_scoring_vector
                            )
                        } else {
                            cvss.cvss_scoring_vector.clone()
                        };
                        out.push_str(&format!(
                            "  CVSS:  {} [{}]\n",
                            cvss.cvss_base_score, vector
                        ));
                    }
                }
                Field::Cvss3 => {
                    if let Some(cvss3) = &record.cvss3 {
                        let vector = if self.print_urls {
                            format!(
                                "https://www.first.org/cvss/calculator/3.0#{}",
                                cvss3.cvss3_scoring_vector
                            )
                        } else {
                            cvss3.cvss3_scoring_vector.clone()
                        };
                        out.push_str(&format!(
                            "  CVSS3:  {} [{}]\n",
                            cvss3.cvss3_base_score, vector
                        ));
                    }
                }
                Field::Bugzilla => match &record.bugzilla {
                    Some(bugzilla) => {
                        let bug = if self.print_urls {
                            &bugzilla.url
                        } else {
                            &bugzilla.id
                        };
                        out.push_str(&format!("  BUGZILLA:  {}\n", bug));
                    }
                    // Very old and very new CVEs have no bug attached
                    None => {
                        out.push_str("  BUGZILLA:  No Bugzilla data\n");
                        out.push_str("   Too new or too old? See: https://bugzilla.redhat.com/show_bug.cgi?id=CVE_legacy\n");
                    }
                },
                Field::Acknowledgement => {
                    if let Some(acknowledgement) = &record.acknowledgement {
                        out.push_str(&format!(
                            "  ACKNOWLEDGEMENT:  {}\n",
                            self.wrapper.stripjoin(acknowledgement)
                        ));
                    }
                }
                Field::Details => {
                    if let Some(details) = &record.details {
                        out.push_str(&format!(
                            "  DETAILS:  {}\n",
                            self.wrapper.stripjoin(details)
                        ));
                    }
                }
                Field::Statement => {
                    if let Some(statement) = &record.statement {
                        out.push_str(&format!(
                            "  STATEMENT:  {}\n",
                            self.wrapper.stripjoin(statement)
                        ));
                    }
                }
                Field::AffectedRelease => {
                    if let Some(affected_release) = &record.affected_release {
                        out.push_str("  AFFECTED_RELEASE (ERRATA)\n");
                        for release in affected_release.as_slice() {
                            let mut package = String::new();
                            if let Some(nvr) = &release.package {
                                package = format!(" [{}]", nvr);
                            }
                            let advisory = if self.print_urls {
                                format!(
                                    "https://access.redhat.com/errata/{}",
                                    release.advisory
                                )
                            } else {
                                release.advisory.clone()
                            };
                            out.push_str(&format!(
                                "   {}{}: {}\n",
                                release.product_name, package, advisory
                            ));
                        }
                    }
                }
                Field::PackageState => {
                    if let Some(package_state) = &record.package_state {
                        out.push_str("  PACKAGE_STATE\n");
                        for state in package_state.as_slice() {
                            let mut package_name = String::new();
                            if let Some(name) = &state.package_name {
                                package_name = format!(" [{}]", name);
                            }
                            out.push_str(&format!(
                                "   {}: {}{}\n",
                                state.fix_state, state.product_name, package_name
                            ));
                        }
                    }
                }
            }
        }

        // A blank line closes the record
        out.push('\n');
        out
    }

    /// Renders the fallback block of an identifier the API doesn't
    /// know. Identifiers that at least look like CVEs get a pointer
    /// to the MITRE database.
    pub fn render_not_found(&self, queried: &str) -> String {
        let mut out = format!("{}\n Not present in Red Hat CVE database\n", queried);
        if queried.starts_with("CVE-") {
            out.push_str(&format!(
                " Try https://cve.mitre.org/cgi-bin/cvename.cgi?name={}\n\n",
                queried
            ));
        }
        out
    }
}

/// Pretty-prints a JSON document the way the raw reports show it,
/// with sorted keys and a two-space indent.
pub fn pretty_json(document: &Value) -> String {
    serde_json::to_string_pretty(document).expect("Unable to serialize a JSON document.")
}
