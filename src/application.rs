//! This module contains the main structure and logic for the whole
//! application.

use std::process::exit;

use clap::{ArgGroup, CommandFactory, Parser};
use log::{debug, trace};
use serde_json::Value;
use simple_logger::SimpleLogger;

use crate::api::{SecDataApiClient, SecurityDataApi};
use crate::errors::Error;
use crate::models::fields::{FieldSelection, ALL_FIELDS, DEFAULT_FIELDS, MOST_FIELDS};
use crate::models::record::CveRecord;
use crate::query::{SearchFilters, Severity};
use crate::render::{pretty_json, CveRenderer};
use crate::text::{TextWrapper, WrapMode};
use crate::writers::pastebin::{PasteConfig, PastebinWriter};
use crate::writers::textstdout::TextStdoutWriter;
use crate::writers::ReportWriter;

/// Represents the application
pub struct Application {
    /// The arguments given on the command line.
    argv: Option<Args>,
}

impl Application {
    /// Creates a new application
    pub fn new() -> Self {
        trace!("Running Application::new()");
        Application { argv: None }
    }

    /// Read argv to get the arguments before running the application
    pub fn read_argv(&mut self) {
        let args = Args::parse();
        let log_level = if args.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        };
        SimpleLogger::new()
            .with_level(log_level)
            .env()
            .init()
            .expect("Unable to initialize the logger.");
        trace!("Running Application::read_argv()");

        // Nothing to search and nothing to look up, the user most
        // likely wants to know how to call the program
        if !args.search_filters().is_active() && args.cves.is_empty() {
            Args::command()
                .print_help()
                .expect("Unable to print the help.");
            exit(0);
        }
        self.argv = Some(args);
    }

    /// Runs the global application
    /// read_argv() MUST have been called before
    pub fn run(&self) -> Result<(), Error> {
        trace!("Running Application::run()");
        let args = self
            .argv
            .as_ref()
            .expect("CLI arguments haven't been read.");

        // The field selection is checked before anything touches the
        // network, a typo shouldn't cost a round-trip
        let selection = FieldSelection::parse(args.fields_spec())?;
        let wrapper = TextWrapper::new(WrapMode::from_flag(args.wrap));
        let renderer = CveRenderer::new(selection, args.urls, wrapper);
        let api = SecDataApiClient::new();

        let mut writer: Box<dyn ReportWriter> = if args.pastebin {
            Box::new(PastebinWriter::new(PasteConfig::from_args(args)))
        } else {
            Box::new(TextStdoutWriter::new())
        };
        self.run_queries(args, &api, &renderer, writer.as_mut())
    }

    /// Runs the search query and the CVE lookups, handing every piece
    /// of report to the writer.
    fn run_queries(
        &self,
        args: &Args,
        api: &dyn SecurityDataApi,
        renderer: &CveRenderer,
        writer: &mut dyn ReportWriter,
    ) -> Result<(), Error> {
        trace!("Running Application::run_queries()");
        let mut cves: Vec<String> = args.cves.clone();

        let filters = args.search_filters();
        if filters.is_active() {
            let results = api.search_cve(&filters.to_query())?;
            eprintln!("Search query results found: {}", results.len());
            if !args.count {
                eprintln!();
            }
            if args.extract_search {
                debug!(
                    "Extracting the CVE identifiers out of {} search results",
                    results.len()
                );
                for (index, result) in results.iter().enumerate() {
                    let cve = result.get("CVE").and_then(|value| value.as_str()).ok_or_else(
                        || {
                            Error::MalformedSelection(format!(
                                "search result #{} carries no CVE key",
                                index + 1
                            ))
                        },
                    )?;
                    cves.push(cve.to_string());
                }
            } else if !args.count {
                writer.write(&pretty_json(&Value::Array(results)));
                writer.write("\n");
            }
        }

        if !cves.is_empty() {
            let mut batch = Batch::new(api, renderer, args.json, args.count);
            for cve in &cves {
                batch.process(cve, writer)?;
            }
            if args.count {
                batch.report_counts();
            }
        }

        writer.finish()
    }
}

/// Walks a list of CVE identifiers and writes one report block per
/// record.
struct Batch<'a> {
    api: &'a dyn SecurityDataApi,
    renderer: &'a CveRenderer,
    /// Print the raw JSON records instead of text blocks.
    raw_json: bool,
    /// Count the resolved records instead of printing them.
    only_count: bool,
    /// How many identifiers the API knew.
    found: usize,
    /// How many identifiers were queried.
    total: usize,
}

impl<'a> Batch<'a> {
    /// Creates a new batch
    fn new(
        api: &'a dyn SecurityDataApi,
        renderer: &'a CveRenderer,
        raw_json: bool,
        only_count: bool,
    ) -> Self {
        Batch {
            api,
            renderer,
            raw_json,
            only_count,
            found: 0,
            total: 0,
        }
    }

    /// Queries one identifier and writes its block.
    ///
    /// An identifier the API doesn't know is reported inline and the
    /// batch goes on. Anything else stops the batch.
    fn process(&mut self, cve: &str, writer: &mut dyn ReportWriter) -> Result<(), Error> {
        self.total += 1;
        let document = match self.api.get_cve(cve) {
            Ok(document) => document,
            Err(Error::NotFound(_)) => {
                if !self.only_count {
                    writer.write(&self.renderer.render_not_found(cve));
                }
                return Ok(());
            }
            Err(error) => return Err(error),
        };
        self.found += 1;
        if self.only_count {
            return Ok(());
        }
        if self.raw_json {
            writer.write(&pretty_json(&document));
            writer.write("\n");
            return Ok(());
        }
        let record: CveRecord = serde_json::from_value(document)
            .map_err(|e| Error::Transport(format!("{}: unexpected record shape: {}", cve, e)))?;
        writer.write(&self.renderer.render(cve, &record));
        Ok(())
    }

    /// Prints the counters of the batch on stderr.
    fn report_counts(&self) {
        eprintln!("Valid CVE results found: {} of {}", self.found, self.total);
        eprintln!(
            "Invalid CVE queries: {} of {}",
            self.total - self.found,
            self.total
        );
    }
}

/// Represents the CLI arguments accepted by rhsecq
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("display").args(["fields", "all", "most", "json"])))]
pub struct Args {
    /// Narrow the search down to before a certain date
    #[arg(long, value_name = "YEAR-MM-DD")]
    pub before: Option<String>,
    /// Narrow the search down to after a certain date
    #[arg(long, value_name = "YEAR-MM-DD")]
    pub after: Option<String>,
    /// Narrow the search down by Bugzilla number, e.g. '1326598'
    #[arg(long, value_name = "BZID")]
    pub bug: Option<String>,
    /// Narrow the search down by advisory, e.g. 'RHSA-2016:0614'
    #[arg(long, value_name = "RHSA")]
    pub advisory: Option<String>,
    /// Narrow the search down by severity rating
    #[arg(long, value_name = "IMPACT")]
    pub severity: Option<Severity>,
    /// Narrow the search down by package name, e.g. 'samba'
    #[arg(long, value_name = "PKG")]
    pub package: Option<String>,
    /// Narrow the search down by CWE identifier, e.g. '295,300'
    #[arg(long, value_name = "CWEID")]
    pub cwe: Option<String>,
    /// Narrow the search down by CVSSv2 base score, e.g. '8.0'
    #[arg(long, value_name = "SCORE")]
    pub cvss_score: Option<String>,
    /// Narrow the search down by CVSSv3 base score, e.g. '5.1'
    #[arg(long, value_name = "SCORE")]
    pub cvss3_score: Option<String>,
    /// Append a raw query fragment, e.g. 'per_page=500' or 'a=b&x=y'
    #[arg(long, value_name = "RAWQUERY")]
    pub rawquery: Option<String>,

    /// A CVE or a space-separated list of CVEs, e.g. 'CVE-2016-5387'
    #[arg(value_name = "CVE")]
    pub cves: Vec<String>,
    /// Look up the CVEs extracted from the search results instead of
    /// printing the search results as JSON
    #[arg(short = 'x', long)]
    pub extract_search: bool,

    /// Comma-separated fields to be displayed for each CVE
    #[arg(long, value_name = "FIELDS", default_value = DEFAULT_FIELDS)]
    pub fields: String,
    /// Print all supported fields
    #[arg(short, long)]
    pub all: bool,
    /// Print all fields except the heavy-text ones (acknowledgement,
    /// details, statement)
    #[arg(short, long)]
    pub most: bool,
    /// Print the full raw JSON of each record
    #[arg(short, long)]
    pub json: bool,
    /// Print the reference URLs of all relevant fields
    #[arg(short, long)]
    pub urls: bool,

    /// Wrap the long fields at WIDTH columns instead of the terminal
    /// width; 0 disables wrapping, a bare -w wraps at 70
    #[arg(
        short,
        long,
        value_name = "WIDTH",
        num_args = 0..=1,
        default_missing_value = "70"
    )]
    pub wrap: Option<usize>,
    /// Print a count of the records found instead of the records
    #[arg(short, long)]
    pub count: bool,
    /// Print the queried API URLs to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Send the report to the Fedora Project pastebin and print only
    /// the paste URL
    #[arg(short, long)]
    pub pastebin: bool,
    /// The language used by the pastebin for syntax highlighting
    #[arg(long, value_name = "LANG", default_value = "text")]
    pub paste_lang: String,
    /// The paste author
    #[arg(long, value_name = "NAME", default_value = "rhsecq")]
    pub paste_user: String,
    /// Protect the paste with a password
    #[arg(long, value_name = "PASSWD")]
    pub paste_password: Option<String>,
    /// Make the paste publicly discoverable
    #[arg(long)]
    pub paste_public: bool,
    /// Delete the paste after SECS seconds, 0 to keep it forever
    #[arg(long, value_name = "SECS", default_value_t = 2419200)]
    pub paste_expire: u64,
    /// File the paste under a project
    #[arg(long, value_name = "PROJECT")]
    pub paste_project: Option<String>,
}

impl Args {
    /// Returns the field specification selected by the display
    /// options.
    fn fields_spec(&self) -> &str {
        if self.all {
            ALL_FIELDS
        } else if self.most {
            MOST_FIELDS
        } else {
            &self.fields
        }
    }

    /// Collects the search filters given on the command line.
    fn search_filters(&self) -> SearchFilters {
        SearchFilters {
            after: self.after.clone(),
            before: self.before.clone(),
            bug: self.bug.clone(),
            advisory: self.advisory.clone(),
            severity: self.severity,
            package: self.package.clone(),
            cwe: self.cwe.clone(),
            cvss_score: self.cvss_score.clone(),
            cvss3_score: self.cvss3_score.clone(),
            raw_query: self.rawquery.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DataType;
    use std::collections::HashMap;

    /// An API stub serving canned answers.
    struct StubApi {
        records: HashMap<String, Value>,
        search_results: Vec<Value>,
    }

    impl StubApi {
        fn new() -> Self {
            let mut records = HashMap::new();
            records.insert(
                "CVE-2016-5387".to_string(),
                serde_json::json!({
                    "name": "CVE-2016-5387",
                    "threat_severity": "Important",
                    "bugzilla": {
                        "id": "1353755",
                        "url": "https://bugzilla.redhat.com/show_bug.cgi?id=1353755"
                    }
                }),
            );
            StubApi {
                records,
                search_results: Vec::new(),
            }
        }
    }

    impl SecurityDataApi for StubApi {
        fn search(&self, _data_type: DataType, _params: &str) -> Result<Vec<Value>, Error> {
            Ok(self.search_results.clone())
        }

        fn retrieve(&self, _data_type: DataType, query: &str) -> Result<Value, Error> {
            self.records
                .get(query)
                .cloned()
                .ok_or_else(|| Error::NotFound(query.to_string()))
        }
    }

    /// An API stub where nothing ever answers.
    struct BrokenApi;

    impl SecurityDataApi for BrokenApi {
        fn search(&self, _data_type: DataType, _params: &str) -> Result<Vec<Value>, Error> {
            Err(Error::Transport("connection reset".to_string()))
        }

        fn retrieve(&self, _data_type: DataType, _query: &str) -> Result<Value, Error> {
            Err(Error::Transport("connection reset".to_string()))
        }
    }

    /// A writer keeping the report in memory.
    struct MemoryWriter {
        output: String,
        finished: bool,
    }

    impl MemoryWriter {
        fn new() -> Self {
            MemoryWriter {
                output: String::new(),
                finished: false,
            }
        }
    }

    impl ReportWriter for MemoryWriter {
        fn write(&mut self, text: &str) {
            self.output.push_str(text);
        }

        fn finish(&mut self) -> Result<(), Error> {
            self.finished = true;
            Ok(())
        }
    }

    fn renderer_for(args: &Args) -> CveRenderer {
        CveRenderer::new(
            FieldSelection::parse(args.fields_spec()).unwrap(),
            args.urls,
            TextWrapper::new(WrapMode::Disabled),
        )
    }

    #[test]
    fn test_a_batch_recovers_from_an_unknown_identifier() {
        let args = Args::parse_from(["rhsecq", "CVE-2016-5387", "CVE-2016-9999"]);
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        Application::new()
            .run_queries(&args, &StubApi::new(), &renderer, &mut writer)
            .unwrap();
        let expected = concat!(
            "CVE-2016-5387\n",
            "  IMPACT:  Important\n",
            "  BUGZILLA:  1353755\n",
            "\n",
            "CVE-2016-9999\n",
            " Not present in Red Hat CVE database\n",
            " Try https://cve.mitre.org/cgi-bin/cvename.cgi?name=CVE-2016-9999\n",
            "\n",
        );
        assert_eq!(writer.output, expected);
        assert!(writer.finished);
    }

    #[test]
    fn test_count_mode_writes_no_report() {
        let args = Args::parse_from(["rhsecq", "-c", "CVE-2016-5387", "CVE-2016-9999"]);
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        Application::new()
            .run_queries(&args, &StubApi::new(), &renderer, &mut writer)
            .unwrap();
        assert_eq!(writer.output, "");
        assert!(writer.finished);
    }

    #[test]
    fn test_a_count_batch_tallies_the_misses() {
        let args = Args::parse_from(["rhsecq", "-c", "CVE-2016-5387"]);
        let mut api = StubApi::new();
        api.records.insert(
            "CVE-2016-0001".to_string(),
            serde_json::json!({"name": "CVE-2016-0001"}),
        );
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        let mut batch = Batch::new(&api, &renderer, false, true);
        for cve in ["CVE-2016-5387", "CVE-2016-0001", "CVE-2016-9999"] {
            batch.process(cve, &mut writer).unwrap();
        }
        assert_eq!(batch.found, 2);
        assert_eq!(batch.total, 3);
        assert_eq!(writer.output, "");
        batch.report_counts();
    }

    #[test]
    fn test_json_mode_prints_the_raw_record() {
        let args = Args::parse_from(["rhsecq", "-j", "CVE-2016-0001"]);
        let mut api = StubApi::new();
        api.records.insert(
            "CVE-2016-0001".to_string(),
            serde_json::json!({
                "name": "CVE-2016-0001",
                "public_date": "2016-01-01T00:00:00"
            }),
        );
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        Application::new()
            .run_queries(&args, &api, &renderer, &mut writer)
            .unwrap();
        assert_eq!(
            writer.output,
            "{\n  \"name\": \"CVE-2016-0001\",\n  \"public_date\": \"2016-01-01T00:00:00\"\n}\n"
        );
    }

    #[test]
    fn test_a_search_prints_its_results_as_json() {
        let args = Args::parse_from(["rhsecq", "--package", "httpd"]);
        let mut api = StubApi::new();
        api.search_results = vec![serde_json::json!({"CVE": "CVE-2016-5387"})];
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        Application::new()
            .run_queries(&args, &api, &renderer, &mut writer)
            .unwrap();
        assert_eq!(
            writer.output,
            "[\n  {\n    \"CVE\": \"CVE-2016-5387\"\n  }\n]\n"
        );
    }

    #[test]
    fn test_extracting_a_search_turns_results_into_lookups() {
        let args = Args::parse_from(["rhsecq", "-x", "--package", "httpd"]);
        let mut api = StubApi::new();
        api.search_results = vec![serde_json::json!({"CVE": "CVE-2016-5387"})];
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        Application::new()
            .run_queries(&args, &api, &renderer, &mut writer)
            .unwrap();
        assert_eq!(
            writer.output,
            "CVE-2016-5387\n  IMPACT:  Important\n  BUGZILLA:  1353755\n\n"
        );
    }

    #[test]
    fn test_a_search_result_without_a_cve_key_is_malformed() {
        let args = Args::parse_from(["rhsecq", "-x", "--package", "httpd"]);
        let mut api = StubApi::new();
        api.search_results = vec![serde_json::json!({"bug": "1353755"})];
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        let result = Application::new().run_queries(&args, &api, &renderer, &mut writer);
        assert!(matches!(result, Err(Error::MalformedSelection(_))));
        assert_eq!(writer.output, "");
    }

    #[test]
    fn test_a_transport_failure_stops_the_batch() {
        let args = Args::parse_from(["rhsecq", "CVE-2016-5387"]);
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        let result = Application::new().run_queries(&args, &BrokenApi, &renderer, &mut writer);
        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(!writer.finished);
    }

    #[test]
    fn test_a_malformed_record_is_a_transport_failure() {
        let args = Args::parse_from(["rhsecq", "CVE-2016-5387"]);
        let mut api = StubApi::new();
        api.records.insert(
            "CVE-2016-5387".to_string(),
            serde_json::json!({"name": "CVE-2016-5387", "affected_release": 7}),
        );
        let renderer = renderer_for(&args);
        let mut writer = MemoryWriter::new();
        let result = Application::new().run_queries(&args, &api, &renderer, &mut writer);
        match result {
            Err(Error::Transport(detail)) => {
                assert!(detail.contains("CVE-2016-5387"));
                assert!(detail.contains("unexpected record shape"));
            }
            other => panic!("expected a Transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_the_display_presets_pick_the_field_sets() {
        let args = Args::parse_from(["rhsecq", "-a", "CVE-2016-5387"]);
        assert_eq!(args.fields_spec(), ALL_FIELDS);
        let args = Args::parse_from(["rhsecq", "-m", "CVE-2016-5387"]);
        assert_eq!(args.fields_spec(), MOST_FIELDS);
        let args = Args::parse_from(["rhsecq", "CVE-2016-5387"]);
        assert_eq!(args.fields_spec(), DEFAULT_FIELDS);
    }

    #[test]
    fn test_the_wrap_option_has_three_shapes() {
        let args = Args::parse_from(["rhsecq", "CVE-2016-5387"]);
        assert_eq!(args.wrap, None);
        let args = Args::parse_from(["rhsecq", "-w", "--", "CVE-2016-5387"]);
        assert_eq!(args.wrap, Some(70));
        let args = Args::parse_from(["rhsecq", "-w", "50", "CVE-2016-5387"]);
        assert_eq!(args.wrap, Some(50));
        let args = Args::parse_from(["rhsecq", "-w", "0", "CVE-2016-5387"]);
        assert_eq!(args.wrap, Some(0));
    }

    #[test]
    fn test_the_search_filters_come_from_the_options() {
        let args = Args::parse_from([
            "rhsecq",
            "--package",
            "samba",
            "--severity",
            "critical",
            "--after",
            "2016-01-01",
        ]);
        assert_eq!(
            args.search_filters().to_query(),
            "&after=2016-01-01&severity=critical&package=samba"
        );
    }
}
