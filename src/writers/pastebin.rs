//! Send the report to the Fedora Project pastebin
//! The whole report is buffered while the queries run and submitted
//! as a single paste at the end. Only the paste URL is printed on
//! STDOUT, which makes the output easy to hand over.

use std::time::Duration;

use log::{debug, trace};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use super::ReportWriter;
use crate::application::Args;
use crate::errors::Error;

/// The pastebin used by default.
pub const DEFAULT_PASTEBIN_URL: &str = "http://paste.fedoraproject.org";

/// How long to wait for the submission to be accepted.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Represents the submission settings of a paste.
#[derive(Clone, Debug)]
pub struct PasteConfig {
    /// The base URL of the pastebin.
    pub url: String,
    /// The language used for syntax highlighting.
    pub lang: String,
    /// The author shown next to the paste.
    pub user: String,
    /// An optional password protecting the paste.
    pub password: Option<String>,
    /// Whether the paste stays out of the public list.
    pub private: bool,
    /// The lifetime of the paste in seconds, 0 to keep it forever.
    pub expire: u64,
    /// An optional project the paste is filed under.
    pub project: Option<String>,
}

impl PasteConfig {
    /// Builds the settings from the command line arguments.
    pub fn from_args(argv: &Args) -> Self {
        PasteConfig {
            url: DEFAULT_PASTEBIN_URL.to_string(),
            lang: argv.paste_lang.clone(),
            user: argv.paste_user.clone(),
            password: argv.paste_password.clone(),
            private: !argv.paste_public,
            expire: argv.paste_expire,
            project: argv.paste_project.clone(),
        }
    }
}

/// The envelope sent back by the pastebin API.
#[derive(Debug, Deserialize)]
struct PasteResponse {
    error: Option<Value>,
    result: Option<PasteResult>,
}

/// The description of a freshly created paste.
#[derive(Debug, Deserialize)]
struct PasteResult {
    id: String,
    /// Sent for private pastes, where it is part of the URL.
    hash: Option<String>,
}

/// A writer to send the report to a pastebin.
pub struct PastebinWriter {
    config: PasteConfig,
    client: Client,
    /// The report accumulated so far.
    output: String,
}

impl PastebinWriter {
    /// Creates a new PastebinWriter
    pub fn new(config: PasteConfig) -> Self {
        trace!("Running PastebinWriter::new()");
        let client = Client::builder()
            .user_agent(concat!("rhsecq/", env!("CARGO_PKG_VERSION")))
            .timeout(SUBMIT_TIMEOUT)
            .build()
            .expect("Unable to create a HTTP client.");
        PastebinWriter {
            config,
            client,
            output: String::new(),
        }
    }

    /// Submits the buffered report and returns the URL of the paste.
    fn submit(&self) -> Result<String, Error> {
        trace!("Running PastebinWriter::submit()");
        let private = if self.config.private { "yes" } else { "no" };
        let mut form: Vec<(&str, String)> = vec![
            ("paste_data", self.output.clone()),
            ("paste_lang", self.config.lang.clone()),
            ("api_submit", "true".to_string()),
            ("mode", "json".to_string()),
            ("paste_private", private.to_string()),
            ("paste_expire", self.config.expire.to_string()),
        ];
        if !self.config.user.is_empty() {
            form.push(("paste_user", self.config.user.clone()));
        }
        if let Some(password) = &self.config.password {
            form.push(("paste_password", password.clone()));
        }
        if let Some(project) = &self.config.project {
            form.push(("paste_project", project.clone()));
        }

        debug!(
            "Submitting {} bytes to {}",
            self.output.len(),
            self.config.url
        );
        let response = self
            .client
            .post(&self.config.url)
            .form(&form)
            .send()
            .map_err(|e| Error::SinkRejected(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::SinkRejected(format!(
                "{} for '{}'",
                status, self.config.url
            )));
        }
        let answer: PasteResponse = response
            .json()
            .map_err(|e| Error::SinkRejected(format!("invalid JSON answer: {}", e)))?;
        if let Some(error) = answer.error {
            let detail = match &error {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            return Err(Error::SinkRejected(detail));
        }
        let result = answer
            .result
            .ok_or_else(|| Error::SinkRejected("no paste in the answer".to_string()))?;

        let mut paste_url = format!("{}/{}", self.config.url, result.id);
        if self.config.private {
            if let Some(hash) = &result.hash {
                paste_url.push_str(&format!("/{}", hash));
            }
        }
        Ok(paste_url)
    }
}

impl ReportWriter for PastebinWriter {
    /// Buffers a piece of the report.
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Submits the paste and prints its URL.
    fn finish(&mut self) -> Result<(), Error> {
        let paste_url = self.submit()?;
        println!("{}", paste_url);
        Ok(())
    }
}
