//! Fetch security data over HTTPS.
//!
//! The [`SecDataApiClient`] is there to query the Red Hat Security
//! Data API, which serves CVE records, CVRF advisories and OVAL
//! definitions as JSON.
//!
//! https://access.redhat.com/documentation/en/red-hat-security-data-api/

use std::time::Duration;

use log::{info, trace, warn};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::errors::Error;

/// The production endpoint of the security data API.
pub const DEFAULT_API_URL: &str = "https://access.redhat.com/labs/securitydataapi";

/// The User-Agent header sent with every request.
const USER_AGENT: &str = concat!("rhsecq/", env!("CARGO_PKG_VERSION"));

/// How long to wait for an answer before giving up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Represents the kinds of documents served by the API.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DataType {
    /// CVRF advisory documents.
    Cvrf,
    /// CVE records.
    Cve,
    /// OVAL definitions.
    Oval,
}

impl DataType {
    /// Returns the URL path segment of the data type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Cvrf => "cvrf",
            DataType::Cve => "cve",
            DataType::Oval => "oval",
        }
    }
}

/// The operations the rest of the program needs from the security
/// data API. The two low-level operations mirror the two URL families
/// of the API, the convenience methods cover the documented endpoints.
pub trait SecurityDataApi {
    /// Runs a search, i.e. GET /{type}.json?{params}.
    ///
    /// `params` is a pre-assembled string of &name=value pairs. An
    /// empty string searches without any filter.
    fn search(&self, data_type: DataType, params: &str) -> Result<Vec<Value>, Error>;

    /// Retrieves a single document, i.e. GET /{type}/{query}.json.
    fn retrieve(&self, data_type: DataType, query: &str) -> Result<Value, Error>;

    /// Searches CVE records.
    fn search_cve(&self, params: &str) -> Result<Vec<Value>, Error> {
        self.search(DataType::Cve, params)
    }

    /// Searches CVRF advisories.
    fn search_cvrf(&self, params: &str) -> Result<Vec<Value>, Error> {
        self.search(DataType::Cvrf, params)
    }

    /// Searches OVAL definitions.
    fn search_oval(&self, params: &str) -> Result<Vec<Value>, Error> {
        self.search(DataType::Oval, params)
    }

    /// Retrieves a CVE record, e.g. CVE-2016-5387.
    fn get_cve(&self, cve: &str) -> Result<Value, Error> {
        self.retrieve(DataType::Cve, cve)
    }

    /// Retrieves a CVRF advisory, e.g. RHSA-2016:0614.
    fn get_cvrf(&self, rhsa: &str) -> Result<Value, Error> {
        self.retrieve(DataType::Cvrf, rhsa)
    }

    /// Retrieves the OVAL definitions attached to an advisory.
    fn get_oval(&self, rhsa: &str) -> Result<Value, Error> {
        self.retrieve(DataType::Oval, rhsa)
    }

    /// Retrieves the OVAL documents listed by a CVRF advisory.
    fn get_cvrf_oval(&self, rhsa: &str) -> Result<Value, Error> {
        self.retrieve(DataType::Cvrf, &format!("{}/oval", rhsa))
    }
}

/// A client for the Red Hat Security Data API.
pub struct SecDataApiClient {
    /// The base URL of the API, without a trailing slash.
    api_url: String,
    client: Client,
}

impl SecDataApiClient {
    /// Creates a new client against the production endpoint.
    pub fn new() -> Self {
        Self::with_api_url(DEFAULT_API_URL)
    }

    /// Creates a new client against the given endpoint.
    pub fn with_api_url(api_url: &str) -> Self {
        trace!("Running SecDataApiClient::with_api_url()");
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Unable to create a HTTP client.");
        SecDataApiClient {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Sends one GET request and decodes the JSON answer.
    ///
    /// A 4xx answer means the API doesn't know the resource and maps
    /// to [`Error::NotFound`] carrying `subject`. Any other failure,
    /// including an answer that isn't JSON, is a transport error.
    fn get_json(&self, path: &str, subject: &str) -> Result<Value, Error> {
        let url = format!("{}{}", self.api_url, path);
        info!("Getting '{}' ...", url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_client_error() {
            warn!("{} for '{}'", status, url);
            return Err(Error::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Transport(format!("{} for '{}'", status, url)));
        }
        response
            .json::<Value>()
            .map_err(|e| Error::Transport(format!("invalid JSON from '{}': {}", url, e)))
    }
}

impl SecurityDataApi for SecDataApiClient {
    fn search(&self, data_type: DataType, params: &str) -> Result<Vec<Value>, Error> {
        trace!("Running SecDataApiClient::search()");
        let mut path = format!("/{}.json", data_type.as_str());
        if !params.is_empty() {
            path.push_str(&format!("?{}", params));
        }
        let subject = format!("{} search", data_type.as_str());
        match self.get_json(&path, &subject)? {
            Value::Array(entries) => Ok(entries),
            other => Err(Error::Transport(format!(
                "expected a list of search results, got: {}",
                other
            ))),
        }
    }

    fn retrieve(&self, data_type: DataType, query: &str) -> Result<Value, Error> {
        trace!("Running SecDataApiClient::retrieve()");
        self.get_json(&format!("/{}/{}.json", data_type.as_str(), query), query)
    }
}
