//! HTTP client for fetching Scholar result pages.
//!
//! Fetched pages become merge sources; the client records the metadata the
//! rest of the pipeline cares about (final URL, status, advertised charset,
//! content hash, fetch time).

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use scholarstack_shared::{FetchConfig, Result, ScholarStackError, content_hash};

use crate::policy::{Navigation, classify_against};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("ScholarStack/", env!("CARGO_PKG_VERSION"));

/// Matches the charset field of a Content-Type header value.
static CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)charset=([^;\s]+)").expect("charset regex"));

// ---------------------------------------------------------------------------
// ResultsPage
// ---------------------------------------------------------------------------

/// A fetched Scholar results page.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsPage {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Charset advertised in Content-Type, if any.
    pub charset: Option<String>,
    /// Decoded page text.
    pub html: String,
    /// SHA-256 hash of the page text.
    pub content_hash: String,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ScholarClient
// ---------------------------------------------------------------------------

/// Client for Scholar result pages.
pub struct ScholarClient {
    client: Client,
    base: Url,
    language: String,
    /// Allow non-Scholar hosts (for integration tests with mock servers).
    allow_any_host: bool,
}

impl ScholarClient {
    /// Create a client from fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ScholarStackError::config(format!("scholar base_url: {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScholarStackError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            language: config.language.clone(),
            allow_any_host: false,
        })
    }

    /// Allow fetching from non-Scholar hosts (for integration tests).
    #[cfg(test)]
    pub fn allow_any_host(mut self) -> Self {
        self.allow_any_host = true;
        self
    }

    /// Build the results URL for a query.
    pub fn results_url(&self, query: &str) -> Result<Url> {
        let endpoint = self
            .base
            .join("scholar")
            .map_err(|e| ScholarStackError::config(format!("results url: {e}")))?;

        Url::parse_with_params(
            endpoint.as_str(),
            &[
                ("hl", self.language.as_str()),
                ("as_sdt", "0,5"),
                ("q", query),
                ("btnG", ""),
            ],
        )
        .map_err(|e| ScholarStackError::config(format!("results url: {e}")))
    }

    /// Fetch the results page for a query.
    pub async fn fetch_results(&self, query: &str) -> Result<ResultsPage> {
        let url = self.results_url(query)?;
        self.fetch(url).await
    }

    /// Fetch a Scholar URL.
    ///
    /// URLs outside the configured Scholar host are refused; they belong to
    /// an external browser, not to the result pane.
    pub async fn fetch(&self, url: Url) -> Result<ResultsPage> {
        let base_host = self.base.host_str().unwrap_or_default();
        if !self.allow_any_host && classify_against(&url, base_host) == Navigation::External {
            return Err(ScholarStackError::Network(format!(
                "refusing non-Scholar host: {url}"
            )));
        }

        debug!(%url, "fetching results page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ScholarStackError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScholarStackError::Network(format!("{url}: HTTP {status}")));
        }

        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| ScholarStackError::Network(format!("{url}: body read failed: {e}")))?;

        let page = ResultsPage {
            url: final_url,
            status: status.as_u16(),
            charset,
            content_hash: content_hash(&html),
            fetched_at: Utc::now(),
            html,
        };

        info!(
            url = %page.url,
            status = page.status,
            bytes = page.html.len(),
            "fetched results page"
        );
        Ok(page)
    }
}

/// Extract the charset field from a Content-Type header value.
fn charset_from_content_type(value: &str) -> Option<String> {
    CHARSET_RE
        .captures(value)
        .map(|caps| caps[1].trim_matches('"').to_string())
}
