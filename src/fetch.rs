use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

/// Browser-like agent; the default client string gets blocked.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Source of parsed pages. Errors propagate; callers decide whether a failure
/// is fatal.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Html>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Html> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch: {}", url))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("Failed to read response: {}", url))?;
        Ok(into_document(status, url, &body))
    }
}

/// Error pages are parsed like any other; the lookups on them come back empty.
fn into_document(status: StatusCode, url: &str, body: &str) -> Html {
    if !status.is_success() {
        warn!("{} returned {}", url, status);
    }
    Html::parse_document(body)
}

/// Resolve a (usually site-relative) link against the page it appeared on.
pub fn resolve(base: &str, link: &str) -> Result<String> {
    let base = Url::parse(base).with_context(|| format!("Invalid base URL: {}", base))?;
    let joined = base
        .join(link)
        .with_context(|| format!("Invalid link: {}", link))?;
    Ok(joined.into())
}
