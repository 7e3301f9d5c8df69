//! HTTP client for the news search API.

use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use reqwest::{Client, Url};

use crate::error::NewsError;
use crate::types::NewsResponse;

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Fixed page size per query. The job only keeps a handful of headlines, so
/// a small page is enough; volume comes from `totalResults`.
pub const PAGE_SIZE: u32 = 15;

/// Curated allow-list of reputable tech/business news domains. Passed as the
/// `domains` parameter so the quality filter happens server-side in the
/// query, not just client-side after the fact.
pub const QUALITY_DOMAINS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bloomberg.com",
    "cnbc.com",
    "wsj.com",
    "nytimes.com",
    "washingtonpost.com",
    "theguardian.com",
    "bbc.com",
    "bbc.co.uk",
    "techcrunch.com",
    "theverge.com",
    "arstechnica.com",
    "wired.com",
    "engadget.com",
    "zdnet.com",
    "cnet.com",
    "thedailybeast.com",
    "businessinsider.com",
    "forbes.com",
    "ft.com",
    "theatlantic.com",
    "axios.com",
    "semafor.com",
    "theinformation.com",
    "protocol.com",
    "venturebeat.com",
    "fortune.com",
    "marketwatch.com",
    "politico.com",
];

/// Client for the news search API.
///
/// Manages the HTTP client, API key, and base URL. Use [`NewsClient::new`]
/// for production or [`NewsClient::with_base_url`] to point at a mock server
/// in tests.
pub struct NewsClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl NewsClient {
    /// Creates a new client pointed at the production news API.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, NewsError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NewsError::SourceUnavailable`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("overpulse/0.1 (news-pulse-tracking)")
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| NewsError::SourceUnavailable {
            status: 0,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Fetches articles matching `query` published yesterday through today
    /// (UTC calendar dates, inclusive).
    ///
    /// # Errors
    ///
    /// See [`NewsClient::fetch_window`].
    pub async fn fetch_recent(&self, query: &str) -> Result<NewsResponse, NewsError> {
        let today = Utc::now().date_naive();
        let yesterday = today - Days::new(1);
        self.fetch_window(query, yesterday, today).await
    }

    /// Fetches one page of articles matching `query` within a date window.
    ///
    /// The query restricts results to [`QUALITY_DOMAINS`], English language,
    /// sorted by relevancy, with a page size of [`PAGE_SIZE`]. Pure query —
    /// no side effects on the source.
    ///
    /// # Errors
    ///
    /// - [`NewsError::SourceUnavailable`] on a non-2xx response, carrying
    ///   the HTTP status and body.
    /// - [`NewsError::Http`] on network failure.
    /// - [`NewsError::Deserialize`] if the response body is not the expected
    ///   JSON shape.
    pub async fn fetch_window(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<NewsResponse, NewsError> {
        let url = self.build_url(query, from, to);
        tracing::debug!(%from, %to, "news: fetching window");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(NewsError::SourceUnavailable {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| NewsError::Deserialize {
            context: format!("query={query}"),
            source: e,
        })
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters via [`Url::query_pairs_mut`].
    fn build_url(&self, query: &str, from: NaiveDate, to: NaiveDate) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("from", &from.format("%Y-%m-%d").to_string());
            pairs.append_pair("to", &to.format("%Y-%m-%d").to_string());
            pairs.append_pair("language", "en");
            pairs.append_pair("sortBy", "relevancy");
            pairs.append_pair("pageSize", &PAGE_SIZE.to_string());
            pairs.append_pair("domains", &QUALITY_DOMAINS.join(","));
            pairs.append_pair("apiKey", &self.api_key);
        }
        url
    }
}
