//! HTTP client for the news search API.
//!
//! Wraps `reqwest` with typed error handling and the fixed query shape the
//! pulse job uses: a one-day lookback window, English-language results sorted
//! by relevancy, and a server-side restriction to an allow-list of reputable
//! news domains. The `totalResults` field of the response — not the page
//! length — is what the pipeline aggregates, so the small fixed page size
//! bounds cost without losing the volume signal.

pub mod client;
pub mod error;
pub mod types;

pub use client::{NewsClient, PAGE_SIZE, QUALITY_DOMAINS};
pub use error::NewsError;
pub use types::{ArticleSource, NewsResponse, RawArticle};
