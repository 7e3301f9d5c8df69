//! Junk-article filtering.
//!
//! The news source routinely returns tombstoned entries ("[Removed]"),
//! null fields, and syndicated clickbait from low-quality aggregators.
//! Everything here is a pure, order-preserving pass over one page of
//! results.

use pulse_newsapi::RawArticle;
use reqwest::Url;

/// Placeholder the source substitutes for withdrawn content.
const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Articles retained per overlord per day. The upstream page is sorted by
/// relevancy, so the first survivors are the best ones.
const MAX_ARTICLES: usize = 5;

/// Denylist of domains known for low-quality, clickbait, or scraped
/// content. A safety net behind the server-side allow-list — syndicated
/// copies still slip through the `domains` query parameter.
pub const BLOCKED_DOMAINS: &[&str] = &[
    "biztoc.com",
    "yahoo.com",
    "msn.com",
    "news.google.com",
    "ground.news",
    "smarteranalyst.com",
    "investorplace.com",
    "benzinga.com",
    "thestreet.com",
    "fool.com",
    "seekingalpha.com",
    "accesswire.com",
    "prnewswire.com",
    "globenewswire.com",
    "businesswire.com",
    "newsbreak.com",
    "newsbtc.com",
];

/// Drop junk articles and keep at most the first [`MAX_ARTICLES`] survivors.
///
/// An article is dropped when its title or description is missing, empty,
/// or the removed-content placeholder; when its URL is missing or empty; or
/// when its URL's host (with a leading `www.` stripped) matches or is a
/// subdomain of a denylisted domain.
#[must_use]
pub fn filter_articles(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    articles
        .into_iter()
        .filter(keep_article)
        .take(MAX_ARTICLES)
        .collect()
}

fn keep_article(article: &RawArticle) -> bool {
    if !present(article.title.as_deref()) {
        return false;
    }
    if !present(article.description.as_deref()) {
        return false;
    }
    let Some(url) = article.url.as_deref().filter(|u| !u.is_empty()) else {
        return false;
    };
    !is_blocked_domain(url)
}

fn present(field: Option<&str>) -> bool {
    matches!(field, Some(value) if !value.is_empty() && value != REMOVED_PLACEHOLDER)
}

/// Whether `url`'s registrable host falls under a denylisted domain.
///
/// Unparseable URLs are kept — the denylist only fires on a positive host
/// match, matching the upstream behavior.
fn is_blocked_domain(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);

    BLOCKED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}
