//! Projection of raw articles into the persisted headline shape.

use pulse_db::Headline;
use pulse_newsapi::RawArticle;

/// Persisted descriptions are capped at this many characters.
const DESCRIPTION_MAX_CHARS: usize = 200;

/// Trim filtered articles down to the denormalized `Headline` records kept
/// inside a snapshot. Missing source names become `"Unknown"`; descriptions
/// are truncated to [`DESCRIPTION_MAX_CHARS`].
#[must_use]
pub fn project_headlines(articles: &[RawArticle]) -> Vec<Headline> {
    articles
        .iter()
        .map(|article| Headline {
            title: article.title.clone().unwrap_or_default(),
            source_name: article
                .source
                .as_ref()
                .and_then(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            url: article.url.clone().unwrap_or_default(),
            published_at: article.published_at.clone().unwrap_or_default(),
            description: truncate_chars(
                article.description.as_deref().unwrap_or(""),
                DESCRIPTION_MAX_CHARS,
            ),
        })
        .collect()
}

/// Truncate on a character boundary, not a byte offset — descriptions are
/// arbitrary UTF-8 from the wire.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
