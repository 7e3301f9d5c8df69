use serde::Deserialize;

/// One page of search results plus the source's own total match count.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: i64,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// An article exactly as the source reports it. Every field is optional —
/// the upstream feed routinely ships nulls and "[Removed]" placeholders,
/// which the filter deals with downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Option<ArticleSource>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}
