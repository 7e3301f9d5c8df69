//! Keyword-frequency sentiment scoring.
//!
//! No NLP: the score is the hit ratio `(positive − negative) / (positive +
//! negative)` over fixed keyword lists, computed across all of a day's
//! surviving articles. Hits are case-insensitive substring matches against
//! each article's title + description, so "launches" also counts the
//! "launch" keyword — the lists below were tuned with that in mind.

use pulse_newsapi::RawArticle;

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "launches",
    "launch",
    "breakthrough",
    "record",
    "partnership",
    "innovation",
    "growth",
    "profit",
    "revenue",
    "deal",
    "expansion",
    "milestone",
    "success",
    "surges",
    "gains",
    "unveils",
    "announces",
    "wins",
    "approval",
    "bullish",
    "upgrade",
    "boost",
    "soars",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "lawsuit",
    "controversy",
    "investigation",
    "layoffs",
    "scandal",
    "crash",
    "sued",
    "fine",
    "fined",
    "penalty",
    "probe",
    "antitrust",
    "fraud",
    "violation",
    "hack",
    "breach",
    "loses",
    "decline",
    "downturn",
    "failure",
    "fired",
    "resign",
    "subpoena",
    "bearish",
];

/// Score a set of articles into `[-1.0, 1.0]`.
///
/// Counts keyword occurrences across every article's lowercased
/// title + description and returns `(pos − neg) / (pos + neg)`, or exactly
/// `0.0` when neither list matched anything.
#[must_use]
pub fn calculate_sentiment(articles: &[RawArticle]) -> f64 {
    let mut positive: u32 = 0;
    let mut negative: u32 = 0;

    for article in articles {
        let text = format!(
            "{} {}",
            article.title.as_deref().unwrap_or(""),
            article.description.as_deref().unwrap_or("")
        )
        .to_lowercase();

        for keyword in POSITIVE_KEYWORDS {
            if text.contains(keyword) {
                positive += 1;
            }
        }
        for keyword in NEGATIVE_KEYWORDS {
            if text.contains(keyword) {
                negative += 1;
            }
        }
    }

    let total = positive + negative;
    if total == 0 {
        return 0.0;
    }

    let score = (f64::from(positive) - f64::from(negative)) / f64::from(total);
    score.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: &str) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            url: Some("https://reuters.com/x".to_string()),
            source: None,
            published_at: None,
        }
    }

    #[test]
    fn no_articles_is_exactly_zero() {
        assert_eq!(calculate_sentiment(&[]), 0.0);
    }

    #[test]
    fn no_keyword_hits_is_exactly_zero() {
        let articles = vec![article("Quarterly earnings call", "Executives spoke at length")];
        assert_eq!(calculate_sentiment(&articles), 0.0);
    }

    #[test]
    fn all_positive_hits_score_one() {
        let articles = vec![article("Breakthrough partnership", "A new milestone")];
        assert_eq!(calculate_sentiment(&articles), 1.0);
    }

    #[test]
    fn all_negative_hits_score_negative_one() {
        let articles = vec![article("Lawsuit and scandal", "Regulators open a probe")];
        assert_eq!(calculate_sentiment(&articles), -1.0);
    }

    #[test]
    fn balanced_hits_score_zero() {
        let articles = vec![article("Breakthrough", "lawsuit")];
        assert_eq!(calculate_sentiment(&articles), 0.0);
    }

    #[test]
    fn hit_ratio_is_exact() {
        // 3 positive (breakthrough, partnership, milestone), 1 negative
        // (lawsuit): (3 - 1) / 4 = 0.5.
        let articles = vec![
            article("Breakthrough partnership announced", "Hits a new milestone"),
            article("Shareholder lawsuit continues", "No further details"),
        ];
        // "announced" does not contain "announces"; keep the expectation
        // honest about which substrings fire.
        assert!((calculate_sentiment(&articles) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let articles = vec![article("BREAKTHROUGH", "")];
        assert_eq!(calculate_sentiment(&articles), 1.0);
    }

    #[test]
    fn substring_matching_counts_overlapping_keywords() {
        // "launches" contains both the "launches" and "launch" keywords, so
        // a single word yields two positive hits. Score is still 1.0.
        let articles = vec![article("Company launches product", "")];
        assert_eq!(calculate_sentiment(&articles), 1.0);
    }

    #[test]
    fn counts_accumulate_across_articles() {
        // positive: breakthrough, milestone (2); negative: lawsuit, scandal,
        // fraud (3) → (2 - 3) / 5 = -0.2.
        let articles = vec![
            article("Breakthrough reported", "milestone reached"),
            article("Lawsuit filed", "scandal deepens amid fraud claims"),
        ];
        assert!((calculate_sentiment(&articles) - -0.2).abs() < 1e-9);
    }

    #[test]
    fn score_is_always_in_range() {
        let spam = "breakthrough milestone partnership innovation growth";
        let articles: Vec<RawArticle> = (0..50).map(|_| article(spam, spam)).collect();
        let score = calculate_sentiment(&articles);
        assert!((-1.0..=1.0).contains(&score));
    }
}
