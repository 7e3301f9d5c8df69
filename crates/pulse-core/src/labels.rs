//! Bucketing of raw pulse metrics into display labels.
//!
//! The thresholds here are load-bearing: snapshots and cache rows are
//! recomputed from history, so the same input must always produce the same
//! bucket. Do not adjust without migrating stored `pulse_cache` rows.

use serde::{Deserialize, Serialize};

/// Week-over-week trend bucket derived from `trend_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Surging,
    Rising,
    Stable,
    Cooling,
    Quiet,
}

impl TrendDirection {
    /// Bucket a week-over-week percent change.
    ///
    /// Boundaries are closed on the lower bucket: exactly 20 is `Rising`,
    /// exactly 5 is `Stable`, exactly -5 is `Stable`, exactly -20 is `Quiet`.
    #[must_use]
    pub fn from_percent(trend_percent: f64) -> Self {
        if trend_percent > 20.0 {
            TrendDirection::Surging
        } else if trend_percent > 5.0 {
            TrendDirection::Rising
        } else if trend_percent >= -5.0 {
            TrendDirection::Stable
        } else if trend_percent > -20.0 {
            TrendDirection::Cooling
        } else {
            TrendDirection::Quiet
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Surging => "surging",
            TrendDirection::Rising => "rising",
            TrendDirection::Stable => "stable",
            TrendDirection::Cooling => "cooling",
            TrendDirection::Quiet => "quiet",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment bucket derived from a score in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "leaning positive")]
    LeaningPositive,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "leaning negative")]
    LeaningNegative,
    #[serde(rename = "negative")]
    Negative,
}

impl SentimentLabel {
    /// Bucket an average sentiment score.
    ///
    /// `Neutral` requires an exact zero — a score of 0.001 already leans
    /// positive. Scores come pre-rounded from the scorer/recompute, so the
    /// exact comparison is stable.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.3 {
            SentimentLabel::Positive
        } else if score > 0.0 {
            SentimentLabel::LeaningPositive
        } else if score == 0.0 {
            SentimentLabel::Neutral
        } else if score > -0.3 {
            SentimentLabel::LeaningNegative
        } else {
            SentimentLabel::Negative
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::LeaningPositive => "leaning positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::LeaningNegative => "leaning negative",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to 1 decimal place (trend percentages).
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places (sentiment scores).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
