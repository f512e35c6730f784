//! Lexicon-based sentiment labelling for article descriptions.

use once_cell::sync::Lazy;
use serde::Serialize;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound scores at or beyond these bounds are polar.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

// The analyzer only borrows static lexicons, so one instance serves every request
static ANALYZER: Lazy<SentimentIntensityAnalyzer> = Lazy::new(SentimentIntensityAnalyzer::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Normalized polarity of `text` in [-1, 1].
pub fn compound_score(text: &str) -> f64 {
    ANALYZER
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
}

pub fn score(text: &str) -> Sentiment {
    Sentiment::from_compound(compound_score(text))
}
