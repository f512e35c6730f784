use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sentiment::{self, Sentiment};
use crate::summarizer;

pub const NO_DESCRIPTION_PLACEHOLDER: &str = "No description available";

/// An upstream article record, kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Article {
    pub fields: Map<String, Value>,
}

impl Article {
    /// The description to analyze, or the placeholder when it is missing or empty.
    pub fn description(&self) -> &str {
        self.fields
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION_PLACEHOLDER)
    }

    /// Attaches sentiment and summary to a copy of this article.
    pub fn enrich(&self) -> EnrichedArticle {
        let description = self.description();
        let sentiment = sentiment::score(description);
        let summary = summarizer::summarize_description(description);

        let mut original = self.fields.clone();
        // Computed fields replace any upstream fields of the same name
        original.remove("sentiment");
        original.remove("summary");

        EnrichedArticle {
            original,
            sentiment,
            summary,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub original: Map<String, Value>,
    pub sentiment: Sentiment,
    pub summary: String,
}

#[derive(Serialize)]
pub struct NewsResponse {
    pub articles: Vec<EnrichedArticle>,
}
