//! Document sources
//!
//! A [`DocumentSource`] returns raw candidate articles for a topic and time
//! window. The search agent normalizes them into [`Document`]s and ranks
//! them; the source itself does no filtering beyond what the provider does.

/// NewsAPI `/v2/everything` implementation.
pub mod newsapi;

use crate::types::{Document, Result, TimeRange};
use async_trait::async_trait;
use serde::Deserialize;

pub use newsapi::NewsApiSource;

/// Source name used when the provider leaves it out.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Parameters of one fetch
#[derive(Debug, Clone, PartialEq)]
pub struct SourceQuery {
    pub topic: String,
    pub range: TimeRange,
    pub language: String,
    pub sort_by: String,
}

impl SourceQuery {
    pub fn new(topic: impl Into<String>, range: TimeRange) -> Self {
        Self {
            topic: topic.into(),
            range,
            language: "en".to_string(),
            sort_by: "relevancy".to_string(),
        }
    }
}

/// Provider article with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default, rename = "publishedAt", alias = "published_at")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawArticle {
    /// Fill every missing field; a missing source name becomes [`UNKNOWN_SOURCE`].
    pub fn normalize(self) -> Document {
        let source_name = self
            .source
            .and_then(|s| s.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Document {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            source_name,
            published_at: self.published_at.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
        }
    }
}

/// External index of news documents
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch raw candidates. Failures surface as [`crate::types::AppError::Transport`].
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawArticle>>;

    /// Short identifier for logs
    fn name(&self) -> &str;
}
