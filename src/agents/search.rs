//! Document search and LLM ranking

use super::{to_prompt_json, AgentRole, BaseAgent};
use crate::llm::LLMClient;
use crate::sources::{DocumentSource, SourceQuery};
use crate::types::{Document, RankedDocument, TimeRange};
use crate::utils::serde_helpers::{value_as_f64, value_as_index, value_as_string};
use crate::utils::toml_config::PipelineConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

const RANKING_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Default, Deserialize)]
struct RankingResponse {
    #[serde(default, alias = "rankedArticles")]
    ranked_articles: Vec<Value>,
}

#[derive(Serialize)]
struct Candidate<'a> {
    id: usize,
    title: &'a str,
    description: &'a str,
    source: &'a str,
    url: &'a str,
    #[serde(rename = "publishedAt")]
    published_at: &'a str,
}

/// Fetches candidates from a [`DocumentSource`] and asks the model to rank them.
pub struct SearchAgent {
    base: BaseAgent,
    source: Arc<dyn DocumentSource>,
    max_articles: usize,
    lookback_days: i64,
    language: String,
    sort_by: String,
}

impl SearchAgent {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        source: Arc<dyn DocumentSource>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            base: BaseAgent::new(llm, AgentRole::Search, &pipeline.temperatures),
            source,
            max_articles: pipeline.max_articles,
            lookback_days: pipeline.lookback_days,
            language: "en".to_string(),
            sort_by: "relevancy".to_string(),
        }
    }

    /// Override the provider language and sort order
    pub fn with_query_options(mut self, language: impl Into<String>, sort_by: impl Into<String>) -> Self {
        self.language = language.into();
        self.sort_by = sort_by.into();
        self
    }

    pub fn max_articles(&self) -> usize {
        self.max_articles
    }

    /// Find and rank documents for `topic`.
    ///
    /// Returns at most `max_articles` documents, highest relevance first.
    /// An unreachable source yields an empty list; an unusable ranking
    /// yields the first candidates in provider order.
    pub async fn search(&self, topic: &str, range: Option<TimeRange>) -> Vec<RankedDocument> {
        let range = range.unwrap_or_else(|| TimeRange::last_days(self.lookback_days));
        let query = SourceQuery {
            topic: topic.to_string(),
            range,
            language: self.language.clone(),
            sort_by: self.sort_by.clone(),
        };

        let raw = match self.source.fetch(&query).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Document fetch failed");
                return Vec::new();
            }
        };

        if raw.is_empty() {
            tracing::info!(topic, source = self.source.name(), "No candidate documents");
            return Vec::new();
        }

        tracing::info!(topic, candidates = raw.len(), "Fetched candidate documents");
        let documents: Vec<Document> = raw.into_iter().map(|a| a.normalize()).collect();
        self.rank(topic, &documents).await
    }

    /// Rank already-normalized documents against `topic`.
    pub async fn rank(&self, topic: &str, documents: &[Document]) -> Vec<RankedDocument> {
        if documents.is_empty() {
            return Vec::new();
        }

        let prompt = ranking_prompt(topic, documents);
        let response = match self
            .base
            .structured(&prompt, Some(RANKING_TEMPERATURE), RankingResponse::default())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Ranking call failed, keeping provider order");
                return self.fallback(documents);
            }
        };

        let mut ranked = resolve_rankings(&response.ranked_articles, documents);
        if ranked.is_empty() {
            tracing::warn!(topic, "Ranking returned no usable entries, keeping provider order");
            return self.fallback(documents);
        }

        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        ranked.truncate(self.max_articles);
        ranked
    }

    fn fallback(&self, documents: &[Document]) -> Vec<RankedDocument> {
        documents
            .iter()
            .take(self.max_articles)
            .cloned()
            .map(RankedDocument::unranked)
            .collect()
    }
}

fn ranking_prompt(topic: &str, documents: &[Document]) -> String {
    let candidates: Vec<Candidate<'_>> = documents
        .iter()
        .enumerate()
        .map(|(id, doc)| Candidate {
            id,
            title: &doc.title,
            description: &doc.description,
            source: &doc.source_name,
            url: &doc.url,
            published_at: &doc.published_at,
        })
        .collect();

    format!(
        r#"You are an expert news curator. Evaluate and rank the following articles based on their relevance to the topic: '{topic}'

Evaluation criteria:
1. Relevance to the topic
2. Source credibility
3. Information quality
4. Timeliness

Articles to evaluate:
{articles}

Return a JSON object with the following structure:
{{
    "ranked_articles": [
        {{
            "id": "article id number",
            "relevance_score": "score between 0 and 1",
            "explanation": "brief explanation of why this article is relevant"
        }}
    ]
}}

Include ONLY the most relevant articles, ranked by importance."#,
        topic = topic,
        articles = to_prompt_json(&candidates),
    )
}

/// Map ranking entries back onto `documents` by index.
///
/// Entries whose id is missing, not a non-negative integer, out of range,
/// or already seen are skipped individually.
fn resolve_rankings(entries: &[Value], documents: &[Document]) -> Vec<RankedDocument> {
    let mut seen = HashSet::new();
    let mut ranked = Vec::new();

    for entry in entries {
        let Some(fields) = entry.as_object() else {
            continue;
        };
        let Some(id) = fields.get("id").and_then(value_as_index) else {
            tracing::debug!(entry = %entry, "Skipping ranking entry without usable id");
            continue;
        };
        if id >= documents.len() || !seen.insert(id) {
            tracing::debug!(id, "Skipping out-of-range or duplicate ranking id");
            continue;
        }

        let score = fields
            .get("relevance_score")
            .or_else(|| fields.get("relevanceScore"))
            .and_then(value_as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let explanation = fields
            .get("explanation")
            .map(value_as_string)
            .unwrap_or_default();

        ranked.push(RankedDocument {
            document: documents[id].clone(),
            relevance_score: score,
            ranking_explanation: explanation,
        });
    }

    ranked
}
