//! Mock implementations for testing.
//!
//! This module provides a scripted LLM client and an in-memory document
//! source that can be used across different test files without duplication.

#![allow(dead_code)]

use async_trait::async_trait;
use newsroom::research::progress::{PipelineState, ProgressObserver};
use newsroom::sources::{DocumentSource, RawArticle, RawSource, SourceQuery};
use newsroom::types::{AppError, Result};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the scripted client does for one prompt.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(String),
    Panic(String),
}

impl MockReply {
    pub fn json(value: serde_json::Value) -> Self {
        MockReply::Text(value.to_string())
    }
}

/// One recorded `generate_json` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

type Responder = dyn Fn(&str) -> MockReply + Send + Sync;

/// Mock LLM client whose reply is chosen by a closure over the prompt.
///
/// Records every call and tracks how many calls were in flight at once.
///
/// # Examples
///
/// ```ignore
/// // Canned replies for every pipeline prompt
/// let client = ScriptedLLMClient::pipeline();
///
/// // Fail one document's analysis, answer everything else normally
/// let client = ScriptedLLMClient::new(|prompt| {
///     if prompt.contains("Title: Article 3") && prompt.contains("Analyze the following article") {
///         MockReply::Fail("quota exceeded".into())
///     } else {
///         pipeline_reply(prompt)
///     }
/// });
/// ```
pub struct ScriptedLLMClient {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedLLMClient {
    pub fn new(responder: impl Fn(&str) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Canned, well-formed replies for every pipeline prompt.
    pub fn pipeline() -> Self {
        Self::new(pipeline_reply)
    }

    /// Same reply for every prompt.
    pub fn fixed(reply: MockReply) -> Self {
        Self::new(move |_| reply.clone())
    }

    /// Every call fails with a transport error.
    pub fn failing() -> Self {
        Self::fixed(MockReply::Fail("Mock LLM failure".to_string()))
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls whose prompt contains `needle`.
    pub fn calls_matching(&self, needle: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.prompt.contains(needle))
            .cloned()
            .collect()
    }

    /// Highest number of simultaneously running calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl newsroom::llm::LLMClient for ScriptedLLMClient {
    async fn generate_json(&self, system: &str, prompt: &str, temperature: f32) -> Result<String> {
        self.calls.lock().push(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            temperature,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match (self.responder)(prompt) {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(message) => Err(AppError::Transport(message)),
            MockReply::Panic(message) => panic!("{}", message),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Pull the `Title: ...` line out of a per-document prompt.
pub fn prompt_title(prompt: &str) -> Option<&str> {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix("Title: "))
}

/// Well-formed reply for whichever pipeline prompt this is.
pub fn pipeline_reply(prompt: &str) -> MockReply {
    if prompt.contains("generate recommendations") {
        MockReply::json(json!({
            "recommendations": [
                {
                    "recommendation": "Follow regulator statements",
                    "rationale": "Policy is moving quickly",
                    "priority": "high",
                    "suggested_actions": ["Track hearings"]
                },
                {
                    "recommendation": "Compare regional coverage",
                    "rationale": "Coverage is uneven",
                    "priority": "low",
                    "suggested_actions": []
                }
            ]
        }))
    } else if prompt.contains("detailed analysis report") {
        MockReply::json(json!({
            "topic_analysis": {
                "main_topics": ["regulation", "industry"],
                "topic_relationships": ["regulation shapes industry"],
                "emerging_themes": ["audits"]
            },
            "source_analysis": {
                "source_distribution": "Mixed wire and trade press",
                "credibility_assessment": "Generally reliable",
                "potential_biases": ["industry framing"]
            },
            "narrative_analysis": {
                "main_narratives": ["tightening oversight"],
                "competing_viewpoints": ["self-regulation"],
                "supporting_evidence": ["draft rules"]
            },
            "fact_check_summary": {
                "verified_claims": ["draft rules published"],
                "disputed_claims": [],
                "unverified_claims": ["timeline"]
            }
        }))
    } else if prompt.contains("executive summary") {
        MockReply::json(json!({
            "main_findings": "Oversight is tightening across markets.",
            "key_trends": ["audits", "disclosure"],
            "critical_insights": ["enforcement lags rules"],
            "reliability_assessment": "Moderate"
        }))
    } else if prompt.contains("collection of article analyses") {
        MockReply::json(json!({
            "main_narrative": "Coverage converges on stricter oversight",
            "common_themes": ["oversight"],
            "conflicting_viewpoints": ["pace of change"],
            "overall_sentiment": "cautious",
            "potential_gaps": ["non-English sources"]
        }))
    } else if prompt.contains("verify its claims") {
        let title = prompt_title(prompt).unwrap_or("unknown");
        MockReply::json(json!({
            "verified_claims": [{
                "claim": format!("{} reports a policy change", title),
                "verification_status": "confirmed",
                "evidence": "official release",
                "confidence": "high"
            }],
            "unverified_claims": [],
            "credibility_assessment": {
                "source_credibility": 0.8,
                "evidence_quality": "0.7",
                "overall_reliability": 0.75
            },
            "verification_summary": format!("Checked {}", title)
        }))
    } else if prompt.contains("Analyze the following article") {
        let title = prompt_title(prompt).unwrap_or("unknown");
        MockReply::json(json!({
            "summary": format!("Summary of {}", title),
            "key_points": [format!("Point from {}", title)],
            "sentiment": {"score": 0.2, "explanation": "measured"},
            "topics": ["policy"],
            "bias": {"detected": false, "explanation": ""}
        }))
    } else if prompt.contains("Evaluate and rank") {
        // rank every candidate in listed order with falling scores;
        // the schema example in the prompt accounts for one "id" key
        let count = prompt.matches("\"id\":").count().saturating_sub(1);
        let ranked: Vec<_> = (0..count)
            .map(|id| {
                json!({
                    "id": id,
                    "relevance_score": 1.0 - (id as f64) * 0.05,
                    "explanation": format!("candidate {}", id)
                })
            })
            .collect();
        MockReply::json(json!({ "ranked_articles": ranked }))
    } else {
        MockReply::Fail(format!("unscripted prompt: {}", prompt.chars().take(80).collect::<String>()))
    }
}

/// `n` provider articles titled `Article 0..n`.
pub fn raw_articles(n: usize) -> Vec<RawArticle> {
    (0..n)
        .map(|i| RawArticle {
            title: Some(format!("Article {}", i)),
            description: Some(format!("Description of article {}", i)),
            url: Some(format!("https://news.example/{}", i)),
            source: Some(RawSource {
                id: None,
                name: Some(format!("Source {}", i)),
            }),
            published_at: Some("2026-10-14T08:00:00Z".to_string()),
            content: Some(format!("Body of article {}", i)),
        })
        .collect()
}

/// In-memory document source that records its queries.
pub struct MockDocumentSource {
    articles: Vec<RawArticle>,
    should_fail: bool,
    queries: Mutex<Vec<SourceQuery>>,
}

impl MockDocumentSource {
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self {
            articles,
            should_fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            articles: Vec::new(),
            should_fail: true,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SourceQuery> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl DocumentSource for MockDocumentSource {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawArticle>> {
        self.queries.lock().push(query.clone());
        if self.should_fail {
            return Err(AppError::Transport("Mock source failure".to_string()));
        }
        Ok(self.articles.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Observer that records every notification.
#[derive(Default)]
pub struct RecordingObserver {
    pub transitions: Mutex<Vec<(PipelineState, PipelineState)>>,
    pub items: Mutex<Vec<(PipelineState, usize, usize)>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<PipelineState> {
        self.transitions.lock().iter().map(|(_, to)| *to).collect()
    }

    pub fn items_for(&self, stage: PipelineState) -> Vec<(usize, usize)> {
        self.items
            .lock()
            .iter()
            .filter(|(s, _, _)| *s == stage)
            .map(|(_, done, total)| (*done, *total))
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_state_change(&self, from: PipelineState, to: PipelineState) {
        self.transitions.lock().push((from, to));
    }

    fn on_item_complete(&self, stage: PipelineState, done: usize, total: usize) {
        self.items.lock().push((stage, done, total));
    }
}
