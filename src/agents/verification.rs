//! Concurrent fact-checking of documents

use super::{AgentRole, BaseAgent};
use crate::llm::LLMClient;
use crate::research::progress::{NoopObserver, PipelineState, ProgressObserver};
use crate::types::{Document, Verification, VerificationResult};
use crate::utils::toml_config::PipelineConfig;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

const VERIFICATION_TEMPERATURE: f32 = 0.2;

/// Checks the claims of each document, at most `max_concurrency` at a time.
pub struct VerificationAgent {
    base: BaseAgent,
    max_concurrency: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl VerificationAgent {
    pub fn new(llm: Arc<dyn LLMClient>, pipeline: &PipelineConfig) -> Self {
        Self {
            base: BaseAgent::new(llm, AgentRole::FactCheck, &pipeline.temperatures),
            max_concurrency: pipeline.max_concurrency.max(1),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Verify every document.
    ///
    /// Returns exactly one result per input, in completion order. Each
    /// result names its document; callers must not rely on position. A
    /// failed or panicked task yields [`Verification::failed`].
    pub async fn verify(&self, documents: &[Document]) -> Vec<VerificationResult> {
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut pending: FuturesUnordered<_> = documents
            .iter()
            .cloned()
            .map(|document| {
                let base = self.base.clone();
                let semaphore = Arc::clone(&semaphore);
                let observer = Arc::clone(&self.observer);
                let completed = Arc::clone(&completed);
                let task_document = document.clone();

                let handle = tokio::spawn(async move {
                    // held until the task finishes, whatever the outcome
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return Verification::failed();
                    };
                    let verification = verify_document(&base, &task_document).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    observer.on_item_complete(PipelineState::Verifying, done, total);
                    verification
                });

                async move { (document, handle.await) }
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        while let Some((document, joined)) = pending.next().await {
            let verification = joined.unwrap_or_else(|e| {
                tracing::warn!(url = %document.url, error = %e, "Verification task aborted");
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                self.observer
                    .on_item_complete(PipelineState::Verifying, done, total);
                Verification::failed()
            });

            results.push(VerificationResult {
                article_url: document.url.clone(),
                verification,
                original_document: document,
            });
        }

        results
    }
}

async fn verify_document(base: &BaseAgent, document: &Document) -> Verification {
    let prompt = verification_prompt(document);
    match base
        .structured(&prompt, Some(VERIFICATION_TEMPERATURE), Verification::failed())
        .await
    {
        Ok(verification) => verification,
        Err(e) => {
            tracing::warn!(title = %document.title, error = %e, "Verification call failed");
            Verification::failed()
        }
    }
}

fn verification_prompt(document: &Document) -> String {
    format!(
        r#"You are an expert fact-checker. Analyze the following article and verify its claims:

Title: {title}
Content: {content}
Source: {source}
URL: {url}

Return a JSON object with the following structure:
{{
    "verified_claims": [
        {{
            "claim": "specific claim from the article",
            "verification_status": "confirmed/partially_confirmed/unconfirmed/false",
            "evidence": "supporting or contradicting evidence",
            "confidence": "high/medium/low"
        }}
    ],
    "unverified_claims": [
        {{
            "claim": "claim that couldn't be verified",
            "reason": "why verification wasn't possible"
        }}
    ],
    "credibility_assessment": {{
        "source_credibility": "score between 0 and 1",
        "evidence_quality": "score between 0 and 1",
        "overall_reliability": "score between 0 and 1"
    }},
    "verification_summary": "brief summary of the fact-checking results"
}}

Focus on factual claims that can be verified through reliable sources."#,
        title = document.title,
        content = document.description,
        source = document.source_name,
        url = document.url,
    )
}
