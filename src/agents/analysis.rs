//! Per-document and overall analysis

use super::{to_prompt_json, AgentRole, BaseAgent};
use crate::llm::LLMClient;
use crate::research::progress::{NoopObserver, PipelineState, ProgressObserver};
use crate::types::{AnalysisReport, AnalysisResult, Document, OverallAnalysis};
use crate::utils::toml_config::PipelineConfig;
use std::sync::Arc;

const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Analyzes documents one at a time, then the batch as a whole.
pub struct AnalysisAgent {
    base: BaseAgent,
    observer: Arc<dyn ProgressObserver>,
}

impl AnalysisAgent {
    pub fn new(llm: Arc<dyn LLMClient>, pipeline: &PipelineConfig) -> Self {
        Self {
            base: BaseAgent::new(llm, AgentRole::Analysis, &pipeline.temperatures),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Analyze every document in order.
    ///
    /// The per-document vectors of the returned report line up with
    /// `documents`; a document that could not be analyzed contributes the
    /// [`AnalysisResult::failed`] sentinel at its index.
    pub async fn analyze(&self, documents: &[Document]) -> AnalysisReport {
        let total = documents.len();
        let mut report = AnalysisReport::default();

        for (index, document) in documents.iter().enumerate() {
            let result = self.analyze_document(document).await;
            report.push(result);
            self.observer
                .on_item_complete(PipelineState::Analyzing, index + 1, total);
        }

        report.overall_analysis = self.overall_analysis(&report).await;
        report
    }

    /// Analyze a single document, substituting the sentinel on any failure.
    pub async fn analyze_document(&self, document: &Document) -> AnalysisResult {
        let prompt = document_prompt(document);
        match self
            .base
            .structured(&prompt, Some(ANALYSIS_TEMPERATURE), AnalysisResult::failed())
            .await
        {
            Ok(result) => result.normalized(),
            Err(e) => {
                tracing::warn!(title = %document.title, error = %e, "Document analysis failed");
                AnalysisResult::failed()
            }
        }
    }

    async fn overall_analysis(&self, report: &AnalysisReport) -> OverallAnalysis {
        let prompt = overall_prompt(report);
        match self
            .base
            .structured(&prompt, Some(ANALYSIS_TEMPERATURE), OverallAnalysis::failed())
            .await
        {
            Ok(overall) => overall,
            Err(e) => {
                tracing::warn!(error = %e, "Overall analysis failed");
                OverallAnalysis::failed()
            }
        }
    }
}

fn document_prompt(document: &Document) -> String {
    format!(
        r#"You are an expert content analyst. Analyze the following article carefully and provide insights:

Title: {title}
Content: {content}
Source: {source}

Return a JSON object with the following structure:
{{
    "summary": "concise summary of the article",
    "key_points": ["key point 1", "key point 2", "etc"],
    "sentiment": {{
        "score": number_between_negative_1_and_1,
        "explanation": "brief explanation of sentiment"
    }},
    "topics": ["main topic 1", "main topic 2", "etc"],
    "bias": {{
        "detected": true_or_false,
        "explanation": "if bias detected, explain why"
    }}
}}"#,
        title = document.title,
        content = document.description,
        source = document.source_name,
    )
}

fn overall_prompt(report: &AnalysisReport) -> String {
    format!(
        r#"You are an expert news analyst. Analyze this collection of article analyses and provide an overall assessment.

Input data:
Summaries: {summaries}
Key Points: {key_points}
Sentiments: {sentiments}
Topics: {topics}
Biases: {biases}

Return a JSON object with the following structure:
{{
    "main_narrative": "overall narrative across articles",
    "common_themes": ["theme 1", "theme 2", "etc"],
    "conflicting_viewpoints": ["viewpoint 1", "viewpoint 2", "etc"],
    "overall_sentiment": "general sentiment across articles",
    "potential_gaps": ["gap 1", "gap 2", "etc"]
}}"#,
        summaries = to_prompt_json(&report.summaries),
        key_points = to_prompt_json(&report.all_key_points()),
        sentiments = to_prompt_json(&report.sentiments),
        topics = to_prompt_json(&report.topics),
        biases = to_prompt_json(&report.biases),
    )
}
