//! Report synthesis
//!
//! Three sequential calls build the final [`Report`]: the executive summary,
//! the detailed analysis, then recommendations derived from the first two.
//! A failed call or an unparseable reply degrades only its own section.
//! Anything that escapes the sections degrades the whole report to
//! [`Report::failure_skeleton`].

use super::{to_prompt_json, AgentRole, BaseAgent};
use crate::llm::LLMClient;
use crate::types::{
    AnalysisReport, CredibilityAssessment, DetailedAnalysis, Document, ExecutiveSummary,
    Recommendation, Report, ReportMetadata, UnverifiedClaim, VerificationResult, VerifiedClaim,
};
use crate::utils::toml_config::PipelineConfig;
use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Recommendations arrive as a bare array, or wrapped in an object because
/// JSON mode only permits object payloads. Anything else is no recommendations.
pub fn parse_recommendations(value: Value) -> Vec<Recommendation> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("recommendations") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Claims and scores flattened across every verification result.
#[derive(Debug, Default)]
struct FactCheckDigest<'a> {
    verified: Vec<&'a VerifiedClaim>,
    unverified: Vec<&'a UnverifiedClaim>,
    credibility: Vec<CredibilityAssessment>,
}

impl<'a> FactCheckDigest<'a> {
    fn collect(results: &'a [VerificationResult]) -> Self {
        let mut digest = Self::default();
        for result in results {
            let verification = &result.verification;
            digest.verified.extend(verification.verified_claims.iter());
            digest.unverified.extend(verification.unverified_claims.iter());
            digest.credibility.push(verification.credibility_assessment);
        }
        digest
    }
}

/// Turns analysis and verification output into a [`Report`].
pub struct SynthesisAgent {
    base: BaseAgent,
}

impl SynthesisAgent {
    pub fn new(llm: Arc<dyn LLMClient>, pipeline: &PipelineConfig) -> Self {
        Self {
            base: BaseAgent::new(llm, AgentRole::Report, &pipeline.temperatures),
        }
    }

    /// Build the report for `topic`. Never fails.
    pub async fn synthesize(
        &self,
        topic: &str,
        documents: &[Document],
        analysis: &AnalysisReport,
        verification: &[VerificationResult],
    ) -> Report {
        let timestamp = Utc::now();
        let metadata = ReportMetadata {
            article_count: documents.len(),
            timestamp,
            topic: topic.to_string(),
        };

        match AssertUnwindSafe(self.build(metadata, analysis, verification))
            .catch_unwind()
            .await
        {
            Ok(report) => report,
            Err(_) => {
                tracing::error!(topic, "Report generation failed");
                Report::failure_skeleton(topic, documents.len(), timestamp)
            }
        }
    }

    async fn build(
        &self,
        metadata: ReportMetadata,
        analysis: &AnalysisReport,
        verification: &[VerificationResult],
    ) -> Report {
        let executive_summary = self.executive_summary(&metadata, analysis).await;
        let detailed_analysis = self.detailed_analysis(analysis, verification).await;
        let recommendations = self
            .recommendations(&executive_summary, &detailed_analysis)
            .await;

        Report {
            executive_summary,
            detailed_analysis,
            recommendations,
            metadata,
            error: None,
        }
    }

    async fn executive_summary(
        &self,
        metadata: &ReportMetadata,
        analysis: &AnalysisReport,
    ) -> ExecutiveSummary {
        let prompt = format!(
            r#"Create an executive summary of the following news analysis:

Topic: {topic}
Number of Articles: {count}
Overall Analysis: {overall}
Key Findings: {key_points}

Return the summary in JSON format with the following structure:
{{
    "main_findings": "2-3 sentences on the most important findings",
    "key_trends": ["list", "of", "key", "trends"],
    "critical_insights": ["list", "of", "critical", "insights"],
    "reliability_assessment": "overall assessment of the information reliability"
}}"#,
            topic = metadata.topic,
            count = metadata.article_count,
            overall = to_prompt_json(&analysis.overall_analysis),
            key_points = to_prompt_json(&analysis.all_key_points()),
        );

        self.base
            .structured(&prompt, None, ExecutiveSummary::default())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Executive summary failed");
                ExecutiveSummary::with_findings(ExecutiveSummary::FAILED)
            })
    }

    async fn detailed_analysis(
        &self,
        analysis: &AnalysisReport,
        verification: &[VerificationResult],
    ) -> DetailedAnalysis {
        let digest = FactCheckDigest::collect(verification);
        let prompt = format!(
            r#"Create a detailed analysis report from the following data:

Analysis Results: {analysis}
Verified Claims: {verified}
Unverified Claims: {unverified}
Credibility Scores: {credibility}

Return the analysis in JSON format with the following structure:
{{
    "topic_analysis": {{
        "main_topics": ["list", "of", "topics"],
        "topic_relationships": ["how", "topics", "relate"],
        "emerging_themes": ["list", "of", "themes"]
    }},
    "source_analysis": {{
        "source_distribution": "analysis of sources used",
        "credibility_assessment": "overall source credibility",
        "potential_biases": ["identified", "biases"]
    }},
    "narrative_analysis": {{
        "main_narratives": ["identified", "narratives"],
        "competing_viewpoints": ["different", "viewpoints"],
        "supporting_evidence": ["evidence", "summary"]
    }},
    "fact_check_summary": {{
        "verified_claims": ["list", "of", "verified", "claims"],
        "disputed_claims": ["list", "of", "disputed", "claims"],
        "unverified_claims": ["list", "of", "unverified", "claims"]
    }}
}}"#,
            analysis = to_prompt_json(analysis),
            verified = to_prompt_json(&digest.verified),
            unverified = to_prompt_json(&digest.unverified),
            credibility = to_prompt_json(&digest.credibility),
        );

        self.base
            .structured(&prompt, None, DetailedAnalysis::default())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Detailed analysis failed");
                DetailedAnalysis::default()
            })
    }

    async fn recommendations(
        &self,
        executive_summary: &ExecutiveSummary,
        detailed_analysis: &DetailedAnalysis,
    ) -> Vec<Recommendation> {
        let prompt = format!(
            r#"Based on the following analysis, generate recommendations for further investigation:

Executive Summary: {summary}
Detailed Analysis: {detailed}

Return a JSON object with a "recommendations" array of objects with the following structure:
{{
    "recommendations": [{{
        "recommendation": "specific recommendation",
        "rationale": "why this is important",
        "priority": "high/medium/low",
        "suggested_actions": ["specific", "actions", "to", "take"]
    }}]
}}"#,
            summary = to_prompt_json(executive_summary),
            detailed = to_prompt_json(detailed_analysis),
        );

        match self.base.structured(&prompt, None, Value::Null).await {
            Ok(payload) => parse_recommendations(payload),
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation generation failed");
                Vec::new()
            }
        }
    }
}
