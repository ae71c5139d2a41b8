use crate::utils::serde_helpers::{
    lenient_bool, lenient_f64, lenient_string, lenient_string_vec, skip_invalid,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============= Document Types =============

/// A news article normalized from provider output.
///
/// Every field is always present; providers that omit a value yield an empty
/// string, so downstream stages never special-case missing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source_name: String,
    pub published_at: String,
    pub content: String,
}

/// A [`Document`] plus the ranking fields attached by the search stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDocument {
    #[serde(flatten)]
    pub document: Document,
    pub relevance_score: f64,
    pub ranking_explanation: String,
}

impl RankedDocument {
    /// Wrap a document that never went through LLM ranking.
    pub fn unranked(document: Document) -> Self {
        Self {
            document,
            relevance_score: 0.0,
            ranking_explanation: String::new(),
        }
    }
}

/// Inclusive publication window for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The window ending now and reaching `days` back.
    pub fn last_days(days: i64) -> Self {
        Self::days_before(Utc::now(), days)
    }

    /// The window ending at `end` and reaching `days` back, saturating at the
    /// earliest representable instant.
    pub fn days_before(end: DateTime<Utc>, days: i64) -> Self {
        let start = Duration::try_days(days)
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end }
    }
}

// ============= Analysis Types =============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 (negative) to 1.0 (positive)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasAssessment {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub detected: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
}

/// Structured analysis of a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub bias: BiasAssessment,
}

impl AnalysisResult {
    pub const FAILED: &'static str = "Analysis failed";

    /// Sentinel substituted when a document could not be analyzed.
    pub fn failed() -> Self {
        Self {
            summary: Self::FAILED.to_string(),
            key_points: vec![Self::FAILED.to_string()],
            sentiment: Sentiment {
                score: 0.0,
                explanation: Self::FAILED.to_string(),
            },
            topics: vec!["Unknown".to_string()],
            bias: BiasAssessment {
                detected: false,
                explanation: Self::FAILED.to_string(),
            },
        }
    }

    /// Clamp the sentiment score into [-1, 1].
    pub fn normalized(mut self) -> Self {
        self.sentiment.score = self.sentiment.score.clamp(-1.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub main_narrative: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub common_themes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub conflicting_viewpoints: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub overall_sentiment: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub potential_gaps: Vec<String>,
}

impl OverallAnalysis {
    /// Default used when the aggregate call fails.
    pub fn failed() -> Self {
        Self {
            main_narrative: AnalysisResult::FAILED.to_string(),
            common_themes: Vec::new(),
            conflicting_viewpoints: Vec::new(),
            overall_sentiment: "neutral".to_string(),
            potential_gaps: vec!["Analysis failed to complete".to_string()],
        }
    }
}

/// Output of the analysis stage.
///
/// Every per-document vector has one entry per input document, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summaries: Vec<String>,
    pub key_points: Vec<Vec<String>>,
    pub sentiments: Vec<Sentiment>,
    pub topics: Vec<Vec<String>>,
    pub biases: Vec<BiasAssessment>,
    pub overall_analysis: OverallAnalysis,
}

impl AnalysisReport {
    pub fn push(&mut self, result: AnalysisResult) {
        self.summaries.push(result.summary);
        self.key_points.push(result.key_points);
        self.sentiments.push(result.sentiment);
        self.topics.push(result.topics);
        self.biases.push(result.bias);
    }

    /// Number of documents covered.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Key points of all documents in document order.
    pub fn all_key_points(&self) -> Vec<&str> {
        self.key_points
            .iter()
            .flat_map(|points| points.iter().map(String::as_str))
            .collect()
    }
}

// ============= Verification Types =============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifiedClaim {
    #[serde(default, deserialize_with = "lenient_string")]
    pub claim: String,
    /// confirmed / partially_confirmed / unconfirmed / false
    #[serde(default, deserialize_with = "lenient_string")]
    pub verification_status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub evidence: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub confidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnverifiedClaim {
    #[serde(default, deserialize_with = "lenient_string")]
    pub claim: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: String,
}

/// Three scores in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CredibilityAssessment {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub source_credibility: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub evidence_quality: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overall_reliability: f64,
}

impl CredibilityAssessment {
    pub fn clamped(self) -> Self {
        Self {
            source_credibility: self.source_credibility.clamp(0.0, 1.0),
            evidence_quality: self.evidence_quality.clamp(0.0, 1.0),
            overall_reliability: self.overall_reliability.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default, deserialize_with = "skip_invalid")]
    pub verified_claims: Vec<VerifiedClaim>,
    #[serde(default, deserialize_with = "skip_invalid")]
    pub unverified_claims: Vec<UnverifiedClaim>,
    #[serde(default, deserialize_with = "lenient_credibility")]
    pub credibility_assessment: CredibilityAssessment,
    #[serde(
        default,
        rename = "verification_summary",
        alias = "summary",
        deserialize_with = "lenient_string"
    )]
    pub summary: String,
}

impl Verification {
    pub const FAILED: &'static str = "Verification failed";

    /// Zeroed credibility, no claims.
    pub fn failed() -> Self {
        Self {
            summary: Self::FAILED.to_string(),
            ..Default::default()
        }
    }
}

/// Verification outcome for one document. Carries the document it refers to,
/// since results arrive in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub article_url: String,
    pub verification: Verification,
    pub original_document: Document,
}

fn lenient_credibility<'de, D>(
    deserializer: D,
) -> std::result::Result<CredibilityAssessment, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<CredibilityAssessment>(value)
        .map(CredibilityAssessment::clamped)
        .unwrap_or_default())
}

// ============= Report Types =============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub main_findings: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub key_trends: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub critical_insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reliability_assessment: String,
}

impl ExecutiveSummary {
    pub const FAILED: &'static str = "Summary generation failed";

    pub fn with_findings(main_findings: impl Into<String>) -> Self {
        Self {
            main_findings: main_findings.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub main_topics: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub topic_relationships: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub emerging_themes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_distribution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub credibility_assessment: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub potential_biases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeAnalysis {
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub main_narratives: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub competing_viewpoints: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub supporting_evidence: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactCheckSummary {
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub verified_claims: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub disputed_claims: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub unverified_claims: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    #[serde(default)]
    pub topic_analysis: TopicAnalysis,
    #[serde(default)]
    pub source_analysis: SourceAnalysis,
    #[serde(default)]
    pub narrative_analysis: NarrativeAnalysis,
    #[serde(default)]
    pub fact_check_summary: FactCheckSummary,
}

impl DetailedAnalysis {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient_string(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "high" | "critical" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub recommendation: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rationale: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub suggested_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub article_count: usize,
    pub timestamp: DateTime<Utc>,
    pub topic: String,
}

/// The terminal artifact of a research run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub executive_summary: ExecutiveSummary,
    pub detailed_analysis: DetailedAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub metadata: ReportMetadata,
    /// Set only on reports produced for a failed or empty run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    pub const GENERATION_FAILED: &'static str = "Report generation failed";
    pub const NO_ARTICLES: &'static str = "No articles found";

    /// Skeleton returned when synthesis aborts outside its sections.
    pub fn failure_skeleton(topic: &str, article_count: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            executive_summary: ExecutiveSummary::with_findings(Self::GENERATION_FAILED),
            detailed_analysis: DetailedAnalysis::default(),
            recommendations: Vec::new(),
            metadata: ReportMetadata {
                article_count,
                timestamp,
                topic: topic.to_string(),
            },
            error: None,
        }
    }

    /// Error-shaped report carrying the failure message.
    pub fn error(topic: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            executive_summary: ExecutiveSummary::with_findings(format!(
                "Error occurred: {}",
                message
            )),
            detailed_analysis: DetailedAnalysis::default(),
            recommendations: Vec::new(),
            metadata: ReportMetadata {
                article_count: 0,
                timestamp: Utc::now(),
                topic: topic.to_string(),
            },
            error: Some(message),
        }
    }

    pub fn no_articles(topic: &str) -> Self {
        let mut report = Self::error(topic, Self::NO_ARTICLES);
        report.executive_summary.main_findings =
            "No articles found for the given topic".to_string();
        report
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The LLM or document source could not be reached, or answered with an error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// LLM text could not be decoded as JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON decoded but did not have the expected shape.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_huge_lookback_saturates() {
        let end = Utc::now();
        let range = TimeRange::days_before(end, i64::MAX);
        assert_eq!(range.start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(range.end, end);

        let week = TimeRange::days_before(end, 7);
        assert_eq!(week.end - week.start, Duration::days(7));
    }

    #[test]
    fn test_analysis_result_tolerates_partial_payload() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "summary": "Rates held steady",
            "sentiment": {"score": "0.4"},
            "topics": "monetary policy"
        }))
        .unwrap();

        assert_eq!(result.summary, "Rates held steady");
        assert!(result.key_points.is_empty());
        assert_eq!(result.sentiment.score, 0.4);
        assert_eq!(result.topics, vec!["monetary policy"]);
        assert!(!result.bias.detected);
    }

    #[test]
    fn test_sentiment_is_clamped() {
        let result = AnalysisResult {
            sentiment: Sentiment {
                score: 3.5,
                explanation: String::new(),
            },
            ..Default::default()
        }
        .normalized();
        assert_eq!(result.sentiment.score, 1.0);
    }

    #[test]
    fn test_verification_skips_non_object_claims() {
        let verification: Verification = serde_json::from_value(json!({
            "verified_claims": [
                {"claim": "GDP grew 2%", "verification_status": "confirmed"},
                "a bare string",
                42
            ],
            "credibility_assessment": {
                "source_credibility": "0.9",
                "evidence_quality": 1.7,
                "overall_reliability": null
            },
            "verification_summary": "Mostly accurate"
        }))
        .unwrap();

        assert_eq!(verification.verified_claims.len(), 1);
        assert_eq!(verification.credibility_assessment.source_credibility, 0.9);
        assert_eq!(verification.credibility_assessment.evidence_quality, 1.0);
        assert_eq!(verification.credibility_assessment.overall_reliability, 0.0);
        assert_eq!(verification.summary, "Mostly accurate");
    }

    #[test]
    fn test_non_object_credibility_falls_back_to_zero() {
        let verification: Verification =
            serde_json::from_value(json!({"credibility_assessment": "high"})).unwrap();
        assert_eq!(
            verification.credibility_assessment,
            CredibilityAssessment::default()
        );
    }

    #[test]
    fn test_priority_parsing_is_case_insensitive() {
        let rec: Recommendation =
            serde_json::from_value(json!({"recommendation": "Follow up", "priority": "HIGH"}))
                .unwrap();
        assert_eq!(rec.priority, Priority::High);

        let rec: Recommendation =
            serde_json::from_value(json!({"priority": "whenever"})).unwrap();
        assert_eq!(rec.priority, Priority::Medium);
    }

    #[test]
    fn test_error_report_shape() {
        let report = Report::error("quantum", "boom");
        assert!(report.is_error());
        assert_eq!(report.executive_summary.main_findings, "Error occurred: boom");
        assert!(report.detailed_analysis.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.metadata.topic, "quantum");
    }

    #[test]
    fn test_analysis_report_stays_aligned() {
        let mut report = AnalysisReport::default();
        report.push(AnalysisResult::failed());
        report.push(AnalysisResult {
            summary: "ok".into(),
            key_points: vec!["a".into(), "b".into()],
            ..Default::default()
        });

        assert_eq!(report.len(), 2);
        assert_eq!(report.sentiments.len(), 2);
        assert_eq!(report.biases.len(), 2);
        assert_eq!(report.all_key_points(), vec!["Analysis failed", "a", "b"]);
    }
}
