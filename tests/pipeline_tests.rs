//! End-to-end tests for the research coordinator
//!
//! Every collaborator is mocked: the scripted LLM client answers each
//! pipeline prompt and the document source serves canned articles.

mod common;

use chrono::{Duration, Utc};
use common::mocks::*;
use newsroom::render::ReportRenderer;
use newsroom::research::{PipelineState, ResearchCoordinator};
use newsroom::types::{AnalysisResult, ExecutiveSummary, Priority, Report, Result, TimeRange};
use newsroom::utils::toml_config::PipelineConfig;
use newsroom::{AppError, LLMClient, MarkdownReportWriter};
use std::path::PathBuf;
use std::sync::Arc;

fn coordinator(llm: &Arc<ScriptedLLMClient>, source: MockDocumentSource) -> ResearchCoordinator {
    let llm: Arc<dyn LLMClient> = llm.clone();
    ResearchCoordinator::new(llm, Arc::new(source), &PipelineConfig::default())
}

fn is_document_analysis(prompt: &str) -> bool {
    prompt.contains("Analyze the following article") && !prompt.contains("verify its claims")
}

// ============= Happy Path =============

#[tokio::test]
async fn test_full_run_produces_report() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(5)));

    let outcome = coordinator.research_topic("AI regulation", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(coordinator.state(), PipelineState::Done);
    assert!(!outcome.report.is_error());
    assert!(outcome.report_location.is_none());

    let report = &outcome.report;
    assert_eq!(report.metadata.topic, "AI regulation");
    assert_eq!(report.metadata.article_count, 5);
    assert_eq!(
        report.executive_summary.main_findings,
        "Oversight is tightening across markets."
    );
    assert_eq!(report.detailed_analysis.topic_analysis.main_topics, vec!["regulation", "industry"]);
    assert_eq!(report.recommendations.len(), 2);
    assert_eq!(report.recommendations[0].priority, Priority::High);
    assert_eq!(report.recommendations[1].priority, Priority::Low);

    // rank + 5 analyses + overall + 5 verifications + 3 synthesis calls
    assert_eq!(llm.call_count(), 15);
}

#[tokio::test]
async fn test_topic_is_trimmed() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let source = Arc::new(MockDocumentSource::new(raw_articles(2)));
    let llm_dyn: Arc<dyn LLMClient> = llm.clone();
    let coordinator = ResearchCoordinator::new(llm_dyn, source.clone(), &PipelineConfig::default());

    let outcome = coordinator.research_topic("  climate policy  ", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(outcome.report.metadata.topic, "climate policy");
    assert_eq!(source.queries()[0].topic, "climate policy");
}

#[tokio::test]
async fn test_stage_temperatures() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(3)));

    coordinator.research_topic("semiconductors", None).await;

    let temperature_of = |needle: &str| {
        let calls = llm.calls_matching(needle);
        assert!(!calls.is_empty(), "no call matched {needle}");
        calls[0].temperature
    };

    assert_eq!(temperature_of("Evaluate and rank"), 0.3);
    assert_eq!(temperature_of("Analyze the following article carefully"), 0.3);
    assert_eq!(temperature_of("collection of article analyses"), 0.3);
    assert_eq!(temperature_of("verify its claims"), 0.2);
    assert_eq!(temperature_of("Create an executive summary"), 0.5);
    assert_eq!(temperature_of("detailed analysis report"), 0.5);
    assert_eq!(temperature_of("generate recommendations"), 0.5);
}

#[tokio::test]
async fn test_observer_sees_every_stage() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let observer = Arc::new(RecordingObserver::default());
    let coordinator =
        coordinator(&llm, MockDocumentSource::new(raw_articles(4))).with_observer(observer.clone());

    coordinator.research_topic("shipping", None).await;

    assert_eq!(
        observer.states(),
        vec![
            PipelineState::Searching,
            PipelineState::Analyzing,
            PipelineState::Verifying,
            PipelineState::Synthesizing,
            PipelineState::Done,
        ]
    );
    assert_eq!(
        observer.items_for(PipelineState::Analyzing),
        vec![(1, 4), (2, 4), (3, 4), (4, 4)]
    );
    assert_eq!(observer.items_for(PipelineState::Verifying).len(), 4);
}

// ============= Partial Failures =============

#[tokio::test]
async fn test_failed_analysis_does_not_stop_the_run() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if is_document_analysis(prompt) && prompt_title(prompt) == Some("Article 3") {
            MockReply::Fail("quota exceeded".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(5)));

    let outcome = coordinator.research_topic("energy markets", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert!(!outcome.report.detailed_analysis.is_empty());

    let analysis = outcome.analysis.expect("analysis stage ran");
    assert_eq!(analysis.summaries.len(), 5);
    assert_eq!(analysis.key_points.len(), 5);
    assert_eq!(analysis.sentiments.len(), 5);
    assert_eq!(analysis.topics.len(), 5);
    assert_eq!(analysis.biases.len(), 5);
    assert_eq!(analysis.summaries[3], AnalysisResult::FAILED);
    assert_eq!(analysis.sentiments[3].score, 0.0);
    assert_eq!(analysis.summaries[4], "Summary of Article 4");

    let summary_calls = llm.calls_matching("Create an executive summary");
    assert_eq!(summary_calls.len(), 1);
    assert!(summary_calls[0].prompt.contains(AnalysisResult::FAILED));

    let detailed_calls = llm.calls_matching("detailed analysis report");
    assert!(detailed_calls[0].prompt.contains(AnalysisResult::FAILED));
    assert!(detailed_calls[0].prompt.contains("Summary of Article 4"));
}

#[tokio::test]
async fn test_failed_verification_is_reported_per_document() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if prompt.contains("verify its claims") && prompt_title(prompt) == Some("Article 1") {
            MockReply::Fail("rate limited".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(3)));

    let outcome = coordinator.research_topic("trade", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    let detailed = llm.calls_matching("detailed analysis report");
    assert!(detailed[0].prompt.contains("Article 0 reports a policy change"));
    assert!(!detailed[0].prompt.contains("Article 1 reports a policy change"));
}

#[tokio::test]
async fn test_failed_recommendations_keep_earlier_sections() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if prompt.contains("generate recommendations") {
            MockReply::Fail("connection reset".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(3)));

    let outcome = coordinator.research_topic("fusion", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(
        outcome.report.executive_summary.main_findings,
        "Oversight is tightening across markets."
    );
    assert!(!outcome.report.detailed_analysis.is_empty());
    assert!(outcome.report.recommendations.is_empty());
    assert_eq!(outcome.report.metadata.article_count, 3);
}

#[tokio::test]
async fn test_failed_summary_degrades_only_its_section() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if prompt.contains("Create an executive summary") {
            MockReply::Fail("connection reset".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(5)));

    let outcome = coordinator.research_topic("fusion", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(
        outcome.report.executive_summary.main_findings,
        ExecutiveSummary::FAILED
    );
    assert!(!outcome.report.detailed_analysis.is_empty());
    assert_eq!(outcome.report.recommendations.len(), 2);
    assert_eq!(llm.calls_matching("detailed analysis report").len(), 1);
}

#[tokio::test]
async fn test_failed_detailed_analysis_is_empty() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if prompt.contains("detailed analysis report") {
            MockReply::Fail("connection reset".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(2)));

    let outcome = coordinator.research_topic("fusion", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert!(outcome.report.detailed_analysis.is_empty());
    assert_eq!(
        outcome.report.executive_summary.main_findings,
        "Oversight is tightening across markets."
    );
}

#[tokio::test]
async fn test_synthesis_panic_yields_skeleton() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if prompt.contains("generate recommendations") {
            MockReply::Panic("synthesis exploded".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(4)));

    let outcome = coordinator.research_topic("fusion", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(
        outcome.report.executive_summary.main_findings,
        Report::GENERATION_FAILED
    );
    assert_eq!(outcome.report.metadata.article_count, 4);
    assert!(outcome.report.detailed_analysis.is_empty());
    assert!(outcome.report.recommendations.is_empty());
}

#[tokio::test]
async fn test_malformed_synthesis_section_uses_default() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if prompt.contains("detailed analysis report") {
            MockReply::Text("I could not produce JSON today".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(2)));

    let outcome = coordinator.research_topic("fusion", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert!(outcome.report.detailed_analysis.is_empty());
    assert_eq!(
        outcome.report.executive_summary.main_findings,
        "Oversight is tightening across markets."
    );
    assert_eq!(outcome.report.recommendations.len(), 2);
}

// ============= Empty and Failed Runs =============

#[tokio::test]
async fn test_empty_source_short_circuits() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let observer = Arc::new(RecordingObserver::default());
    let coordinator =
        coordinator(&llm, MockDocumentSource::empty()).with_observer(observer.clone());

    let outcome = coordinator.research_topic("obscure topic", None).await;

    assert_eq!(outcome.state, PipelineState::EmptyResult);
    assert_eq!(outcome.report.error.as_deref(), Some(Report::NO_ARTICLES));
    assert_eq!(outcome.report.metadata.article_count, 0);
    assert!(outcome.analysis.is_none());
    assert_eq!(llm.call_count(), 0);
    assert_eq!(
        observer.states(),
        vec![PipelineState::Searching, PipelineState::EmptyResult]
    );
}

#[tokio::test]
async fn test_unreachable_source_behaves_like_empty() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::failing());

    let outcome = coordinator.research_topic("anything", None).await;

    assert_eq!(outcome.state, PipelineState::EmptyResult);
    assert_eq!(outcome.report.error.as_deref(), Some(Report::NO_ARTICLES));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_empty_topic_fails() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(3)));

    let outcome = coordinator.research_topic("   ", None).await;

    assert_eq!(outcome.state, PipelineState::Failed);
    assert_eq!(coordinator.state(), PipelineState::Failed);
    assert!(outcome.report.executive_summary.main_findings.starts_with("Error occurred:"));
    assert!(outcome.report.is_error());
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_inverted_time_range_fails() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(3)));
    let now = Utc::now();

    let outcome = coordinator
        .research_topic("elections", Some(TimeRange::new(now, now - Duration::days(2))))
        .await;

    assert_eq!(outcome.state, PipelineState::Failed);
    assert!(outcome.report.error.unwrap_or_default().contains("Time range"));
}

#[tokio::test]
async fn test_panicking_stage_is_contained() {
    let llm = Arc::new(ScriptedLLMClient::new(|prompt| {
        if is_document_analysis(prompt) {
            MockReply::Panic("analysis exploded".to_string())
        } else {
            pipeline_reply(prompt)
        }
    }));
    let observer = Arc::new(RecordingObserver::default());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(2)))
        .with_observer(observer.clone());

    let outcome = coordinator.research_topic("robotics", None).await;

    assert_eq!(outcome.state, PipelineState::Failed);
    let error = outcome.report.error.unwrap_or_default();
    assert!(error.contains("Stage panicked"));
    assert!(error.contains("analysis exploded"));
    assert_eq!(observer.states().last(), Some(&PipelineState::Failed));
}

#[tokio::test]
async fn test_coordinator_can_run_again_after_failure() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(2)));

    let first = coordinator.research_topic("", None).await;
    assert_eq!(first.state, PipelineState::Failed);

    let second = coordinator.research_topic("batteries", None).await;
    assert_eq!(second.state, PipelineState::Done);
    assert_eq!(coordinator.state(), PipelineState::Done);
}

// ============= Rendering =============

struct BrokenRenderer;

impl ReportRenderer for BrokenRenderer {
    fn render(&self, _report: &Report, _topic: &str) -> Result<PathBuf> {
        Err(AppError::Internal("disk full".to_string()))
    }
}

#[tokio::test]
async fn test_report_is_written_by_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(2)))
        .with_renderer(Arc::new(MarkdownReportWriter::new(dir.path().join("reports"))));

    let outcome = coordinator.research_topic("Quantum Computing", None).await;

    let location = outcome.report_location.expect("report should be saved");
    assert!(location.starts_with(dir.path().join("reports")));
    let file_name = location.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("Quantum_Computing_"));
    assert!(file_name.ends_with(".md"));

    let markdown = std::fs::read_to_string(&location).unwrap();
    assert!(markdown.contains("Oversight is tightening across markets."));
}

#[tokio::test]
async fn test_render_failure_keeps_report() {
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::new(raw_articles(2)))
        .with_renderer(Arc::new(BrokenRenderer));

    let outcome = coordinator.research_topic("ports", None).await;

    assert_eq!(outcome.state, PipelineState::Done);
    assert!(outcome.report_location.is_none());
    assert!(!outcome.report.is_error());
}

#[tokio::test]
async fn test_empty_run_is_not_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(ScriptedLLMClient::pipeline());
    let coordinator = coordinator(&llm, MockDocumentSource::empty())
        .with_renderer(Arc::new(MarkdownReportWriter::new(dir.path())));

    let outcome = coordinator.research_topic("nothing", None).await;

    assert!(outcome.report_location.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
