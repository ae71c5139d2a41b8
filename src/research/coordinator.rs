use crate::agents::{AnalysisAgent, SearchAgent, SynthesisAgent, VerificationAgent};
use crate::llm::{LLMClient, LLMClientFactory};
use crate::render::{MarkdownReportWriter, ReportRenderer};
use crate::research::progress::{NoopObserver, PipelineState, ProgressObserver};
use crate::sources::{DocumentSource, NewsApiSource};
use crate::types::{AnalysisReport, AppError, Document, Report, Result, TimeRange};
use crate::utils::toml_config::{NewsroomConfig, PipelineConfig};
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Result of one research run
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub report: Report,
    /// Per-document analysis, present once the analysis stage has run
    pub analysis: Option<AnalysisReport>,
    /// Terminal state the run ended in
    pub state: PipelineState,
    /// Where the renderer stored the report, if one ran and succeeded
    pub report_location: Option<PathBuf>,
}

/// Runs search, analysis, verification and synthesis in sequence.
///
/// A coordinator drives one run at a time; its [`state`](Self::state)
/// reflects the most recent run.
pub struct ResearchCoordinator {
    search: SearchAgent,
    analysis: AnalysisAgent,
    verification: VerificationAgent,
    synthesis: SynthesisAgent,
    renderer: Option<Arc<dyn ReportRenderer>>,
    observer: Arc<dyn ProgressObserver>,
    state: Mutex<PipelineState>,
}

impl ResearchCoordinator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        source: Arc<dyn DocumentSource>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            search: SearchAgent::new(Arc::clone(&llm), source, pipeline),
            analysis: AnalysisAgent::new(Arc::clone(&llm), pipeline),
            verification: VerificationAgent::new(Arc::clone(&llm), pipeline),
            synthesis: SynthesisAgent::new(llm, pipeline),
            renderer: None,
            observer: Arc::new(NoopObserver),
            state: Mutex::new(PipelineState::Idle),
        }
    }

    /// Wire up the configured LLM provider, NewsAPI and the Markdown writer.
    pub fn from_config(config: &NewsroomConfig) -> Result<Self> {
        let llm = LLMClientFactory::from_config(config)?.create_default()?;
        let source: Arc<dyn DocumentSource> = Arc::new(NewsApiSource::from_config(config)?);

        let mut coordinator = Self::new(llm, source, &config.pipeline);
        coordinator.search = coordinator
            .search
            .with_query_options(config.news.language.clone(), config.news.sort_by.clone());

        Ok(coordinator.with_renderer(Arc::new(MarkdownReportWriter::new(
            config.output.dir.clone(),
        ))))
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.analysis = self.analysis.with_observer(Arc::clone(&observer));
        self.verification = self.verification.with_observer(Arc::clone(&observer));
        self.observer = observer;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ReportRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Keep reports in memory only
    pub fn without_renderer(mut self) -> Self {
        self.renderer = None;
        self
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// Research `topic` end to end.
    ///
    /// Never fails: every error, including a panic inside a stage, becomes
    /// an error-shaped report with state [`PipelineState::Failed`].
    pub async fn research_topic(&self, topic: &str, range: Option<TimeRange>) -> ResearchOutcome {
        *self.state.lock() = PipelineState::Idle;

        let span = tracing::info_span!("research", run_id = %Uuid::new_v4(), topic);
        async move {
            tracing::info!("Starting research");

            let outcome = match AssertUnwindSafe(self.run(topic, range)).catch_unwind().await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => self.fail(topic, e.to_string()),
                Err(panic) => self.fail(topic, panic_message(panic.as_ref())),
            };

            tracing::info!(state = %outcome.state, "Research finished");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, topic: &str, range: Option<TimeRange>) -> Result<ResearchOutcome> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::Validation("Topic must not be empty".to_string()));
        }
        if let Some(range) = &range {
            if range.start > range.end {
                return Err(AppError::Validation(format!(
                    "Time range starts after it ends ({} > {})",
                    range.start, range.end
                )));
            }
        }

        self.transition(PipelineState::Searching);
        let ranked = self.search.search(topic, range).await;
        if ranked.is_empty() {
            self.transition(PipelineState::EmptyResult);
            tracing::warn!("No articles found");
            return Ok(ResearchOutcome {
                report: Report::no_articles(topic),
                analysis: None,
                state: PipelineState::EmptyResult,
                report_location: None,
            });
        }
        tracing::info!(articles = ranked.len(), "Search complete");
        let documents: Vec<Document> = ranked.into_iter().map(|r| r.document).collect();

        self.transition(PipelineState::Analyzing);
        let analysis = self.analysis.analyze(&documents).await;
        tracing::info!(analyzed = analysis.len(), "Analysis complete");

        self.transition(PipelineState::Verifying);
        let verification = self.verification.verify(&documents).await;
        tracing::info!(verified = verification.len(), "Verification complete");

        self.transition(PipelineState::Synthesizing);
        let report = self
            .synthesis
            .synthesize(topic, &documents, &analysis, &verification)
            .await;

        self.transition(PipelineState::Done);
        let report_location = self.render(&report, topic);

        Ok(ResearchOutcome {
            report,
            analysis: Some(analysis),
            state: PipelineState::Done,
            report_location,
        })
    }

    fn render(&self, report: &Report, topic: &str) -> Option<PathBuf> {
        let renderer = self.renderer.as_ref()?;
        match renderer.render(report, topic) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to render report");
                None
            }
        }
    }

    fn fail(&self, topic: &str, message: String) -> ResearchOutcome {
        tracing::error!(error = %message, "Research failed");
        if !self.state().is_terminal() {
            self.transition(PipelineState::Failed);
        }
        ResearchOutcome {
            report: Report::error(topic, message),
            analysis: None,
            state: PipelineState::Failed,
            report_location: None,
        }
    }

    fn transition(&self, to: PipelineState) {
        let from = std::mem::replace(&mut *self.state.lock(), to);
        debug_assert!(from.can_transition_to(to), "invalid transition {from} -> {to}");
        tracing::debug!(from = %from, to = %to, "State transition");
        self.observer.on_state_change(from, to);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("Stage panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("Stage panicked: {}", message)
    } else {
        "Stage panicked".to_string()
    }
}
