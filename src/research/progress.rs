use serde::Serialize;
use std::fmt;

/// Lifecycle of a single research run.
///
/// ```text
/// Idle -> Searching -> Analyzing -> Verifying -> Synthesizing -> Done
///              |
///              +-> EmptyResult
/// any non-terminal state -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Searching,
    Analyzing,
    Verifying,
    Synthesizing,
    Done,
    EmptyResult,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Searching => "searching",
            PipelineState::Analyzing => "analyzing",
            PipelineState::Verifying => "verifying",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Done => "done",
            PipelineState::EmptyResult => "empty_result",
            PipelineState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Done | PipelineState::EmptyResult | PipelineState::Failed
        )
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, Searching)
            | (Searching, Analyzing)
            | (Searching, EmptyResult)
            | (Analyzing, Verifying)
            | (Verifying, Synthesizing)
            | (Synthesizing, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives progress notifications from the coordinator and the agents.
///
/// Both hooks may be called from concurrently running verification tasks,
/// so implementations must be cheap and must not block.
pub trait ProgressObserver: Send + Sync {
    fn on_state_change(&self, _from: PipelineState, _to: PipelineState) {}

    /// `done` of `total` items of `stage` have finished, successfully or not.
    fn on_item_complete(&self, _stage: PipelineState, _done: usize, _total: usize) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Observer that turns notifications into `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_state_change(&self, from: PipelineState, to: PipelineState) {
        tracing::info!(from = %from, to = %to, "Pipeline state changed");
    }

    fn on_item_complete(&self, stage: PipelineState, done: usize, total: usize) {
        tracing::debug!(stage = %stage, done, total, "Item complete");
    }
}
