//! Research pipeline coordination
//!
//! [`coordinator::ResearchCoordinator`] turns a topic into a
//! [`Report`](crate::types::Report) by running the agents strictly in
//! sequence, each stage seeing only the complete output of the previous one.
//!
//! # Usage
//!
//! ```ignore
//! use newsroom::research::{ResearchCoordinator, TracingObserver};
//! use std::sync::Arc;
//!
//! let coordinator = ResearchCoordinator::from_config(&config)?
//!     .with_observer(Arc::new(TracingObserver));
//!
//! let outcome = coordinator.research_topic("grid-scale storage", None).await;
//! println!("{}", outcome.report.executive_summary.main_findings);
//! if let Some(path) = outcome.report_location {
//!     println!("saved to {}", path.display());
//! }
//! ```
//!
//! # Research Workflow
//!
//! 1. **Search** - fetch candidates and rank them against the topic
//! 2. **Analysis** - per-document analysis, then one aggregate pass
//! 3. **Verification** - claim checking with bounded concurrency
//! 4. **Synthesis** - executive summary, detailed analysis, recommendations
//! 5. **Rendering** - hand the report to the configured renderer

/// Pipeline sequencing and failure containment.
pub mod coordinator;
/// Pipeline states and progress observers.
pub mod progress;

pub use coordinator::{ResearchCoordinator, ResearchOutcome};
pub use progress::{NoopObserver, PipelineState, ProgressObserver, TracingObserver};
