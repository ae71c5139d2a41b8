//! # newsroom - multi-agent news research
//!
//! Turns a research topic into a structured, cross-verified report by
//! delegating sub-tasks to specialized agents, each of which talks to an
//! LLM in JSON mode and parses a constrained response.
//!
//! ## Overview
//!
//! newsroom can be used in two ways:
//!
//! 1. **As a command-line tool** - Run the `newsroom` binary
//! 2. **As a library** - Embed the pipeline in your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use newsroom::{NewsroomConfig, ResearchCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NewsroomConfig::load_or_default("newsroom.toml")?;
//!     let coordinator = ResearchCoordinator::from_config(&config)?;
//!
//!     let outcome = coordinator.research_topic("Artificial Intelligence Ethics", None).await;
//!     println!("{}", outcome.report.executive_summary.main_findings);
//!     Ok(())
//! }
//! ```
//!
//! ### Custom Collaborators
//!
//! ```rust,ignore
//! use newsroom::{DocumentSource, LLMClient, ResearchCoordinator};
//! use std::sync::Arc;
//!
//! let coordinator = ResearchCoordinator::new(my_llm, Arc::new(MyArchive::new()), &config.pipeline)
//!     .with_renderer(Arc::new(MyRenderer));
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Search, analysis, verification and synthesis agents
//! - [`llm`] - LLM client, OpenAI-compatible adapter and response parser
//! - [`research`] - Pipeline coordinator, states and progress observers
//! - [`sources`] - Document source trait and NewsAPI client
//! - [`render`] - Report renderers (Markdown)
//! - [`types`] - Data model and error handling
//! - [`utils`] - Configuration and lenient deserializers
//! - [`cli`] - Command-line parsing and terminal output

#![warn(rustdoc::missing_crate_level_docs)]

/// Pipeline agents.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and structured responses.
pub mod llm;
/// Report rendering and persistence.
pub mod render;
/// Research pipeline coordination.
pub mod research;
/// External document sources.
pub mod sources;
/// Core data model and errors.
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, LLMClientFactory, Provider};
pub use render::{MarkdownReportWriter, ReportRenderer};
pub use research::{PipelineState, ProgressObserver, ResearchCoordinator, ResearchOutcome};
pub use sources::{DocumentSource, NewsApiSource};
pub use types::{AppError, Report, Result};
pub use utils::toml_config::NewsroomConfig;
