//! Research pipeline agents
//!
//! Each stage of a research run is handled by one agent. Agents share a
//! [`BaseAgent`], which owns the LLM client, the role's system prompt and
//! its default sampling temperature, and which routes every model reply
//! through [`crate::llm::parser`].
//!
//! - [`search::SearchAgent`] - fetches candidate documents and ranks them
//! - [`analysis::AnalysisAgent`] - per-document analysis plus one aggregate pass
//! - [`verification::VerificationAgent`] - bounded-concurrency claim checking
//! - [`synthesis::SynthesisAgent`] - executive summary, detailed analysis, recommendations

pub mod analysis;
pub mod search;
pub mod synthesis;
pub mod verification;

use crate::llm::{parser, LLMClient};
use crate::types::Result;
use crate::utils::toml_config::TemperatureTable;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

pub use analysis::AnalysisAgent;
pub use search::SearchAgent;
pub use synthesis::SynthesisAgent;
pub use verification::VerificationAgent;

/// The four roles in a research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Search,
    Analysis,
    FactCheck,
    Report,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Search => "search",
            AgentRole::Analysis => "analysis",
            AgentRole::FactCheck => "fact_check",
            AgentRole::Report => "report",
        }
    }

    /// Default sampling temperature for this role
    pub fn temperature(&self, table: &TemperatureTable) -> f32 {
        match self {
            AgentRole::Search => table.search,
            AgentRole::Analysis => table.analysis,
            AgentRole::FactCheck => table.fact_check,
            AgentRole::Report => table.report,
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentRole::Search => {
                r#"You are a Search Agent specialized in finding and filtering news articles.
Your task is to:
1. Evaluate the relevance of articles to the given topic
2. Filter out low-quality or irrelevant content
3. Ensure diverse source selection
4. Rank articles by importance and credibility"#
            }
            AgentRole::Analysis => {
                r#"You are an Analysis Agent specialized in processing news content.
Your tasks include:
1. Summarizing article content
2. Extracting key points and insights
3. Analyzing sentiment and tone
4. Identifying main topics and themes
5. Detecting potential biases"#
            }
            AgentRole::FactCheck => {
                r#"You are a Fact-Checking Agent specialized in verification.
Your tasks include:
1. Cross-referencing facts across multiple sources
2. Evaluating source credibility
3. Identifying potential misinformation
4. Verifying claims against trusted sources"#
            }
            AgentRole::Report => {
                r#"You are a Report Generation Agent specialized in creating comprehensive news summaries.
Your tasks include:
1. Organizing information in a clear structure
2. Highlighting key findings and insights
3. Creating executive summaries
4. Identifying trends and patterns
5. Formatting information for easy consumption"#
            }
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM access shared by every agent.
///
/// Cloning is cheap: the client is behind an `Arc`.
#[derive(Clone)]
pub struct BaseAgent {
    llm: Arc<dyn LLMClient>,
    role: AgentRole,
    system_prompt: String,
    temperature: f32,
}

impl BaseAgent {
    pub fn new(llm: Arc<dyn LLMClient>, role: AgentRole, temperatures: &TemperatureTable) -> Self {
        Self {
            llm,
            role,
            system_prompt: role.system_prompt().to_string(),
            temperature: role.temperature(temperatures),
        }
    }

    /// Issue one JSON-mode call and return the raw text.
    pub async fn call(&self, prompt: &str, temperature: Option<f32>) -> Result<String> {
        let temperature = temperature.unwrap_or(self.temperature);
        tracing::debug!(
            role = %self.role,
            model = self.llm.model_name(),
            temperature,
            prompt_bytes = prompt.len(),
            "Calling LLM"
        );
        self.llm
            .generate_json(&self.system_prompt, prompt, temperature)
            .await
    }

    /// Call the model and decode its reply into `T`.
    ///
    /// Transport failures propagate; an unparseable reply yields `default`.
    pub async fn structured<T: DeserializeOwned>(
        &self,
        prompt: &str,
        temperature: Option<f32>,
        default: T,
    ) -> Result<T> {
        let raw = self.call(prompt, temperature).await?;
        Ok(parser::parse_or(&raw, default))
    }
}

/// Pretty JSON for embedding in prompts.
pub(crate) fn to_prompt_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}
