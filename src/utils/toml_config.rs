//! TOML-based configuration for newsroom
//!
//! Everything the pipeline needs at construction time (provider endpoints,
//! per-role temperatures, article and concurrency limits, output location)
//! is declared in `newsroom.toml`. Secrets are never stored in the file:
//! the config names environment variables, which are resolved on demand
//! (a `.env` file is honoured via `dotenvy`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure loaded from newsroom.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsroomConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

// ============= General Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: LlmProviderKind,

    #[serde(default = "default_openai_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable containing the API key (unused for ollama)
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Deadline for a single chat-completion call
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> LlmProviderKind {
    LlmProviderKind::OpenAI
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_base: default_openai_base(),
            model: default_model(),
            api_key_env: default_llm_key_env(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= News Source Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_base")]
    pub api_base: String,

    #[serde(default = "default_news_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

fn default_news_base() -> String {
    "https://newsapi.org".to_string()
}

fn default_news_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_sort_by() -> String {
    "relevancy".to_string()
}

/// Upper bound on the default search window, roughly ten years.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

fn default_lookback_days() -> i64 {
    7
}

fn default_news_timeout() -> u64 {
    30
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_base: default_news_base(),
            api_key_env: default_news_key_env(),
            language: default_language(),
            sort_by: default_sort_by(),
            timeout_secs: default_news_timeout(),
        }
    }
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= Pipeline Configuration =============

/// Limits and sampling settings handed to every agent at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on documents returned by the search stage
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,

    /// Simultaneous verification calls
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Window used when a search has no explicit time range
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    #[serde(default)]
    pub temperatures: TemperatureTable,
}

fn default_max_articles() -> usize {
    10
}

fn default_max_concurrency() -> usize {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_articles: default_max_articles(),
            max_concurrency: default_max_concurrency(),
            lookback_days: default_lookback_days(),
            temperatures: TemperatureTable::default(),
        }
    }
}

/// Default sampling temperature per agent role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureTable {
    #[serde(default = "default_search_temperature")]
    pub search: f32,
    #[serde(default = "default_analysis_temperature")]
    pub analysis: f32,
    #[serde(default = "default_fact_check_temperature")]
    pub fact_check: f32,
    #[serde(default = "default_report_temperature")]
    pub report: f32,
}

fn default_search_temperature() -> f32 {
    0.3
}

fn default_analysis_temperature() -> f32 {
    0.4
}

fn default_fact_check_temperature() -> f32 {
    0.2
}

fn default_report_temperature() -> f32 {
    0.5
}

impl Default for TemperatureTable {
    fn default() -> Self {
        Self {
            search: default_search_temperature(),
            analysis: default_analysis_temperature(),
            fact_check: default_fact_check_temperature(),
            report: default_report_temperature(),
        }
    }
}

impl TemperatureTable {
    fn entries(&self) -> [(&'static str, f32); 4] {
        [
            ("search", self.search),
            ("analysis", self.analysis),
            ("fact_check", self.fact_check),
            ("report", self.report),
        ]
    }
}

// ============= Output Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl NewsroomConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: NewsroomConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(path)) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// Check value ranges. Secrets are checked separately by [`Self::validate_env`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_articles == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_articles must be at least 1".to_string(),
            ));
        }

        if self.pipeline.max_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_concurrency must be at least 1".to_string(),
            ));
        }

        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.pipeline.lookback_days) {
            return Err(ConfigError::ValidationError(format!(
                "pipeline.lookback_days must be within [1, {}], got {}",
                MAX_LOOKBACK_DAYS, self.pipeline.lookback_days
            )));
        }

        for (role, temperature) in self.pipeline.temperatures.entries() {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "temperature for '{}' must be within [0, 2], got {}",
                    role, temperature
                )));
            }
        }

        if self.llm.timeout_secs == 0 || self.news.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Make sure every secret the configured providers need is present
    pub fn validate_env(&self) -> Result<(), ConfigError> {
        if self.llm.provider == LlmProviderKind::OpenAI {
            self.llm_api_key()?;
        }
        self.news_api_key()?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        dotenvy::var(env_name).ok().filter(|v| !v.trim().is_empty())
    }

    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.llm.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }

    pub fn news_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.news.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.news.api_key_env.clone()))
    }
}
