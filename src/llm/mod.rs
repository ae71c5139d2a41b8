//! LLM Provider Clients and Structured Responses
//!
//! This module provides the single interface the agents use to talk to a
//! Large Language Model, plus the parser that turns model text into typed
//! values.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait every provider implements
//! - [`Provider`] - Runtime provider selection (OpenAI or Ollama)
//! - [`LLMClientFactory`] - Creates clients from `newsroom.toml`
//! - [`parser`] - Fence stripping, JSON decoding and default substitution
//!
//! # Example
//!
//! ```ignore
//! use newsroom::llm::{LLMClientFactory, parser};
//!
//! let factory = LLMClientFactory::from_config(&config)?;
//! let client = factory.create_default()?;
//!
//! let raw = client.generate_json("You are terse.", "Return {\"ok\": true}", 0.2).await?;
//! let value = parser::parse_json(&raw)?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// OpenAI-compatible chat-completions adapter.
pub mod openai;
/// Structured response parsing with default substitution.
pub mod parser;

pub use client::{LLMClient, LLMClientFactory, Provider};
pub use openai::OpenAIClient;
