//! Structured response parsing
//!
//! Model output is supposed to be pure JSON but routinely arrives wrapped in
//! Markdown code fences or padded with whitespace. This module is the single
//! place where that text is turned into typed values, and the single place
//! where a bad payload is replaced by a caller-supplied default.

use crate::types::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

const LOG_PREVIEW_CHARS: usize = 200;

/// Strip code-fence wrapping and surrounding whitespace.
///
/// Fails with [`AppError::MalformedResponse`] unless what remains starts
/// with `{` or `[`.
pub fn clean_json_response(raw: &str) -> Result<&str> {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.trim_start();
        text = strip_prefix_ignore_case(rest, "json").unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();

    if !text.starts_with('{') && !text.starts_with('[') {
        return Err(AppError::MalformedResponse(
            "Response is not a JSON object or array".to_string(),
        ));
    }

    Ok(text)
}

/// Clean and decode an untyped JSON value.
pub fn parse_json(raw: &str) -> Result<Value> {
    let cleaned = clean_json_response(raw)?;
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::MalformedResponse(format!("Invalid JSON: {}", e)))
}

/// Clean, decode and validate against `T`.
///
/// Undecodable text is a [`AppError::MalformedResponse`]; valid JSON of the
/// wrong shape is a [`AppError::Validation`].
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value = parse_json(raw)?;
    serde_json::from_value(value).map_err(|e| AppError::Validation(e.to_string()))
}

/// Parse `raw` into `T`, or return `default` when a default is supplied.
///
/// Without a default, the parse error propagates.
pub fn parse_response<T: DeserializeOwned>(raw: &str, default: Option<T>) -> Result<T> {
    match default {
        Some(default) => Ok(parse_or(raw, default)),
        None => parse_structured(raw),
    }
}

/// Parse `raw` into `T`, substituting `default` on any failure.
pub fn parse_or<T: DeserializeOwned>(raw: &str, default: T) -> T {
    parse_structured(raw).unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            response = %preview(raw),
            "Failed to parse structured LLM response, using default"
        );
        default
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn preview(raw: &str) -> String {
    let mut preview: String = raw.chars().take(LOG_PREVIEW_CHARS).collect();
    if raw.chars().count() > LOG_PREVIEW_CHARS {
        preview.push('…');
    }
    preview
}
