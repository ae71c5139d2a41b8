//! Report rendering and persistence
//!
//! The coordinator hands a finished [`Report`] to a [`ReportRenderer`] and
//! records whatever location it returns. The built-in renderer writes a
//! Markdown file per run.

/// Markdown rendering and the file writer.
pub mod markdown;

use crate::types::{Report, Result};
use std::path::PathBuf;

pub use markdown::{clean_topic, render_markdown, report_file_name, MarkdownReportWriter};

/// Persists a report and returns where it went
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &Report, topic: &str) -> Result<PathBuf>;
}
