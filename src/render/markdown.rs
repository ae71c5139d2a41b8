use super::ReportRenderer;
use crate::types::{Report, Result};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `<dir>/<clean_topic>_<YYYY-MM-DD_HHMMSS>.md`, creating `dir` as needed.
#[derive(Debug, Clone)]
pub struct MarkdownReportWriter {
    dir: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportRenderer for MarkdownReportWriter {
    fn render(&self, report: &Report, topic: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(report_file_name(topic, Local::now()));
        fs::write(&path, render_markdown(report, topic))?;

        tracing::info!(path = %path.display(), "Report written");
        Ok(path)
    }
}

const FALLBACK_FILE_STEM: &str = "report";

/// Reduce a topic to characters safe in a file name.
///
/// Keeps alphanumerics, spaces, `-` and `_`, trims, then turns spaces into `_`.
pub fn clean_topic(topic: &str) -> String {
    topic
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// `<topic>_<timestamp>.md`, with `report` standing in for a topic that
/// cleans down to nothing.
pub fn report_file_name(topic: &str, at: DateTime<Local>) -> String {
    let mut name = clean_topic(topic);
    if name.is_empty() {
        name.push_str(FALLBACK_FILE_STEM);
    }
    format!("{}_{}.md", name, at.format("%Y-%m-%d_%H%M%S"))
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Render a report as Markdown.
pub fn render_markdown(report: &Report, topic: &str) -> String {
    let generated = report.metadata.timestamp.with_timezone(&Local);
    let summary = &report.executive_summary;
    let detailed = &report.detailed_analysis;
    let mut out = String::new();

    let _ = writeln!(out, "# Research Report: {}", topic);
    let _ = writeln!(out, "Generated on: {}", generated.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "\n## Executive Summary\n{}", summary.main_findings);

    out.push_str("\n## Key Trends\n");
    bullets(&mut out, &summary.key_trends);

    out.push_str("\n## Critical Insights\n");
    bullets(&mut out, &summary.critical_insights);

    out.push_str("\n## Reliability Assessment\n");
    out.push_str(or_placeholder(
        &summary.reliability_assessment,
        "No reliability assessment available.",
    ));
    out.push_str("\n\n## Detailed Analysis\n");

    let topics = &detailed.topic_analysis;
    out.push_str("\n### Topic Analysis\n");
    out.push_str("\n#### Main Topics\n");
    bullets(&mut out, &topics.main_topics);
    out.push_str("\n#### Topic Relationships\n");
    bullets(&mut out, &topics.topic_relationships);
    out.push_str("\n#### Emerging Themes\n");
    bullets(&mut out, &topics.emerging_themes);

    let sources = &detailed.source_analysis;
    out.push_str("\n### Source Analysis\n");
    let _ = writeln!(
        out,
        "\n**Source Distribution**: {}",
        or_placeholder(&sources.source_distribution, "Not available")
    );
    let _ = writeln!(
        out,
        "\n**Credibility Assessment**: {}",
        or_placeholder(&sources.credibility_assessment, "Not available")
    );
    out.push_str("\n#### Potential Biases\n");
    bullets(&mut out, &sources.potential_biases);

    let narratives = &detailed.narrative_analysis;
    out.push_str("\n### Narrative Analysis\n");
    out.push_str("\n#### Main Narratives\n");
    bullets(&mut out, &narratives.main_narratives);
    out.push_str("\n#### Competing Viewpoints\n");
    bullets(&mut out, &narratives.competing_viewpoints);
    out.push_str("\n#### Supporting Evidence\n");
    bullets(&mut out, &narratives.supporting_evidence);

    let facts = &detailed.fact_check_summary;
    out.push_str("\n### Fact Check Summary\n");
    out.push_str("\n#### Verified Claims\n");
    bullets(&mut out, &facts.verified_claims);
    out.push_str("\n#### Disputed Claims\n");
    bullets(&mut out, &facts.disputed_claims);
    out.push_str("\n#### Unverified Claims\n");
    bullets(&mut out, &facts.unverified_claims);

    out.push_str("\n## Recommendations\n");
    for rec in &report.recommendations {
        let _ = writeln!(out, "\n### {} Priority", rec.priority.as_str());
        let _ = writeln!(out, "**Recommendation**: {}\n", rec.recommendation);
        let _ = writeln!(out, "**Rationale**: {}", rec.rationale);
        if !rec.suggested_actions.is_empty() {
            out.push_str("\n**Suggested Actions**:\n");
            bullets(&mut out, &rec.suggested_actions);
        }
    }

    out
}
