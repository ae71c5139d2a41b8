//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the newsroom CLI, plus
//! a [`ProgressObserver`] that reports pipeline progress on the terminal.

use crate::research::progress::{PipelineState, ProgressObserver};
use crate::types::Report;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Success => "OK",
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Output style configuration
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Plain ASCII markers, for pipes and `--no-color`
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        self.status(Level::Success, message);
    }

    pub fn info(&self, message: &str) {
        self.status(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.status(Level::Warning, message);
    }

    /// Print an error message (stderr)
    pub fn error(&self, message: &str) {
        self.status(Level::Error, message);
    }

    fn status(&self, level: Level, message: &str) {
        let line = if self.colored {
            match level {
                Level::Success => format!("  {} {}", "✓".green().bold(), message.green()),
                Level::Info => format!("  {} {}", "•".blue(), message),
                Level::Warning => format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
                Level::Error => format!("  {} {}", "✗".red().bold(), message.red()),
            }
        } else {
            format!("  [{}] {}", level.tag(), message)
        };

        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// `[n/total] message` progress line
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        if self.colored {
            println!(
                "  {} {}",
                format!("[{}/{}]", step_num, total).dimmed(),
                message.bright_white()
            );
        } else {
            println!("  [{}/{}] {}", step_num, total, message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// `key: value`, indented under the current section
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Dimmed tip shown after a command's main output
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print the headline sections of a report
    pub fn report_summary(&self, report: &Report) {
        let summary = &report.executive_summary;

        self.header(&format!("Research Report: {}", report.metadata.topic));
        self.kv("Articles", &report.metadata.article_count.to_string());
        self.kv(
            "Generated",
            &report.metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );

        self.subheader("Executive Summary");
        println!("    {}", summary.main_findings);

        if !summary.key_trends.is_empty() {
            self.subheader("Key Trends");
            for trend in &summary.key_trends {
                self.list_item(trend);
            }
        }

        if !report.recommendations.is_empty() {
            self.subheader("Recommendations");
            for rec in &report.recommendations {
                self.list_item(&format!("[{}] {}", rec.priority.as_str(), rec.recommendation));
            }
        }
    }
}

/// Pipeline stages as numbered steps, plus per-item counters.
pub struct TerminalObserver {
    output: Output,
}

impl TerminalObserver {
    const STAGES: u32 = 4;

    pub fn new(output: Output) -> Self {
        Self { output }
    }

    fn stage_label(state: PipelineState) -> Option<(u32, &'static str)> {
        match state {
            PipelineState::Searching => Some((1, "Searching for articles")),
            PipelineState::Analyzing => Some((2, "Analyzing articles")),
            PipelineState::Verifying => Some((3, "Verifying claims")),
            PipelineState::Synthesizing => Some((4, "Generating final report")),
            _ => None,
        }
    }
}

impl ProgressObserver for TerminalObserver {
    fn on_state_change(&self, _from: PipelineState, to: PipelineState) {
        match to {
            PipelineState::Done => self.output.success("Research complete"),
            PipelineState::EmptyResult => self.output.warning("No articles found"),
            PipelineState::Failed => self.output.error("Research failed"),
            other => {
                if let Some((step, label)) = Self::stage_label(other) {
                    self.output.step(step, Self::STAGES, label);
                }
            }
        }
    }

    fn on_item_complete(&self, stage: PipelineState, done: usize, total: usize) {
        let verb = match stage {
            PipelineState::Analyzing => "analyzed",
            PipelineState::Verifying => "verified",
            _ => "processed",
        };
        self.output.info(&format!("{} {}/{}", verb, done, total));
    }
}
