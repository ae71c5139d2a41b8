//! CLI module for newsroom
//!
//! Provides command-line interface parsing for the `newsroom` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::types::TimeRange;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// newsroom - multi-agent news research
///
/// Searches recent news for a topic, analyzes and fact-checks the articles
/// with an LLM, and writes a structured Markdown report.
#[derive(Parser, Debug)]
#[command(
    name = "newsroom",
    version,
    about = "newsroom - multi-agent news research",
    long_about = "Searches recent news for a topic, ranks and analyzes the articles,\n\
                  verifies their claims, and synthesizes a structured report.\n\n\
                  Requires OPENAI_API_KEY (unless using Ollama) and NEWS_API_KEY.",
    after_help = "EXAMPLES:\n    \
                  newsroom research \"AI ethics\"                      # Last 7 days\n    \
                  newsroom research \"chip exports\" --from 2026-10-01  # Explicit window\n    \
                  newsroom research fusion --concurrency 5 --json     # Print report JSON\n    \
                  newsroom config --validate                          # Check config and keys"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "newsroom.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a topic and write a report
    Research {
        /// Topic to research
        topic: String,

        /// Start of the publication window (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// End of the publication window, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Maximum number of articles to analyze
        #[arg(long)]
        max_articles: Option<usize>,

        /// Simultaneous verification calls
        #[arg(long)]
        concurrency: Option<usize>,

        /// Directory for the Markdown report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not write a report file
        #[arg(long)]
        no_save: bool,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration and required environment variables
        #[arg(long)]
        validate: bool,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", value, e))
}

/// Build the search window from optional CLI dates.
///
/// No dates means "use the configured lookback". A lone `--from` runs until
/// `now`; a lone `--to` reaches `lookback_days` back from the end of that day.
pub fn resolve_time_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    lookback_days: i64,
    now: DateTime<Utc>,
) -> Result<Option<TimeRange>, String> {
    let start_of = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc();
    let end_of = |date: NaiveDate| start_of(date) + Duration::days(1) - Duration::seconds(1);

    let range = match (from, to) {
        (None, None) => return Ok(None),
        (Some(from), None) => TimeRange::new(start_of(from), now),
        (None, Some(to)) => TimeRange::days_before(end_of(to), lookback_days),
        (Some(from), Some(to)) => TimeRange::new(start_of(from), end_of(to)),
    };

    if range.start > range.end {
        return Err(format!(
            "--from ({}) must not be after --to ({})",
            range.start.date_naive(),
            range.end.date_naive()
        ));
    }
    Ok(Some(range))
}
