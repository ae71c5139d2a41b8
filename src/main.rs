use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use newsroom::cli::output::{Output, TerminalObserver};
use newsroom::cli::{resolve_time_range, Cli, Commands};
use newsroom::research::{PipelineState, ResearchCoordinator};
use newsroom::utils::toml_config::NewsroomConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_level: &str, verbose: bool, json: bool) {
    let default_directive = if verbose {
        "newsroom=debug,info".to_string()
    } else {
        format!("newsroom={},warn", log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = NewsroomConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.general.log_level, cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Research {
            topic,
            from,
            to,
            max_articles,
            concurrency,
            output: output_dir,
            no_save,
            json,
        } => {
            let overrides = ResearchOverrides {
                max_articles,
                concurrency,
                output_dir,
            };
            let range = resolve_time_range(from, to, config.pipeline.lookback_days, Utc::now())
                .map_err(anyhow::Error::msg)?;
            run_research(config, overrides, &topic, range, no_save, json, output).await
        }
        Commands::Config { full, validate } => show_config(&cli.config, &config, full, validate, output),
    }
}

struct ResearchOverrides {
    max_articles: Option<usize>,
    concurrency: Option<usize>,
    output_dir: Option<PathBuf>,
}

async fn run_research(
    mut config: NewsroomConfig,
    overrides: ResearchOverrides,
    topic: &str,
    range: Option<newsroom::types::TimeRange>,
    no_save: bool,
    json: bool,
    output: Output,
) -> Result<ExitCode> {
    if let Some(max_articles) = overrides.max_articles {
        config.pipeline.max_articles = max_articles;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.pipeline.max_concurrency = concurrency;
    }
    if let Some(dir) = overrides.output_dir {
        config.output.dir = dir;
    }
    config.validate().context("Invalid settings")?;
    config
        .validate_env()
        .context("Missing API credentials (set them in the environment or .env)")?;

    let mut coordinator = ResearchCoordinator::from_config(&config)
        .context("Failed to initialize research pipeline")?;
    if !json {
        coordinator = coordinator.with_observer(Arc::new(TerminalObserver::new(output)));
    }
    if no_save {
        coordinator = coordinator.without_renderer();
    }

    let outcome = coordinator.research_topic(topic, range).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.report).context("Failed to encode report")?
        );
    } else {
        output.report_summary(&outcome.report);
        if let Some(path) = &outcome.report_location {
            output.success(&format!("Report saved to: {}", path.display()));
        }
    }

    Ok(match outcome.state {
        PipelineState::Done => ExitCode::SUCCESS,
        PipelineState::EmptyResult => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    })
}

fn show_config(
    path: &std::path::Path,
    config: &NewsroomConfig,
    full: bool,
    validate: bool,
    output: Output,
) -> Result<ExitCode> {
    output.header("Configuration");
    output.kv(
        "File",
        &if path.exists() {
            path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", path.display())
        },
    );
    output.kv("LLM provider", &format!("{:?}", config.llm.provider).to_lowercase());
    output.kv("Model", &config.llm.model);
    output.kv("Max articles", &config.pipeline.max_articles.to_string());
    output.kv("Concurrency", &config.pipeline.max_concurrency.to_string());
    output.kv("Lookback days", &config.pipeline.lookback_days.to_string());
    output.kv("Output dir", &config.output.dir.display().to_string());

    if full {
        output.subheader("Full configuration");
        println!("{}", toml::to_string_pretty(config).context("Failed to encode config")?);
    }

    if validate {
        match config.validate().and_then(|_| config.validate_env()) {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                return Ok(ExitCode::FAILURE);
            }
        }
    } else {
        output.hint("Run with --validate to check API keys");
    }

    Ok(ExitCode::SUCCESS)
}
