//! vplan CLI
//!
//! Normalizes saved or downloaded substitution schedules into JSON.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use vplan::{
    adapters,
    error::Result,
    models::{Config, SubstitutionSchedule},
    pipeline::{self, ScheduleAssembler},
    services::{ColorProvider, DateTimeNormalizer, TypeClassifier},
    sources::{self, PageSource},
    utils::http,
};

/// vplan - substitution schedule normalizer
#[derive(Parser, Debug)]
#[command(
    name = "vplan",
    version,
    about = "Normalizes school substitution schedules"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "vplan.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble one schedule from pages (paths or http(s) URLs)
    Normalize {
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Write the schedule here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify a type or description text
    Classify { text: String },

    /// Parse a date or timestamp text
    Dates { text: String },

    /// Compare two schedule JSON files
    Diff { old: PathBuf, new: PathBuf },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn read_schedule(path: &Path) -> Result<SubstitutionSchedule> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Normalize { inputs, output } => {
            config.validate()?;
            let adapter = adapters::from_config(&config.adapter)?;
            let assembler = ScheduleAssembler::new(&config.school)?;
            let client = http::create_async_client(&config.fetch)?;

            let page_sources: Vec<Box<dyn PageSource>> = inputs
                .iter()
                .map(|input| sources::source_for(input, &client))
                .collect();
            log::info!(
                "Loading {} page(s) with the {} adapter",
                page_sources.len(),
                adapter.name()
            );

            let pages =
                sources::load_pages(&page_sources, adapter.as_ref(), config.fetch.max_concurrent)
                    .await;
            let schedule = assembler.assemble(pages)?;
            let json = serde_json::to_string_pretty(&schedule)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!("Schedule saved to {}", path.display());
                }
                None => println!("{json}"),
            }
            log::info!("Fingerprint: {}", pipeline::fingerprint(&schedule)?);
        }

        Command::Classify { text } => {
            let classifier = TypeClassifier::new(config.school.colors.keys().cloned());
            let colors = ColorProvider::new(&config.school.colors);
            match classifier.classify(&text) {
                Some(kind) => println!("{kind}\t{}", colors.color_for(&kind)),
                None => println!("(no type)"),
            }
        }

        Command::Dates { text } => {
            let normalizer = DateTimeNormalizer::default();
            match (normalizer.parse_date_time(&text), normalizer.parse_date(&text)) {
                (Some(date_time), _) => println!("{}", date_time.format("%Y-%m-%d %H:%M")),
                (None, Some(date)) => println!("{}", date.format("%Y-%m-%d")),
                (None, None) => println!("(unknown date)"),
            }
        }

        Command::Diff { old, new } => {
            let diff = pipeline::calculate_diff(&read_schedule(&old)?, &read_schedule(&new)?);
            log::info!("{} change(s)", diff.change_count());
            println!("{}", serde_json::to_string_pretty(&diff)?);
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());
            if let Err(e) = Config::load(&cli.config).and_then(|c| c.validate()) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
