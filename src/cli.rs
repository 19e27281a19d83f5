// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::batch::{self, BatchDriver};
use crate::config::{EnrichConfig, DEFAULT_CONFIG_FILE};
use crate::profile_parser::ProfileParser;
use crate::search::exa::API_KEY_ENV;
use crate::search::ExaClient;

#[derive(Parser)]
#[command(name = "roster-enrich")]
#[command(about = "Enrich a member roster with professional profile data, one batch per run")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// YAML configuration file; defaults apply when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process the next batch of pending people (default)
    Run {
        #[arg(long)]
        batch_size: Option<usize>,
        /// Pause between people, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Show how many people are pending and how many rows were written
    Status,
    /// Build the pending file from the input roster
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Parse a saved profile text file and print the extracted fields as JSON
    Parse { file: PathBuf },
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let config = EnrichConfig::load(&cli.config)?;
    let command = cli.command.unwrap_or(Command::Run {
        batch_size: None,
        delay_ms: None,
    });

    match command {
        Command::Run {
            batch_size,
            delay_ms,
        } => {
            let config = config
                .with_batch_size(batch_size)
                .with_request_delay_ms(delay_ms);

            let client = ExaClient::from_env(&config.search.base_url, config.search.timeout_seconds)
                .with_context(|| format!("Set your {} environment variable", API_KEY_ENV))?;

            let driver = BatchDriver::new(config, Arc::new(client))?;
            driver.run_batch().await?;
        }

        Command::Status => {
            let report = batch::status(&config).await?;
            if !report.pending_initialized {
                info!(
                    "No pending file yet at {}; the first run will create it from {}",
                    config.pending_path.display(),
                    config.input_path.display()
                );
            }
            info!("Pending:   {}", report.remaining);
            info!("Processed: {}", report.processed);
            info!(
                "Runs left: {}",
                report.remaining.div_ceil(report.batch_size.max(1))
            );
        }

        Command::Init { force } => {
            let count = batch::init_pending(&config, force).await?;
            info!(
                "Created {} with {} people",
                config.pending_path.display(),
                count
            );
        }

        Command::Parse { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let parser = ProfileParser::new(
                &config.anchor_term,
                &config.education_label,
                &config.target_org,
            )?;
            let parsed = parser.parse(Some(&text));
            println!(
                "{}",
                serde_json::to_string_pretty(&parsed).context("Failed to serialize profile")?
            );
        }
    }

    Ok(())
}
