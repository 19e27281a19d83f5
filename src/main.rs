use anyhow::Result;
use clap::Parser;
use roster_enrich::cli::{handle_command, Cli};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging first
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_current_span(false).with_span_list(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }

    handle_command(cli).await
}
