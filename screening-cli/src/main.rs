use analysis_client::ClientConfig;
use anyhow::Result;
use clap::Parser;
use screening_core::Catalog;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Context;

const DEFAULT_LOG_FILTER: &str = "screening_cli=info,analysis_client=info,screening_core=info";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config.validated()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::bundled()?,
    };
    info!("Catalog loaded: {} entities", catalog.len());

    let ctx = Context {
        catalog: Arc::new(catalog),
        client_config: client_config(&cli)?,
        json: cli.json,
    };

    match &cli.command {
        Commands::Search { query, type_filter } => commands::search(&ctx, query, *type_filter),
        Commands::Features { name } => commands::features(&ctx, name),
        Commands::Analyze { name, record } => {
            commands::analyze(&ctx, name.as_deref(), record.as_deref()).await
        }
        Commands::Impact { name } => commands::impact(&ctx, name),
        Commands::Scenario { sanction_type } => commands::scenario(&ctx, sanction_type.as_deref()),
        Commands::Country { name } => commands::country(&ctx, name.as_deref()),
        Commands::Risk => commands::risk(&ctx),
        Commands::Explain {
            name,
            metric,
            value,
        } => commands::explain(&ctx, name, metric, *value).await,
        Commands::MacroRisk { country_code } => commands::macro_risk(&ctx, country_code).await,
    }
}
