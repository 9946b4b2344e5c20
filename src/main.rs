use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mindflow::adapters::ReqwestHttpClient;
use mindflow::cli::{parse_args, run_cli_command, CliCommand, ConsoleListener, SearchOutcome};
use mindflow::config::SearchConfig;
use mindflow::error::ErrorCategory;
use mindflow::search::SearchOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Logs go to stderr, stdout carries only the answer
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let query = match parse_args(std::env::args()) {
        CliCommand::Search(query) => query,
        other => return run_cli_command(other).unwrap_or(Ok(())),
    };

    let config = SearchConfig::from_env();
    config.validate()?;
    tracing::info!("Using backend {}", config.search_url());

    let client = Arc::new(ReqwestHttpClient::from_config(&config)?);
    let mut search = SearchOrchestrator::new(client, config, ConsoleListener::new(std::io::stdout()));
    search.submit(&query)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while search.is_searching() {
        tokio::select! {
            _ = search.process_next() => {}
            _ = &mut ctrl_c => {
                search.cancel_active();
                eprintln!("\nSearch cancelled.");
                return Ok(());
            }
        }
    }

    match search.listener().outcome() {
        Some(SearchOutcome::Failed {
            message,
            is_transport,
        }) => {
            let category = if *is_transport {
                ErrorCategory::Transport
            } else {
                ErrorCategory::Application
            };
            tracing::error!("Search failed [{}]: {}", category, message);
            Err(eyre!("{}", message).wrap_err(category.recovery_hint()))
        }
        _ => Ok(()),
    }
}
