mod cli;
mod config;
mod dispatch;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vocer_core::{Engine, Provisioner};

use crate::cli::Cli;
use crate::error::BotError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), BotError> {
    let path = cli.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&path)?;

    let catalog = config.catalog()?;
    let connector = config.connector()?;
    let bot = config.bot_api()?;

    tracing::info!(
        vouchers = catalog.len(),
        operators = config.allowed_chat_ids().len(),
        "configuration loaded"
    );

    let engine = Engine::new(
        config.allowed_chat_ids(),
        Provisioner::new(catalog, connector),
    );

    dispatch::run(&bot, engine).await;
    Ok(())
}
