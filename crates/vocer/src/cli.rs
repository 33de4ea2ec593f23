use std::path::PathBuf;

use clap::Parser;

/// Telegram bot that provisions MikroTik hotspot vouchers.
#[derive(Debug, Parser)]
#[command(name = "vocer", version, about)]
pub struct Cli {
    /// Path to the config file (defaults to the platform config dir).
    #[arg(short, long, env = "VOCER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
