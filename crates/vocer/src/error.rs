//! Startup error types with miette diagnostics.
//!
//! The dispatch loop never returns these -- per-update failures are logged
//! and swallowed. These cover the one-shot bootstrap path: CLI, config,
//! catalog construction.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BotError {
    #[error("configuration file not found")]
    #[diagnostic(
        code(vocer::no_config),
        help(
            "Expected at: {path}\n\
             Create it with [telegram], [router], and optional [vouchers.*] sections,\n\
             or point --config (VOCER_CONFIG) at an existing file."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(vocer::config))]
    Config(Box<figment::Error>),

    #[error("invalid {field}: {reason}")]
    #[diagnostic(code(vocer::validation))]
    Validation { field: String, reason: String },

    #[error("could not build the Telegram client")]
    #[diagnostic(code(vocer::telegram))]
    Telegram(#[source] vocer_api::Error),
}

impl From<figment::Error> for BotError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
