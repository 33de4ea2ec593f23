//! TOML + environment configuration.
//!
//! One file, loaded once at startup, never reloaded. Figment merges the TOML
//! file with `VOCER_`-prefixed environment variables (`__` as the section
//! separator, e.g. `VOCER_TELEGRAM__TOKEN`). Secrets move into
//! `SecretString` as soon as the runtime pieces are built.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

use vocer_api::routeros::{Endpoint, DEFAULT_API_PORT};
use vocer_api::BotApi;
use vocer_core::{Catalog, RouterConnector, VoucherType};

use crate::error::BotError;

// ── Config structs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub router: RouterConfig,

    /// Voucher catalog, code → entry. Order in the file is menu order.
    #[serde(default = "default_vouchers")]
    pub vouchers: IndexMap<String, VoucherEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: String,

    /// Chat ids allowed to operate the bot.
    pub allowed_chat_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RouterConfig {
    /// Router address: `host`, `host:port`, or `[v6addr]:port`.
    pub host: String,

    /// API port used when `host` carries no explicit port.
    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    /// API password (plaintext in the file -- prefer VOCER_ROUTER__PASSWORD).
    pub password: String,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoucherEntry {
    pub prefix: String,
    pub profile: String,
    pub price: String,
}

fn default_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_connect_timeout() -> u64 {
    10
}

/// The stock catalog, used when the file has no `[vouchers.*]` sections.
fn default_vouchers() -> IndexMap<String, VoucherEntry> {
    let entry = |prefix: &str, profile: &str, price: &str| VoucherEntry {
        prefix: prefix.into(),
        profile: profile.into(),
        price: price.into(),
    };
    IndexMap::from([
        ("2r".into(), entry("2R", "2Rb-10Jam", "Rp2.000")),
        ("3r".into(), entry("3R", "3Rb-17Jam", "Rp3.000")),
        ("4r".into(), entry("4R", "4Rb-24Jam", "Rp4.000")),
        ("8r".into(), entry("8R", "8Rb-2Hari5Jam", "Rp8.000")),
        ("7h".into(), entry("7D", "7Hari-25Rb", "Rp25.000")),
        ("1b".into(), entry("30D", "1-BULAN", "Rp50.000")),
        ("2b".into(), entry("30D", "1Bulan-2Hp", "Rp80.000")),
        ("3b".into(), entry("30D", "1Bulan-3Hp", "Rp120.000")),
        ("4b".into(), entry("30D", "1Bulan-4HP-150", "Rp150.000")),
        ("t1".into(), entry("TE", "TEST", "Rp0")),
    ])
}

// ── Loading ─────────────────────────────────────────────────────────

/// Resolve the default config file path via platform conventions.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("com", "vocer", "vocer").map_or_else(
        || PathBuf::from("vocer.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Load and validate the config from `path` + environment.
pub fn load_config(path: &Path) -> Result<Config, BotError> {
    if !path.exists() && !env_has_required() {
        return Err(BotError::NoConfig {
            path: path.display().to_string(),
        });
    }

    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("VOCER_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// True when enough environment is present to run without a file.
fn env_has_required() -> bool {
    ["VOCER_TELEGRAM__TOKEN", "VOCER_ROUTER__HOST"]
        .iter()
        .all(|v| std::env::var(v).is_ok())
}

// ── Validation & runtime pieces ─────────────────────────────────────

impl Config {
    fn validate(&self) -> Result<(), BotError> {
        if self.telegram.token.trim().is_empty() {
            return Err(BotError::Validation {
                field: "telegram.token".into(),
                reason: "empty token".into(),
            });
        }
        if self.telegram.allowed_chat_ids.is_empty() {
            return Err(BotError::Validation {
                field: "telegram.allowed_chat_ids".into(),
                reason: "empty allow-list, nobody could operate the bot".into(),
            });
        }
        if self.vouchers.is_empty() {
            return Err(BotError::Validation {
                field: "vouchers".into(),
                reason: "empty voucher catalog".into(),
            });
        }
        // surface endpoint parse errors at startup, not on first request
        self.endpoint()?;
        Ok(())
    }

    fn endpoint(&self) -> Result<Endpoint, BotError> {
        Endpoint::parse(&self.router.host, self.router.port).map_err(|e| BotError::Validation {
            field: "router.host".into(),
            reason: e.to_string(),
        })
    }

    pub fn catalog(&self) -> Result<Catalog, BotError> {
        let types = self.vouchers.iter().map(|(code, entry)| VoucherType {
            code: code.clone(),
            prefix: entry.prefix.clone(),
            profile: entry.profile.clone(),
            price: entry.price.clone(),
        });
        Catalog::new(types).map_err(|e| BotError::Validation {
            field: "vouchers".into(),
            reason: e.to_string(),
        })
    }

    pub fn connector(&self) -> Result<RouterConnector, BotError> {
        Ok(RouterConnector::new(
            self.endpoint()?,
            self.router.username.clone(),
            SecretString::from(self.router.password.clone()),
            Duration::from_secs(self.router.connect_timeout_secs),
        ))
    }

    pub fn bot_api(&self) -> Result<BotApi, BotError> {
        let token = SecretString::from(self.telegram.token.clone());
        BotApi::new(&token).map_err(BotError::Telegram)
    }

    pub fn allowed_chat_ids(&self) -> HashSet<i64> {
        self.telegram.allowed_chat_ids.iter().copied().collect()
    }
}
