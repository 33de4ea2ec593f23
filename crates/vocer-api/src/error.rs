use thiserror::Error;

/// Top-level error type for the `vocer-api` crate.
///
/// Covers both transport surfaces: the RouterOS API wire client and the
/// Telegram Bot API client. `vocer-core` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── RouterOS: connection & auth ─────────────────────────────────
    /// TCP dial to the router failed or timed out.
    #[error("cannot connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// `/login` was rejected (wrong credentials, disabled API user, etc.)
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    // ── RouterOS: command replies ───────────────────────────────────
    /// The router answered a command with a `!trap` reply.
    ///
    /// This is the per-call rejection path -- duplicate user names land here
    /// with a "already have user" style message.
    #[error("command rejected by router: {message}")]
    Trap { message: String },

    /// The router sent `!fatal`; the session is dead.
    #[error("session killed by router: {message}")]
    Fatal { message: String },

    /// Malformed wire data (reserved control byte, bad framing).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Socket-level I/O failure mid-session.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `host[:port]` string could not be parsed.
    #[error("invalid endpoint '{input}': {reason}")]
    InvalidEndpoint { input: String, reason: String },

    // ── Telegram ────────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Bot API returned `ok: false`.
    #[error("Telegram API error{}: {message}", .error_code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Telegram {
        message: String,
        error_code: Option<i64>,
    },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// URL construction failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this is a `!trap` that looks like a duplicate-name
    /// rejection from `/ip/hotspot/user/add`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Trap { message } if message.contains("already have"))
    }

    /// Returns `true` if the error means the whole session is unusable
    /// (as opposed to a single rejected command).
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Authentication { .. } | Self::Fatal { .. } | Self::Io(_)
        )
    }
}
