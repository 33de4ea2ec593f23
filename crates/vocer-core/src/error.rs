// ── Core error types ──
//
// User-facing failures from the domain layer. These are NOT wire-specific --
// consumers never see reply tags or socket errors directly. The formatter
// turns each variant into chat text at the boundary.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Connection` is request-fatal (no partial results); the quantity and code
/// variants are validation failures caught before any device call. Per-item
/// failures are not errors at this level -- they travel inside
/// `ProvisionOutcome`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cannot connect to router at {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("unknown voucher code '{code}'")]
    UnknownCode { code: String },

    #[error("quantity '{input}' is not a number")]
    QuantityNotNumeric { input: String },

    #[error("quantity must be greater than zero")]
    QuantityNotPositive,

    #[error("catalog error: {message}")]
    Catalog { message: String },
}

impl CoreError {
    /// Map a session-acquisition failure onto `Connection`, preserving the
    /// endpoint the transport layer reports when it has one.
    pub(crate) fn from_connect(fallback_endpoint: String, err: vocer_api::Error) -> Self {
        match err {
            vocer_api::Error::Connect { endpoint, reason } => Self::Connection { endpoint, reason },
            other => Self::Connection {
                endpoint: fallback_endpoint,
                reason: other.to_string(),
            },
        }
    }
}
