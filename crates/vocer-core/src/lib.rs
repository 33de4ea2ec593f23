// vocer-core: Domain layer between vocer-api and the bot binary.

pub mod catalog;
pub mod chat;
pub mod credential;
pub mod error;
pub mod format;
pub mod provision;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Catalog, VoucherType};
pub use chat::{Action, Button, ChatEvent, Engine, Reply, Screen};
pub use credential::{generate, Credential, SAFE_ALPHABET, SUFFIX_LEN};
pub use error::CoreError;
pub use provision::{
    parse_quantity, DeviceConnector, DeviceSession, ProvisionOutcome, Provisioner,
    RouterConnector, USER_COMMENT,
};
