// vocer-api: Async transport clients for the vocer bot (RouterOS API + Telegram Bot API)

pub mod error;
pub mod routeros;
pub mod telegram;

pub use error::Error;
pub use routeros::{ApiClient, Endpoint};
pub use telegram::BotApi;
