// Telegram Bot API client modules
//
// Hand-written client for the handful of Bot API methods the bot needs:
// long polling, message send/edit, and callback-query acknowledgement.
// Responses arrive in the `{ ok, result, description }` envelope, unwrapped
// by `client` before callers see them.

pub mod client;
pub mod models;

pub use client::BotApi;
pub use models::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update,
};
