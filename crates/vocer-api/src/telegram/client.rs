// Bot API HTTP client
//
// Wraps `reqwest::Client` with token-scoped URL construction and envelope
// unwrapping. The long-poll timeout is applied per request so it can exceed
// the client-wide default.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::telegram::models::{ApiEnvelope, InlineKeyboardMarkup, Message, Update};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct EditMessageTextBody<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

/// Client for the Telegram Bot API, scoped to one bot token.
pub struct BotApi {
    http: reqwest::Client,
    base_url: Url,
}

impl BotApi {
    /// Create a client against `api.telegram.org` for the given token.
    pub fn new(token: &SecretString) -> Result<Self, Error> {
        let base_url = Url::parse(&format!(
            "https://api.telegram.org/bot{}/",
            token.expose_secret()
        ))?;
        Self::with_base_url(base_url)
    }

    /// Create a client against an arbitrary base URL (tests point this at a
    /// mock server). The URL must already include the `/bot<token>/` segment
    /// and a trailing slash.
    pub fn with_base_url(base_url: Url) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(Error::Transport)?;
        Ok(Self { http, base_url })
    }

    /// Long-poll for updates. Blocks up to `timeout_secs` server-side; the
    /// HTTP timeout is stretched past it so the poll is not cut short.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, Error> {
        let body = json!({ "offset": offset, "timeout": timeout_secs });
        self.call_with_timeout(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs + 10),
        )
        .await
    }

    /// Send a new message, optionally with an inline keyboard.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, Error> {
        let body = SendMessageBody {
            chat_id,
            text,
            reply_markup,
        };
        self.call("sendMessage", &body).await
    }

    /// Edit a previously sent message in place (text and keyboard).
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), Error> {
        let body = EditMessageTextBody {
            chat_id,
            message_id,
            text,
            reply_markup,
        };
        // Telegram returns either the edited Message or `true`
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    /// Acknowledge a callback query so the client stops showing a spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), Error> {
        let body = json!({ "callback_query_id": callback_query_id });
        let _: serde_json::Value = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    // ── Request plumbing ────────────────────────────────────────────

    fn method_url(&self, method: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(method)?)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        self.call_with_timeout(method, body, DEFAULT_TIMEOUT).await
    }

    async fn call_with_timeout<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
        timeout: Duration,
    ) -> Result<T, Error> {
        let url = self.method_url(method)?;
        debug!(method, "POST bot API");

        let resp = self
            .http
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let body = resp.text().await.map_err(Error::Transport)?;
        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if !envelope.ok {
            return Err(Error::Telegram {
                message: envelope
                    .description
                    .unwrap_or_else(|| "no description".into()),
                error_code: envelope.error_code,
            });
        }

        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "ok response without result".into(),
            body,
        })
    }
}
