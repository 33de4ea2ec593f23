//! Long-poll dispatch loop.
//!
//! Pulls updates from the Bot API and routes them into the conversation
//! engine. Per-update failures are logged and never break the loop; only
//! Ctrl-C ends it.

use std::time::Duration;

use tracing::{debug, info, warn};

use vocer_api::telegram::{InlineKeyboardButton, InlineKeyboardMarkup, Update};
use vocer_api::BotApi;
use vocer_core::{ChatEvent, DeviceConnector, Engine, Reply};

/// Server-side long-poll window.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll before retrying.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run the dispatch loop until Ctrl-C.
pub async fn run<C: DeviceConnector>(bot: &BotApi, mut engine: Engine<C>) {
    let mut offset = 0i64;
    info!("bot online, polling for updates");

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return;
            }
            result = bot.get_updates(offset, POLL_TIMEOUT_SECS) => match result {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            },
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            if let Err(e) = handle_update(bot, &mut engine, update).await {
                warn!(update_id, error = %e, "update handling failed");
            }
        }
    }
}

async fn handle_update<C: DeviceConnector>(
    bot: &BotApi,
    engine: &mut Engine<C>,
    update: Update,
) -> Result<(), vocer_api::Error> {
    if let Some(callback) = update.callback_query {
        // ack first so the client stops showing a spinner
        bot.answer_callback_query(&callback.id).await?;

        let Some(message) = callback.message else {
            debug!("callback without originating message, ignoring");
            return Ok(());
        };
        let chat_id = message.chat.id;
        let payload = callback.data.unwrap_or_default();

        let reply = engine.handle(chat_id, ChatEvent::Callback(&payload)).await;
        bot.edit_message_text(
            chat_id,
            message.message_id,
            &reply.text,
            markup(&reply).as_ref(),
        )
        .await?;
        return Ok(());
    }

    if let Some(message) = update.message {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        let event = if is_start_command(text) {
            ChatEvent::Start
        } else if text.starts_with('/') {
            // only /start is a recognized command
            return Ok(());
        } else {
            ChatEvent::Text(text)
        };

        let reply = engine.handle(chat_id, event).await;
        bot.send_message(chat_id, &reply.text, markup(&reply).as_ref())
            .await?;
    }

    Ok(())
}

fn is_start_command(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed == "/start" || trimmed.starts_with("/start ") || trimmed.starts_with("/start@")
}

/// Convert the engine's keyboard into Bot API markup.
fn markup(reply: &Reply) -> Option<InlineKeyboardMarkup> {
    reply.keyboard.as_ref().map(|rows| InlineKeyboardMarkup {
        inline_keyboard: rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| InlineKeyboardButton {
                        text: b.label.clone(),
                        callback_data: b.payload.clone(),
                    })
                    .collect()
            })
            .collect(),
    })
}
