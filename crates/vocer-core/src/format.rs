// Chat text rendering
//
// Pure functions from domain values to the text and button layouts the bot
// sends. All user-visible wording lives here.

use crate::catalog::{Catalog, VoucherType};
use crate::chat::{Button, Reply};
use crate::error::CoreError;
use crate::provision::ProvisionOutcome;

fn button(label: &str, payload: &str) -> Button {
    Button {
        label: label.into(),
        payload: payload.into(),
    }
}

fn back_row() -> Vec<Button> {
    vec![button("⬅️ Back", "back_main")]
}

/// Fixed denial for chats outside the allow-list.
pub fn denied() -> Reply {
    Reply {
        text: "❌ You are not allowed to use this bot.".into(),
        keyboard: None,
    }
}

pub fn main_menu() -> Reply {
    Reply {
        text: "✅ Bot online!\n\nPick a menu:".into(),
        keyboard: Some(vec![
            vec![button("🎫 Generate", "menu_generate")],
            vec![button("ℹ️ Help", "menu_help")],
            vec![button("📋 Profiles", "menu_profiles")],
        ]),
    }
}

/// One button per catalog entry, labelled `profile (code)`.
pub fn type_selection(catalog: &Catalog) -> Reply {
    let mut keyboard: Vec<Vec<Button>> = catalog
        .iter()
        .map(|v| {
            vec![button(
                &format!("{} ({})", v.profile, v.code),
                &format!("profile_{}", v.code),
            )]
        })
        .collect();
    keyboard.push(back_row());
    Reply {
        text: "📋 Pick a profile:".into(),
        keyboard: Some(keyboard),
    }
}

/// Quantity choices 1-4 for the selected type.
pub fn quantity_prompt(voucher: &VoucherType) -> Reply {
    let mut keyboard: Vec<Vec<Button>> = (1..=4)
        .map(|n| {
            vec![button(
                &n.to_string(),
                &format!("generate_{}_{n}", voucher.code),
            )]
        })
        .collect();
    keyboard.push(back_row());
    Reply {
        text: format!("How many vouchers for {}?", voucher.profile),
        keyboard: Some(keyboard),
    }
}

pub fn help() -> Reply {
    Reply {
        text: "📌 Manual format:\n<code> <quantity>\n\nExample:\n4r 2 → 2 vouchers on profile 4R"
            .into(),
        keyboard: Some(vec![back_row()]),
    }
}

pub fn profiles(catalog: &Catalog) -> Reply {
    let mut text = String::from("📋 Profiles:\n");
    for v in catalog.iter() {
        text.push_str(&format!(
            "{} → {} / {} ({})\n",
            v.code, v.prefix, v.profile, v.price
        ));
    }
    Reply {
        text,
        keyboard: Some(vec![back_row()]),
    }
}

/// Reply for free text that is not `<code> <quantity>`.
pub fn format_help() -> Reply {
    Reply {
        text: "Format: <code> <quantity>\nExample: 4r 2".into(),
        keyboard: None,
    }
}

/// Reply for a button payload outside the known set.
pub fn unrecognized() -> Reply {
    Reply {
        text: "⚠️ Unrecognized action.".into(),
        keyboard: None,
    }
}

/// Wrap result text in the result screen (back control only).
pub fn result_screen(text: String) -> Reply {
    Reply {
        text,
        keyboard: Some(vec![back_row()]),
    }
}

/// Render a completed batch.
///
/// The header always reports that the batch ran -- failures are per-item
/// lines underneath, never a missing header.
pub fn batch(voucher: &VoucherType, outcomes: &[ProvisionOutcome]) -> String {
    let mut parts = vec!["✅ Done\n".to_owned()];
    for outcome in outcomes {
        match &outcome.error {
            None => parts.push(format!(
                "✅ Voucher:\n🔐 {}\n📦 {}\n💰 {}\n",
                outcome.credential.username, voucher.profile, voucher.price
            )),
            Some(detail) => parts.push(format!(
                "⚠️ Failed to create {}: {detail}",
                outcome.credential.username
            )),
        }
    }
    parts.join("\n")
}

/// Render a request-level failure (validation or connection).
pub fn request_error(err: &CoreError) -> String {
    match err {
        CoreError::Connection { endpoint, reason } => {
            format!("⚠️ Cannot connect to router {endpoint}: {reason}")
        }
        CoreError::UnknownCode { code } => format!("❌ Unknown code '{code}'!"),
        CoreError::QuantityNotNumeric { input } => {
            format!("⚠️ Quantity '{input}' is not a number.")
        }
        CoreError::QuantityNotPositive => "⚠️ Quantity must be greater than zero.".into(),
        CoreError::Catalog { message } => format!("⚠️ Catalog problem: {message}"),
    }
}

/// Request-level failure as a bare reply (no keyboard).
pub fn request_error_reply(err: &CoreError) -> Reply {
    Reply {
        text: request_error(err),
        keyboard: None,
    }
}
