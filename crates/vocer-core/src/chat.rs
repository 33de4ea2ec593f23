// Conversation engine
//
// Per-chat menu state machine plus the one-shot `<code> <quantity>` text
// command. Every inbound event passes the allow-list gate before anything
// else runs; unauthorized chats get a fixed denial and cause no state
// mutation and no device call.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::CoreError;
use crate::format;
use crate::provision::{parse_quantity, DeviceConnector, Provisioner};

/// Which menu a chat is currently looking at.
///
/// Kept in memory only; a restart drops everyone back to `MainMenu`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    MainMenu,
    TypeSelection,
    QuantitySelection {
        code: String,
    },
    Result,
}

/// A parsed button payload. Payloads split on `_`; catalog codes never
/// contain `_`, so the token counts below are unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Generate,
    Help,
    Profiles,
    BackMain,
    SelectType(String),
    SelectQuantity { code: String, quantity: String },
}

impl Action {
    /// Parse an opaque callback payload into the closed action set.
    ///
    /// Returns `None` for anything outside the six known shapes; callers
    /// reject those explicitly instead of falling through.
    pub fn parse(payload: &str) -> Option<Self> {
        let tokens: Vec<&str> = payload.split('_').collect();
        match tokens.as_slice() {
            ["menu", "generate"] => Some(Self::Generate),
            ["menu", "help"] => Some(Self::Help),
            ["menu", "profiles"] => Some(Self::Profiles),
            ["back", "main"] => Some(Self::BackMain),
            ["profile", code] if !code.is_empty() => Some(Self::SelectType((*code).to_owned())),
            ["generate", code, quantity] if !code.is_empty() => Some(Self::SelectQuantity {
                code: (*code).to_owned(),
                quantity: (*quantity).to_owned(),
            }),
            _ => None,
        }
    }
}

/// One inbound chat event, already stripped to what the engine needs.
#[derive(Debug, Clone, Copy)]
pub enum ChatEvent<'a> {
    /// The `/start` command.
    Start,
    /// An inline-keyboard press with its payload.
    Callback(&'a str),
    /// Free text.
    Text(&'a str),
}

/// One button of an outbound keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

/// What to send back: text plus an optional button layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Vec<Vec<Button>>>,
}

/// The conversation engine: allow-list gate, screen tracking, and dispatch
/// into the provisioner.
pub struct Engine<C> {
    allowed: HashSet<i64>,
    provisioner: Provisioner<C>,
    screens: HashMap<i64, Screen>,
}

impl<C: DeviceConnector> Engine<C> {
    pub fn new(allowed: HashSet<i64>, provisioner: Provisioner<C>) -> Self {
        Self {
            allowed,
            provisioner,
            screens: HashMap::new(),
        }
    }

    /// Allow-list check. No side effects; called on every inbound event.
    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.allowed.contains(&chat_id)
    }

    /// The screen a chat is currently on (`MainMenu` before first contact).
    pub fn screen(&self, chat_id: i64) -> Screen {
        self.screens.get(&chat_id).cloned().unwrap_or_default()
    }

    /// Handle one inbound event and produce the reply.
    pub async fn handle(&mut self, chat_id: i64, event: ChatEvent<'_>) -> Reply {
        if !self.is_authorized(chat_id) {
            debug!(chat_id, "rejected unauthorized chat");
            return format::denied();
        }

        match event {
            ChatEvent::Start => {
                self.screens.insert(chat_id, Screen::MainMenu);
                format::main_menu()
            }
            ChatEvent::Callback(payload) => self.handle_action(chat_id, payload).await,
            ChatEvent::Text(text) => self.handle_text(text).await,
        }
    }

    async fn handle_action(&mut self, chat_id: i64, payload: &str) -> Reply {
        let Some(action) = Action::parse(payload) else {
            debug!(chat_id, payload, "unrecognized payload");
            return format::unrecognized();
        };

        match action {
            Action::Generate => {
                self.screens.insert(chat_id, Screen::TypeSelection);
                format::type_selection(self.provisioner.catalog())
            }
            // Help and Profiles are informational overlays; the tracked
            // screen stays where it was.
            Action::Help => format::help(),
            Action::Profiles => format::profiles(self.provisioner.catalog()),
            Action::BackMain => {
                self.screens.insert(chat_id, Screen::MainMenu);
                format::main_menu()
            }
            Action::SelectType(code) => match self.provisioner.catalog().get(&code) {
                Some(voucher) => {
                    let reply = format::quantity_prompt(voucher);
                    self.screens
                        .insert(chat_id, Screen::QuantitySelection { code });
                    reply
                }
                None => format::request_error_reply(&CoreError::UnknownCode { code }),
            },
            Action::SelectQuantity { code, quantity } => {
                let text = self.run_provision(&code, &quantity).await;
                self.screens.insert(chat_id, Screen::Result);
                format::result_screen(text)
            }
        }
    }

    /// One-shot `<code> <quantity>` text command. Replies in place and
    /// leaves the tracked screen untouched.
    async fn handle_text(&self, text: &str) -> Reply {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [code, quantity] = tokens.as_slice() else {
            return format::format_help();
        };
        Reply {
            text: self.run_provision(code, quantity).await,
            keyboard: None,
        }
    }

    async fn run_provision(&self, code: &str, quantity: &str) -> String {
        let quantity = match parse_quantity(quantity) {
            Ok(q) => q,
            Err(e) => return format::request_error(&e),
        };
        match self.provisioner.provision(code, quantity).await {
            Ok(outcomes) => match self.provisioner.catalog().get(code) {
                Some(voucher) => format::batch(voucher, &outcomes),
                // provision() already validated the code
                None => format::request_error(&CoreError::UnknownCode {
                    code: code.to_owned(),
                }),
            },
            Err(e) => format::request_error(&e),
        }
    }
}
