use chrono::{ DateTime, Duration, Utc };

use crate::cli::Args;

/// Literal id the backend treats as the fallback conversation.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Lifecycle of the message list for the current conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    AwaitingHistory,
    Rendered,
}

/// The client-side state the controller owns. Only the event loop touches it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerState {
    pub current_conversation_id: String,
    /// Session-local id of the default conversation, `"default"` plus a millisecond timestamp.
    pub default_conversation_id: String,
    pub connected: bool,
    /// True while an assistant reply for the current conversation is streaming.
    pub typing: bool,
    pub selected_collection: String,
    pub phase: ViewPhase,
    pub greeted: bool,
    pub pending_delete: Option<String>,
}

impl ControllerState {
    pub fn new(collection: &str, now: DateTime<Utc>) -> Self {
        let default_id = default_conversation_id(now);
        Self {
            current_conversation_id: default_id.clone(),
            default_conversation_id: default_id,
            connected: false,
            typing: false,
            selected_collection: collection.to_string(),
            phase: ViewPhase::Idle,
            greeted: false,
            pending_delete: None,
        }
    }

    /// The default conversation can never be deleted, under either of its names.
    pub fn is_protected(&self, conversation_id: &str) -> bool {
        conversation_id == DEFAULT_CONVERSATION_ID || conversation_id == self.default_conversation_id
    }
}

pub fn default_conversation_id(now: DateTime<Utc>) -> String {
    format!("{}{}", DEFAULT_CONVERSATION_ID, now.timestamp_millis())
}

#[derive(Clone, Debug)]
pub struct ControllerSettings {
    pub default_collection: String,
    pub default_title: String,
    pub max_message_len: usize,
    pub suggestions: Vec<String>,
    pub notification_ttl: Duration,
    pub assume_yes: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_collection: "test".to_string(),
            default_title: "Default conversation".to_string(),
            max_message_len: 2000,
            suggestions: vec![
                "Tender document requirements".to_string(),
                "General provisions".to_string()
            ],
            notification_ttl: Duration::milliseconds(3000),
            assume_yes: false,
        }
    }
}

impl From<&Args> for ControllerSettings {
    fn from(args: &Args) -> Self {
        Self {
            default_collection: args.default_collection.clone(),
            default_title: args.default_conversation_title.clone(),
            max_message_len: args.max_message_len,
            suggestions: args.suggestions
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            notification_ttl: Duration::milliseconds(
                i64::try_from(args.notification_ttl_ms).unwrap_or(i64::MAX)
            ),
            assume_yes: args.assume_yes,
        }
    }
}
