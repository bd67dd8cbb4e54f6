use serde::{ Serialize, Deserialize };

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::User => "You",
            MessageKind::Assistant => "Assistant",
        }
    }
}

/// One stored turn as returned by `conversation_history`.
///
/// The backend has shipped both `type` and `role` for the sender tag, so both are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    #[serde(rename = "type", alias = "role")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Body of `DELETE /api/conversation/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}
