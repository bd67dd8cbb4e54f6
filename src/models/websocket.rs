use serde::{ Serialize, Deserialize };
use super::chat::{ HistoryEntry, MessageKind };

/// Events the client pushes to the chat server.
///
/// Framed as `{"event": "<name>", "data": {...}}`; payload-less events omit `data`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "chat_message")] ChatMessage {
        message: String,
        conversation_id: String,
        collection_name: String,
    },
    #[serde(rename = "new_conversation")]
    NewConversation,
    #[serde(rename = "get_conversation_history")] GetConversationHistory {
        conversation_id: String,
    },
    #[serde(rename = "get_conversation_collection")]
    GetConversationCollection,
    #[serde(rename = "clear_conversation")] ClearConversation {
        conversation_id: String,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ChatMessage { .. } => "chat_message",
            ClientEvent::NewConversation => "new_conversation",
            ClientEvent::GetConversationHistory { .. } => "get_conversation_history",
            ClientEvent::GetConversationCollection => "get_conversation_collection",
            ClientEvent::ClearConversation { .. } => "clear_conversation",
        }
    }
}

/// Events pushed by the chat server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "connected")] Connected {
        message: String,
    },
    #[serde(rename = "message")] Message {
        content: String,
        #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
        role: Option<MessageKind>,
    },
    #[serde(rename = "stream_chunk")] StreamChunk {
        chunk: String,
        conversation_id: String,
    },
    #[serde(rename = "message_complete")] MessageComplete {
        conversation_id: String,
        #[serde(default)]
        full_message: String,
    },
    #[serde(rename = "conversation_created")] ConversationCreated {
        conversation_id: String,
        title: String,
    },
    #[serde(rename = "conversation_history")] ConversationHistory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
        history: Vec<HistoryEntry>,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
    #[serde(rename = "conversation_collection")] ConversationCollection {
        collection_name: String,
        collections: Vec<String>,
    },
}

/// What the transport reports to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connect,
    Disconnect,
    /// Transport-level failure worth showing to the user.
    Error(String),
    Server(ServerEvent),
}
