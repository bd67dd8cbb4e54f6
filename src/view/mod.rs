pub mod render;

use chrono::{ DateTime, Duration, Utc };

use crate::models::chat::{ HistoryEntry, MessageKind };

/// A rendered chat bubble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageView {
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: Option<i64>,
    /// Set while an assistant reply is still receiving chunks.
    pub streaming: bool,
}

impl MessageView {
    pub fn new(kind: MessageKind, content: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self { kind, content: content.into(), timestamp, streaming: false }
    }

    fn assistant_streaming() -> Self {
        Self { kind: MessageKind::Assistant, content: String::new(), timestamp: None, streaming: true }
    }

    pub fn is_streaming_assistant(&self) -> bool {
        self.kind == MessageKind::Assistant && self.streaming
    }
}

/// An entry in the side list of conversations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationItem {
    pub id: String,
    pub title: String,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Offline,
    Online,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Online => "online",
            ConnectionStatus::Offline => "offline",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionSelector {
    pub options: Vec<String>,
    pub value: String,
}

impl CollectionSelector {
    /// Rebuilds the options, keeping first-seen order and dropping duplicates.
    pub fn set_options<I, S>(&mut self, names: I, selected: &str)
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        self.options.clear();
        for name in names {
            let name = name.into();
            if !self.options.contains(&name) {
                self.options.push(name);
            }
        }
        self.value = selected.to_string();
    }
}

/// Message input plus the derived state of the send button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputBox {
    pub text: String,
    pub max_len: usize,
    pub send_enabled: bool,
}

impl InputBox {
    pub fn new(max_len: usize) -> Self {
        Self { text: String::new(), max_len, send_enabled: false }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let len = self.char_count();
        self.send_enabled = len > 0 && len <= self.max_len;
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn too_long(&self) -> bool {
        self.char_count() > self.max_len
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WelcomePanel {
    pub visible: bool,
    pub suggestions: Vec<String>,
}

/// Everything the rendering layer needs to draw the chat page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatView {
    pub status: ConnectionStatus,
    pub title: String,
    pub conversations: Vec<ConversationItem>,
    pub messages: Vec<MessageView>,
    pub welcome: WelcomePanel,
    pub collection: CollectionSelector,
    pub input: InputBox,
    pub notifications: Vec<Notification>,
    /// Question waiting for a yes/no answer, if any.
    pub prompt: Option<String>,
}

impl ChatView {
    pub fn new(
        default_id: &str,
        default_title: &str,
        collection: &str,
        max_len: usize,
        suggestions: Vec<String>
    ) -> Self {
        Self {
            status: ConnectionStatus::Offline,
            title: default_title.to_string(),
            conversations: vec![ConversationItem {
                id: default_id.to_string(),
                title: default_title.to_string(),
                active: true,
            }],
            messages: Vec::new(),
            welcome: WelcomePanel { visible: true, suggestions },
            collection: CollectionSelector {
                options: vec![collection.to_string()],
                value: collection.to_string(),
            },
            input: InputBox::new(max_len),
            notifications: Vec::new(),
            prompt: None,
        }
    }

    pub fn conversation(&self, id: &str) -> Option<&ConversationItem> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_conversation(&self) -> Option<&ConversationItem> {
        self.conversations.iter().find(|c| c.active)
    }

    /// Moves the active marker to `id`. Returns the item's title when it exists.
    pub fn activate(&mut self, id: &str) -> Option<String> {
        if self.conversation(id).is_none() {
            return None;
        }
        let mut title = None;
        for item in &mut self.conversations {
            item.active = item.id == id;
            if item.active {
                title = Some(item.title.clone());
            }
        }
        title
    }

    /// Inserts a conversation at the top of the list as the only active entry.
    pub fn insert_conversation_front(&mut self, id: &str, title: &str) {
        self.conversations.retain(|c| c.id != id);
        for item in &mut self.conversations {
            item.active = false;
        }
        self.conversations.insert(0, ConversationItem {
            id: id.to_string(),
            title: title.to_string(),
            active: true,
        });
    }

    pub fn remove_conversation(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        self.conversations.len() != before
    }

    pub fn push_message(&mut self, kind: MessageKind, content: &str, timestamp: Option<i64>) {
        self.messages.push(MessageView::new(kind, content, timestamp));
    }

    /// Appends a chunk to the trailing streaming reply, starting one if needed.
    /// Returns `true` when a new bubble was created.
    pub fn append_stream_chunk(&mut self, chunk: &str) -> bool {
        let created = match self.messages.last() {
            Some(last) if last.is_streaming_assistant() => false,
            _ => {
                for message in &mut self.messages {
                    message.streaming = false;
                }
                self.messages.push(MessageView::assistant_streaming());
                true
            }
        };
        if let Some(last) = self.messages.last_mut() {
            last.content.push_str(chunk);
        }
        created
    }

    /// Clears the streaming flag on the last bubble. Returns `true` if one was streaming.
    pub fn finish_stream(&mut self) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.streaming => {
                last.streaming = false;
                true
            }
            _ => false,
        }
    }

    pub fn replace_messages(&mut self, history: &[HistoryEntry]) {
        self.messages = history
            .iter()
            .map(|entry| MessageView::new(entry.kind, entry.content.clone(), entry.timestamp))
            .collect();
        self.welcome.visible = self.messages.is_empty();
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.welcome.visible = true;
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>, now: DateTime<Utc>) {
        self.notifications.push(Notification { level, message: message.into(), created_at: now });
    }

    /// Drops notifications older than `ttl`. Returns `true` if any were removed.
    pub fn expire_notifications(&mut self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| now - n.created_at < ttl);
        self.notifications.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ChatView {
        ChatView::new("default1", "Default", "test", 2000, vec!["hello".into()])
    }

    #[test]
    fn send_enabled_tracks_length_bounds() {
        let mut input = InputBox::new(2000);
        for len in [0usize, 1, 2, 1999, 2000, 2001, 4096] {
            input.set_text("a".repeat(len));
            assert_eq!(input.send_enabled, len != 0 && len <= 2000, "length {}", len);
        }
    }

    #[test]
    fn input_length_counts_characters_not_bytes() {
        let mut input = InputBox::new(3);
        input.set_text("总则吗");
        assert_eq!(input.char_count(), 3);
        assert!(input.send_enabled);
    }

    #[test]
    fn stream_chunks_grow_one_bubble() {
        let mut view = view();
        assert!(view.append_stream_chunk("Hel"));
        assert!(!view.append_stream_chunk("lo"));
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].content, "Hello");
        assert!(view.messages[0].streaming);

        assert!(view.finish_stream());
        assert!(!view.finish_stream());
        assert!(view.messages.iter().all(|m| !m.streaming));
    }

    #[test]
    fn at_most_one_bubble_streams() {
        let mut view = view();
        view.append_stream_chunk("first");
        view.push_message(MessageKind::User, "interjection", None);
        view.append_stream_chunk("second");

        assert_eq!(view.messages.len(), 3);
        assert_eq!(view.messages.iter().filter(|m| m.streaming).count(), 1);
        assert!(view.messages[2].streaming);
    }

    #[test]
    fn only_one_conversation_is_active() {
        let mut view = view();
        view.insert_conversation_front("c1", "First");
        view.insert_conversation_front("c2", "Second");
        assert_eq!(view.conversations[0].id, "c2");
        assert_eq!(view.conversations.iter().filter(|c| c.active).count(), 1);

        assert_eq!(view.activate("c1").as_deref(), Some("First"));
        assert_eq!(view.active_conversation().map(|c| c.id.as_str()), Some("c1"));
        assert_eq!(view.activate("missing"), None);
        assert!(view.remove_conversation("c2"));
        assert!(!view.remove_conversation("c2"));
        assert_eq!(view.active_conversation().map(|c| c.id.as_str()), Some("c1"));
    }

    #[test]
    fn collection_options_drop_duplicates() {
        let mut selector = CollectionSelector::default();
        selector.set_options(vec!["a", "b", "a", "c"], "b");
        assert_eq!(selector.options, vec!["a", "b", "c"]);
        assert_eq!(selector.value, "b");
    }

    #[test]
    fn notifications_expire_after_ttl() {
        let mut view = view();
        let t0 = Utc::now();
        view.notify(NotificationLevel::Info, "old", t0);
        view.notify(NotificationLevel::Error, "new", t0 + Duration::milliseconds(2500));

        assert!(view.expire_notifications(t0 + Duration::milliseconds(3000), Duration::milliseconds(3000)));
        assert_eq!(view.notifications.len(), 1);
        assert_eq!(view.notifications[0].message, "new");
    }
}
