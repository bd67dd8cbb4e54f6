use std::fmt::Write;

use super::{ ChatView, NotificationLevel };

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RULE: &str = "------------------------------------------------------------";

/// Draws the view as plain text for a terminal.
pub fn render(view: &ChatView, clear: bool) -> String {
    let mut out = String::new();
    if clear {
        out.push_str(CLEAR_SCREEN);
    }

    let _ = writeln!(
        out,
        "[{}] collection: {} ({})",
        view.status.label(),
        view.collection.value,
        view.collection.options.join(", ")
    );

    let _ = writeln!(out, "{}", RULE);
    for item in &view.conversations {
        let marker = if item.active { '*' } else { ' ' };
        let _ = writeln!(out, "{} {}  [{}]  (x)", marker, item.title, item.id);
    }
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "# {}", view.title);

    if view.welcome.visible {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Welcome! Ask a question about the selected collection.");
        for (i, suggestion) in view.welcome.suggestions.iter().enumerate() {
            let _ = writeln!(out, "  /suggest {}  {}", i + 1, suggestion);
        }
    }

    for message in &view.messages {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}:", message.kind.label());
        let _ = write!(out, "{}", message.content);
        if message.streaming {
            out.push('\u{258c}');
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", RULE);
    for notification in &view.notifications {
        let tag = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        let _ = writeln!(out, "({}) {}", tag, notification.message);
    }
    if let Some(prompt) = &view.prompt {
        let _ = writeln!(out, "? {} (/yes or /no)", prompt);
    }

    let send = if view.input.send_enabled { "send" } else { "----" };
    let _ = write!(out, "{}/{} [{}] > ", view.input.char_count(), view.input.max_len, send);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::MessageKind;
    use crate::view::ChatView;
    use chrono::Utc;

    #[test]
    fn renders_welcome_and_active_marker() {
        let view = ChatView::new("default1", "Default", "test", 2000, vec!["General provisions".into()]);
        let text = render(&view, false);
        assert!(text.starts_with("[offline] collection: test"));
        assert!(text.contains("* Default  [default1]"));
        assert!(text.contains("/suggest 1  General provisions"));
        assert!(text.ends_with("0/2000 [----] > "));
    }

    #[test]
    fn marks_streaming_replies_and_notifications() {
        let mut view = ChatView::new("default1", "Default", "test", 2000, Vec::new());
        view.welcome.visible = false;
        view.push_message(MessageKind::User, "hi", None);
        view.append_stream_chunk("Hel");
        view.notify(NotificationLevel::Error, "boom", Utc::now());

        let text = render(&view, true);
        assert!(text.starts_with(CLEAR_SCREEN));
        assert!(text.contains("You:\nhi\n"));
        assert!(text.contains("Assistant:\nHel\u{258c}\n"));
        assert!(text.contains("(error) boom"));
        assert!(!text.contains("Welcome!"));
    }
}
