pub mod state;

use chrono::Utc;
use log::{ info, warn, debug };
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ConversationApi;
use crate::cli::command::{ UiCommand, HELP_TEXT };
use crate::models::chat::{ HistoryEntry, MessageKind };
use crate::models::websocket::{ ChannelEvent, ClientEvent, ServerEvent };
use crate::view::{ ChatView, ConnectionStatus, NotificationLevel };
use self::state::{ ControllerSettings, ControllerState, ViewPhase };

/// Everything that can reach the controller, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Channel(ChannelEvent),
    Ui(UiCommand),
    InputError(String),
    DeleteFinished {
        conversation_id: String,
        success: bool,
    },
    Tick,
}

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    Unchanged,
    Quit,
}

pub struct ChatController {
    state: ControllerState,
    view: ChatView,
    settings: ControllerSettings,
    outbound: UnboundedSender<ClientEvent>,
    events: UnboundedSender<AppEvent>,
    api: Arc<dyn ConversationApi>,
}

impl ChatController {
    pub fn new(
        settings: ControllerSettings,
        outbound: UnboundedSender<ClientEvent>,
        events: UnboundedSender<AppEvent>,
        api: Arc<dyn ConversationApi>
    ) -> Self {
        let state = ControllerState::new(&settings.default_collection, Utc::now());
        let view = ChatView::new(
            &state.default_conversation_id,
            &settings.default_title,
            &settings.default_collection,
            settings.max_message_len,
            settings.suggestions.clone()
        );
        info!("Default conversation id: {}", state.default_conversation_id);
        Self { state, view, settings, outbound, events, api }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn view(&self) -> &ChatView {
        &self.view
    }

    fn emit(&self, event: ClientEvent) {
        debug!("Queueing {} event", event.name());
        if self.outbound.send(event).is_err() {
            warn!("Outbound channel closed; event dropped");
        }
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.view.notify(level, message, Utc::now());
    }

    /// Initial requests: history for the default conversation and the collection list.
    pub fn start(&mut self) {
        self.request_history();
        self.emit(ClientEvent::GetConversationCollection);
    }

    pub fn handle(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Channel(ChannelEvent::Connect) => self.on_connect(),
            AppEvent::Channel(ChannelEvent::Disconnect) => self.on_disconnect(),
            AppEvent::Channel(ChannelEvent::Error(message)) => {
                self.notify(NotificationLevel::Error, message);
            }
            AppEvent::Channel(ChannelEvent::Server(event)) => self.on_server_event(event),
            AppEvent::Ui(command) => {
                return self.on_command(command);
            }
            AppEvent::InputError(message) => self.notify(NotificationLevel::Error, message),
            AppEvent::DeleteFinished { conversation_id, success } => {
                self.on_delete_finished(&conversation_id, success);
            }
            AppEvent::Tick => {
                let expired = self.view.expire_notifications(
                    Utc::now(),
                    self.settings.notification_ttl
                );
                return if expired { Flow::Redraw } else { Flow::Unchanged };
            }
        }
        Flow::Redraw
    }

    fn on_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected { message } => self.on_connected(&message),
            ServerEvent::Message { content, role } => {
                self.view.push_message(role.unwrap_or(MessageKind::User), &content, None);
            }
            ServerEvent::StreamChunk { chunk, conversation_id } => {
                self.on_stream_chunk(&chunk, &conversation_id);
            }
            ServerEvent::MessageComplete { conversation_id, full_message } => {
                self.on_message_complete(&conversation_id, &full_message);
            }
            ServerEvent::ConversationCreated { conversation_id, title } => {
                self.on_conversation_created(&conversation_id, &title);
            }
            ServerEvent::ConversationHistory { conversation_id, history } => {
                self.on_history(conversation_id.as_deref(), &history);
            }
            ServerEvent::Error { message } => {
                warn!("Server error: {}", message);
                self.notify(NotificationLevel::Error, message);
            }
            ServerEvent::ConversationCollection { collection_name, collections } => {
                self.on_collections(&collection_name, collections);
            }
        }
    }

    fn on_command(&mut self, command: UiCommand) -> Flow {
        match command {
            UiCommand::Send(text) => {
                self.set_input(text);
                self.send_message();
            }
            UiCommand::NewConversation => self.create_conversation(),
            UiCommand::Switch(id) => self.switch_conversation(&id),
            UiCommand::Delete(id) => self.delete_conversation(&id),
            UiCommand::Confirm(answer) => self.confirm(answer),
            UiCommand::Clear => self.clear_conversation(),
            UiCommand::Collection(name) => self.change_collection(&name),
            UiCommand::Suggest(index) => self.apply_suggestion(index),
            UiCommand::Help => self.notify(NotificationLevel::Info, HELP_TEXT),
            UiCommand::Quit => {
                return Flow::Quit;
            }
        }
        Flow::Redraw
    }

    fn on_connect(&mut self) {
        info!("Connected to chat server");
        self.state.connected = true;
        self.view.status = ConnectionStatus::Online;
    }

    fn on_disconnect(&mut self) {
        info!("Disconnected from chat server");
        self.state.connected = false;
        self.view.status = ConnectionStatus::Offline;
    }

    fn on_connected(&mut self, message: &str) {
        if self.state.greeted {
            debug!("Ignoring repeated greeting: {}", message);
            return;
        }
        self.state.greeted = true;
        self.notify(NotificationLevel::Success, message);
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.view.input.set_text(text);
    }

    /// Copies the 1-based suggestion into the input box.
    pub fn apply_suggestion(&mut self, index: usize) {
        let prompt = index
            .checked_sub(1)
            .and_then(|i| self.view.welcome.suggestions.get(i))
            .cloned();
        match prompt {
            Some(prompt) => self.set_input(prompt),
            None => self.notify(NotificationLevel::Error, format!("No suggestion #{}", index)),
        }
    }

    pub fn send_message(&mut self) {
        let message = self.view.input.text.trim().to_string();
        if message.is_empty() || self.state.typing {
            debug!("Send ignored (empty input or reply in progress)");
            return;
        }
        if self.view.input.too_long() {
            debug!(
                "Send ignored: {} characters exceeds {}",
                self.view.input.char_count(),
                self.view.input.max_len
            );
            return;
        }

        self.set_input(String::new());
        self.emit(ClientEvent::ChatMessage {
            message,
            conversation_id: self.state.current_conversation_id.clone(),
            collection_name: self.state.selected_collection.clone(),
        });
        self.view.welcome.visible = false;
    }

    fn on_stream_chunk(&mut self, chunk: &str, conversation_id: &str) {
        if conversation_id != self.state.current_conversation_id {
            debug!("Dropping chunk for inactive conversation {}", conversation_id);
            return;
        }
        if self.view.append_stream_chunk(chunk) {
            self.view.welcome.visible = false;
        }
        self.state.typing = true;
    }

    fn on_message_complete(&mut self, conversation_id: &str, full_message: &str) {
        if conversation_id != self.state.current_conversation_id {
            return;
        }
        self.view.finish_stream();
        self.state.typing = false;
        debug!("Reply complete ({} chars)", full_message.chars().count());
    }

    pub fn create_conversation(&mut self) {
        self.emit(ClientEvent::NewConversation);
    }

    fn on_conversation_created(&mut self, conversation_id: &str, title: &str) {
        info!("Conversation created: {} ({})", conversation_id, title);
        self.view.insert_conversation_front(conversation_id, title);
        self.switch_conversation(conversation_id);
    }

    pub fn switch_conversation(&mut self, conversation_id: &str) {
        if conversation_id == self.state.current_conversation_id {
            return;
        }
        let Some(title) = self.view.activate(conversation_id) else {
            warn!("Cannot switch to unknown conversation {}", conversation_id);
            return;
        };
        self.state.current_conversation_id = conversation_id.to_string();
        self.view.title = title;
        // A reply still streaming for the old conversation can no longer complete here.
        self.view.finish_stream();
        self.state.typing = false;
        self.request_history();
    }

    fn request_history(&mut self) {
        self.state.phase = ViewPhase::AwaitingHistory;
        self.emit(ClientEvent::GetConversationHistory {
            conversation_id: self.state.current_conversation_id.clone(),
        });
    }

    fn on_history(&mut self, conversation_id: Option<&str>, history: &[HistoryEntry]) {
        if let Some(id) = conversation_id {
            if id != self.state.current_conversation_id {
                debug!("Ignoring stale history for {}", id);
                return;
            }
        }
        self.view.replace_messages(history);
        self.state.phase = ViewPhase::Rendered;
    }

    pub fn delete_conversation(&mut self, conversation_id: &str) {
        if self.state.is_protected(conversation_id) {
            self.notify(NotificationLevel::Error, "The default conversation cannot be deleted");
            return;
        }
        if self.settings.assume_yes {
            self.dispatch_delete(conversation_id.to_string());
            return;
        }
        let label = self.view
            .conversation(conversation_id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| conversation_id.to_string());
        self.state.pending_delete = Some(conversation_id.to_string());
        self.view.prompt = Some(format!("Delete conversation '{}'?", label));
    }

    /// Answers the pending delete confirmation.
    pub fn confirm(&mut self, answer: bool) {
        self.view.prompt = None;
        match (self.state.pending_delete.take(), answer) {
            (Some(id), true) => self.dispatch_delete(id),
            (Some(id), false) => debug!("Deletion of {} cancelled", id),
            (None, _) => debug!("Nothing to confirm"),
        }
    }

    fn dispatch_delete(&self, conversation_id: String) {
        info!("Deleting conversation {}", conversation_id);
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let success = match api.delete_conversation(&conversation_id).await {
                Ok(response) => response.success,
                Err(e) => {
                    warn!("Delete of {} failed: {}", conversation_id, e);
                    false
                }
            };
            let _ = events.send(AppEvent::DeleteFinished { conversation_id, success });
        });
    }

    fn on_delete_finished(&mut self, conversation_id: &str, success: bool) {
        if !success {
            debug!("Backend did not delete {}", conversation_id);
            return;
        }
        if !self.view.remove_conversation(conversation_id) {
            debug!("Deleted conversation {} was not listed", conversation_id);
        }
        if conversation_id == self.state.current_conversation_id {
            let default_id = self.state.default_conversation_id.clone();
            self.switch_conversation(&default_id);
        }
        self.notify(NotificationLevel::Success, "Conversation deleted");
    }

    pub fn clear_conversation(&mut self) {
        self.view.clear_messages();
        self.emit(ClientEvent::ClearConversation {
            conversation_id: self.state.current_conversation_id.clone(),
        });
    }

    /// A new collection invalidates the server-side context of the current conversation.
    pub fn change_collection(&mut self, collection_name: &str) {
        if collection_name == self.state.selected_collection {
            return;
        }
        info!("Selected collection: {}", collection_name);
        self.state.selected_collection = collection_name.to_string();
        self.view.collection.value = collection_name.to_string();
        self.emit(ClientEvent::ClearConversation {
            conversation_id: self.state.current_conversation_id.clone(),
        });
    }

    fn on_collections(&mut self, collection_name: &str, collections: Vec<String>) {
        self.view.collection.set_options(collections, collection_name);
        self.state.selected_collection = collection_name.to_string();
    }
}
