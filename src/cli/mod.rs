pub mod command;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Connection Args ---
    /// WebSocket endpoint of the chat server (ws:// or wss://)
    #[arg(long, env = "SERVER_URL", default_value = "ws://127.0.0.1:5000/ws")]
    pub server_url: String,

    /// Base URL for the REST API (conversation deletion)
    #[arg(long, env = "API_BASE_URL", default_value = "http://127.0.0.1:5000")]
    pub api_base_url: String,

    /// Optional API key sent as the `api_key` query parameter on the WebSocket handshake.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    /// Timeout in seconds for REST requests.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    // --- Chat Args ---
    /// Knowledge collection selected until the server reports its own choice.
    #[arg(long, env = "DEFAULT_COLLECTION", default_value = "test")]
    pub default_collection: String,

    /// Maximum message length in characters; longer input cannot be sent.
    #[arg(long, env = "MAX_MESSAGE_LEN", default_value = "2000")]
    pub max_message_len: usize,

    /// Title shown for the default conversation in the side list.
    #[arg(long, env = "DEFAULT_CONVERSATION_TITLE", default_value = "Default conversation")]
    pub default_conversation_title: String,

    /// Comma separated prompts offered on the welcome panel.
    #[arg(
        long,
        env = "SUGGESTIONS",
        value_delimiter = ',',
        default_value = "Tender document requirements,General provisions"
    )]
    pub suggestions: Vec<String>,

    // --- Terminal Args ---
    /// How long notifications stay visible, in milliseconds.
    #[arg(long, env = "NOTIFICATION_TTL_MS", default_value = "3000")]
    pub notification_ttl_ms: u64,

    /// Delete conversations without asking for confirmation.
    #[arg(short = 'y', long, env = "ASSUME_YES", default_value = "false")]
    pub assume_yes: bool,

    /// Append each frame instead of clearing the screen before rendering.
    #[arg(long, env = "NO_CLEAR", default_value = "false")]
    pub no_clear: bool,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
