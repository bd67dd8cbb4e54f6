use crate::controller::AppEvent;
use crate::error::{ ClientError, Result };
use crate::models::websocket::{ ChannelEvent, ClientEvent, ServerEvent };
use futures::{ SinkExt, StreamExt };
use log::{ info, warn, error, debug };
use tokio::sync::mpsc::{ UnboundedReceiver, UnboundedSender };
use tokio_tungstenite::{ connect_async, tungstenite::protocol::Message };
use url::Url;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

/// Builds the handshake URL, adding `api_key` to the query when one is configured.
pub fn build_url(server_url: &str, api_key: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(server_url)?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(ClientError::Config(format!("unsupported WebSocket scheme '{}'", other)));
        }
    }
    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
        url.query_pairs_mut().append_pair("api_key", key);
    }
    Ok(url)
}

pub fn encode_event(event: &ClientEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

pub fn decode_event(text: &str) -> Result<ServerEvent> {
    Ok(serde_json::from_str::<ServerEvent>(text)?)
}

fn forward(events: &UnboundedSender<AppEvent>, event: ChannelEvent) -> bool {
    events.send(AppEvent::Channel(event)).is_ok()
}

/// Opens the channel and pumps frames both ways until either side closes.
///
/// Outbound events queued before the handshake completes are sent right after it.
/// Exactly one `Disconnect` is reported when the channel goes away.
pub async fn run_transport(
    url: Url,
    mut outbound: UnboundedReceiver<ClientEvent>,
    events: UnboundedSender<AppEvent>
) -> Result<()> {
    info!("Connecting to {}", redact(&url));
    let websocket = match connect_async(url.as_str()).await {
        Ok((websocket, _response)) => websocket,
        Err(e) => {
            error!("Failed to connect to {}: {}", redact(&url), e);
            forward(&events, ChannelEvent::Error(format!("Connection failed: {}", e)));
            forward(&events, ChannelEvent::Disconnect);
            return Err(e.into());
        }
    };
    info!("WebSocket connected to {}", redact(&url));
    forward(&events, ChannelEvent::Connect);

    let (mut tx, mut rx) = websocket.split();

    let writer = async {
        while let Some(event) = outbound.recv().await {
            let json = match encode_event(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to encode {} event: {}", event.name(), e);
                    continue;
                }
            };
            debug!("-> {}", event.name());
            if let Err(e) = tx.send(Message::Text(json)).await {
                error!("Error sending {} event: {}", event.name(), e);
                return Some(e.to_string());
            }
        }
        info!("Outbound queue closed, closing WebSocket");
        let _ = tx.close().await;
        None
    };

    let reader = async {
        while let Some(msg) = rx.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if text.len() > MAX_MESSAGE_SIZE {
                        warn!(
                            "Dropping frame that exceeds size limit ({} > {})",
                            text.len(),
                            MAX_MESSAGE_SIZE
                        );
                        continue;
                    }
                    match decode_event(&text) {
                        Ok(event) => {
                            if !forward(&events, ChannelEvent::Server(event)) {
                                return None;
                            }
                        }
                        Err(e) => warn!("Failed to parse server event: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    info!("Received close frame from server");
                    return None;
                }
                Ok(Message::Binary(_)) => warn!("Ignoring binary frame from server"),
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => {
                    return match e {
                        | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                        | tokio_tungstenite::tungstenite::Error::AlreadyClosed => {
                            info!("WebSocket connection closed: {}", e);
                            None
                        }
                        tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                            io_err.kind() == std::io::ErrorKind::ConnectionReset
                        => {
                            info!("WebSocket connection reset by server");
                            Some("Connection reset by server".to_string())
                        }
                        _ => {
                            error!("Error receiving frame: {}", e);
                            Some(e.to_string())
                        }
                    };
                }
            }
        }
        None
    };

    let failure = tokio::select! {
        failure = writer => failure,
        failure = reader => failure,
    };
    if let Some(message) = failure {
        forward(&events, ChannelEvent::Error(message));
    }
    forward(&events, ChannelEvent::Disconnect);
    info!("WebSocket session ended");
    Ok(())
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    if url.query_pairs().any(|(k, _)| k == "api_key") {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "api_key" { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), v)
            })
            .collect();
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_appends_api_key() {
        let url = build_url("ws://localhost:5000/ws", Some("s3cret")).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:5000/ws?api_key=s3cret");

        let url = build_url("wss://chat.example.com/ws?lang=en", Some("  ")).unwrap();
        assert_eq!(url.as_str(), "wss://chat.example.com/ws?lang=en");
    }

    #[test]
    fn build_url_rejects_http() {
        assert!(matches!(build_url("http://localhost:5000", None), Err(ClientError::Config(_))));
        assert!(matches!(build_url("::", None), Err(ClientError::Url(_))));
    }

    #[test]
    fn redact_hides_api_key() {
        let url = build_url("ws://localhost/ws?x=1", Some("s3cret")).unwrap();
        let shown = redact(&url);
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("x=1"));
    }

    #[test]
    fn decode_event_reports_json_errors() {
        assert!(matches!(decode_event("{not json"), Err(ClientError::Json(_))));
        assert!(matches!(decode_event(r#"{"event":"unknown_event"}"#), Err(ClientError::Json(_))));
    }
}
