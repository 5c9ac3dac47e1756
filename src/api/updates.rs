/// Push notifications from the asset backend
///
/// The backend sends `{"type": "...", "payload": ...}` text frames over a
/// WebSocket. Only `images_updated` matters here: it means the asset list
/// and type tags are stale. A dropped connection is retried forever.

use iced::futures::{SinkExt, Stream, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

/// Wait between reconnection attempts
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// A parsed server push
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    ImagesUpdated,
    /// Any other event type, kept for the log
    Other(String),
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
}

pub fn parse_event(text: &str) -> Result<ServerEvent, serde_json::Error> {
    let event: WireEvent = serde_json::from_str(text)?;
    Ok(match event.kind.as_str() {
        "images_updated" => ServerEvent::ImagesUpdated,
        _ => ServerEvent::Other(event.kind),
    })
}

/// What the update subscription reports to the app
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    Connected,
    Disconnected,
    Server(ServerEvent),
}

/// Connect to `url` and stream its events, reconnecting after drops
pub fn watch(url: String) -> impl Stream<Item = UpdateEvent> {
    iced::stream::channel(16, move |mut output| async move {
        loop {
            match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((mut socket, _)) => {
                    info!("🔌 Connected to {}", url);
                    if output.send(UpdateEvent::Connected).await.is_err() {
                        return;
                    }

                    while let Some(frame) = socket.next().await {
                        match frame {
                            Ok(Message::Text(text)) => match parse_event(&text) {
                                Ok(event) => {
                                    debug!("📨 Server event {:?}", event);
                                    if output.send(UpdateEvent::Server(event)).await.is_err() {
                                        return;
                                    }
                                }
                                Err(e) => warn!("⚠️  Ignoring malformed server event: {}", e),
                            },
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(e) => {
                                warn!("⚠️  WebSocket error: {}", e);
                                break;
                            }
                        }
                    }

                    info!("🔌 Disconnected from {}", url);
                    if output.send(UpdateEvent::Disconnected).await.is_err() {
                        return;
                    }
                }
                Err(e) => debug!("WebSocket connect to {} failed: {}", url, e),
            }

            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_images_updated() {
        assert_eq!(
            parse_event(r#"{"type":"images_updated","payload":null}"#).unwrap(),
            ServerEvent::ImagesUpdated
        );
        assert_eq!(
            parse_event(r#"{"type":"images_updated"}"#).unwrap(),
            ServerEvent::ImagesUpdated
        );
    }

    #[test]
    fn test_parse_other_events() {
        assert_eq!(
            parse_event(r#"{"type":"send_message","payload":{"username":"dm"}}"#).unwrap(),
            ServerEvent::Other("send_message".into())
        );
        assert!(parse_event("hello").is_err());
        assert!(parse_event(r#"{"payload":1}"#).is_err());
    }
}
