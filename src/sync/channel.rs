/// Named message bus shared by every window of the process
///
/// Each window subscribes to a channel by name and gets an endpoint.
/// A post is serialized to JSON and delivered to every *other* listener
/// currently attached to the same name. Nothing is shared between the
/// windows except that serialized text.
///
/// Delivery is at-most-once and FIFO per sender. A message posted while
/// nobody listens is dropped.

use iced::futures::{SinkExt, Stream};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::state::layout::LayoutState;

/// Messages a listener can fall behind by before losing the oldest ones
pub const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("malformed message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("unknown message type `{0}`")]
    UnknownType(String),
    #[error("`{0}` needs a payload")]
    MissingPayload(&'static str),
}

/// Everything the DM and player windows say to each other
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// Publish a full layout to the player
    ShowLayout(LayoutState),
    /// Player goes back to its placeholder
    ClearLayout,
    /// DM asks what the player currently shows
    RequestCurrentContent,
    /// Player's answer, None when it shows nothing
    ResponseCurrentContent(Option<LayoutState>),
    /// Player has nothing to show
    ResponseIsEmpty,
}

/// JSON shape on the bus: `{"type": "...", "payload": ...}`
#[derive(Serialize, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl ChannelMessage {
    /// Wire discriminant of this message
    pub fn kind(&self) -> &'static str {
        match self {
            ChannelMessage::ShowLayout(_) => "show_layout",
            ChannelMessage::ClearLayout => "clear_layout",
            ChannelMessage::RequestCurrentContent => "request_current_content",
            ChannelMessage::ResponseCurrentContent(_) => "response_current_content",
            ChannelMessage::ResponseIsEmpty => "response_is_empty",
        }
    }

    pub fn encode(&self) -> Result<String, ChannelError> {
        let payload = match self {
            ChannelMessage::ShowLayout(layout)
            | ChannelMessage::ResponseCurrentContent(Some(layout)) => {
                Some(serde_json::to_value(layout).map_err(ChannelError::Encode)?)
            }
            _ => None,
        };

        let wire = WireMessage {
            kind: self.kind().to_string(),
            payload,
        };
        serde_json::to_string(&wire).map_err(ChannelError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        let wire: WireMessage = serde_json::from_str(text).map_err(ChannelError::Decode)?;

        let layout = |payload: Value| {
            serde_json::from_value::<LayoutState>(payload).map_err(ChannelError::Decode)
        };

        match wire.kind.as_str() {
            "show_layout" => {
                let payload = wire.payload.ok_or(ChannelError::MissingPayload("show_layout"))?;
                Ok(ChannelMessage::ShowLayout(layout(payload)?))
            }
            "clear_layout" => Ok(ChannelMessage::ClearLayout),
            "request_current_content" => Ok(ChannelMessage::RequestCurrentContent),
            "response_current_content" => Ok(ChannelMessage::ResponseCurrentContent(
                wire.payload.map(layout).transpose()?,
            )),
            "response_is_empty" => Ok(ChannelMessage::ResponseIsEmpty),
            _ => Err(ChannelError::UnknownType(wire.kind)),
        }
    }
}

/// A serialized post tagged with the endpoint that sent it
#[derive(Debug, Clone)]
struct Envelope {
    sender: u64,
    body: Arc<str>,
}

type Registry = Mutex<HashMap<String, broadcast::Sender<Envelope>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::default)
}

static NEXT_ENDPOINT: AtomicU64 = AtomicU64::new(1);

/// Join the bus under `name`
pub fn subscribe(name: &str) -> ChannelEndpoint {
    let mut channels = registry().lock().unwrap_or_else(PoisonError::into_inner);
    let tx = channels
        .entry(name.to_string())
        .or_insert_with(|| broadcast::channel(QUEUE_CAPACITY).0)
        .clone();

    ChannelEndpoint {
        name: name.to_string(),
        id: NEXT_ENDPOINT.fetch_add(1, Ordering::Relaxed),
        tx,
    }
}

/// One window's handle on a named channel
#[derive(Debug, Clone)]
pub struct ChannelEndpoint {
    name: String,
    id: u64,
    tx: broadcast::Sender<Envelope>,
}

impl ChannelEndpoint {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deliver a message to every other attached listener.
    /// Failures are logged, never raised to the caller.
    pub fn post(&self, message: &ChannelMessage) {
        let body = match message.encode() {
            Ok(body) => body,
            Err(e) => {
                error!("❌ Could not send {} on {}: {}", message.kind(), self.name, e);
                return;
            }
        };

        let envelope = Envelope {
            sender: self.id,
            body: body.into(),
        };

        // No receiver attached: the message is simply dropped
        if self.tx.send(envelope).is_err() {
            debug!("📭 {} posted on {} with nobody listening", message.kind(), self.name);
        }
    }

    /// Start receiving. Only posts made after this call are delivered.
    pub fn listen(&self) -> Listener {
        Listener {
            name: self.name.clone(),
            id: self.id,
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving side of an endpoint; dropping it detaches from the channel
pub struct Listener {
    name: String,
    id: u64,
    rx: broadcast::Receiver<Envelope>,
}

impl Listener {
    /// Wait for the next message from another endpoint
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => {
                    if let Some(message) = self.accept(envelope) {
                        return Some(message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("⚠️  Listener on {} lost {} messages", self.name, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next message if one is already queued
    #[cfg(test)]
    pub fn try_recv(&mut self) -> Option<ChannelMessage> {
        use broadcast::error::TryRecvError;

        loop {
            match self.rx.try_recv() {
                Ok(envelope) => {
                    if let Some(message) = self.accept(envelope) {
                        return Some(message);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("⚠️  Listener on {} lost {} messages", self.name, skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    fn accept(&self, envelope: Envelope) -> Option<ChannelMessage> {
        if envelope.sender == self.id {
            return None;
        }
        match ChannelMessage::decode(&envelope.body) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("⚠️  Dropping message on {}: {}", self.name, e);
                None
            }
        }
    }
}

/// What a window's channel subscription produces
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The listener is attached, posts from now on will arrive
    Listening,
    Received(ChannelMessage),
}

/// Stream of channel events for an iced subscription
pub fn listen_stream(endpoint: ChannelEndpoint) -> impl Stream<Item = ChannelEvent> {
    iced::stream::channel(QUEUE_CAPACITY, move |mut output| async move {
        let mut listener = endpoint.listen();

        if output.send(ChannelEvent::Listening).await.is_err() {
            return;
        }

        while let Some(message) = listener.recv().await {
            if output.send(ChannelEvent::Received(message)).await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::layout::LayoutType;

    fn live_layout() -> LayoutState {
        let mut layout = LayoutState::new(LayoutType::Dual);
        layout.place(1, "http://host/static/images/map.png".into(), Some(3));
        layout.publish().unwrap()
    }

    #[test]
    fn test_wire_format() {
        let text = ChannelMessage::ClearLayout.encode().unwrap();
        assert_eq!(text, r#"{"type":"clear_layout"}"#);

        let text = ChannelMessage::ShowLayout(live_layout()).encode().unwrap();
        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "show_layout");
        assert_eq!(json["payload"]["status"], "live");
        assert_eq!(json["payload"]["slots"][1]["imageId"], 3);
    }

    #[test]
    fn test_decode_null_response_as_empty() {
        let message =
            ChannelMessage::decode(r#"{"type":"response_current_content","payload":null}"#)
                .unwrap();
        assert_eq!(message, ChannelMessage::ResponseCurrentContent(None));

        let message = ChannelMessage::decode(r#"{"type":"response_current_content"}"#).unwrap();
        assert_eq!(message, ChannelMessage::ResponseCurrentContent(None));
    }

    #[test]
    fn test_decode_rejects_bad_messages() {
        assert!(matches!(
            ChannelMessage::decode(r#"{"type":"dance"}"#),
            Err(ChannelError::UnknownType(kind)) if kind == "dance"
        ));
        assert!(matches!(
            ChannelMessage::decode(r#"{"type":"show_layout"}"#),
            Err(ChannelError::MissingPayload(_))
        ));
        assert!(matches!(
            ChannelMessage::decode(r#"{"type":"show_layout","payload":{"layout":"quad","status":"live","slots":[]}}"#),
            Err(ChannelError::Decode(_))
        ));
        assert!(matches!(ChannelMessage::decode("not json"), Err(ChannelError::Decode(_))));
    }

    #[test]
    fn test_post_reaches_others_not_self() {
        let dm = subscribe("test-post-reaches-others");
        let player = subscribe("test-post-reaches-others");
        let mut dm_inbox = dm.listen();
        let mut player_inbox = player.listen();

        dm.post(&ChannelMessage::RequestCurrentContent);

        assert_eq!(player_inbox.try_recv(), Some(ChannelMessage::RequestCurrentContent));
        assert_eq!(player_inbox.try_recv(), None);
        assert_eq!(dm_inbox.try_recv(), None);
    }

    #[test]
    fn test_channels_are_isolated_by_name() {
        let a = subscribe("test-isolated-a");
        let b = subscribe("test-isolated-b");
        let mut b_inbox = b.listen();

        a.post(&ChannelMessage::ClearLayout);
        assert_eq!(b_inbox.try_recv(), None);
    }

    #[test]
    fn test_post_before_listening_is_dropped() {
        let dm = subscribe("test-dropped-before-listen");
        let player = subscribe("test-dropped-before-listen");

        dm.post(&ChannelMessage::ClearLayout);
        let mut inbox = player.listen();
        assert_eq!(inbox.try_recv(), None);
    }

    #[tokio::test]
    async fn test_fifo_per_sender() {
        let dm = subscribe("test-fifo");
        let player = subscribe("test-fifo");
        let mut inbox = player.listen();

        let layout = live_layout();
        dm.post(&ChannelMessage::ShowLayout(layout.clone()));
        dm.post(&ChannelMessage::ClearLayout);
        dm.post(&ChannelMessage::RequestCurrentContent);

        assert_eq!(inbox.recv().await, Some(ChannelMessage::ShowLayout(layout)));
        assert_eq!(inbox.recv().await, Some(ChannelMessage::ClearLayout));
        assert_eq!(inbox.recv().await, Some(ChannelMessage::RequestCurrentContent));
    }
}
