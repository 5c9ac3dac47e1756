/// Player side of screen mirroring
///
/// Holds whatever the DM last published and answers the DM's
/// "what are you showing?" requests. It never edits the layout itself.

use log::{debug, info};

use super::channel::{ChannelEndpoint, ChannelMessage};
use crate::state::layout::LayoutState;

#[derive(Debug)]
pub struct PlayerDisplay {
    current: Option<LayoutState>,
    endpoint: ChannelEndpoint,
}

impl PlayerDisplay {
    pub fn new(endpoint: ChannelEndpoint) -> Self {
        Self {
            current: None,
            endpoint,
        }
    }

    /// The layout on screen, None while the placeholder is shown
    pub fn current(&self) -> Option<&LayoutState> {
        self.current.as_ref()
    }

    pub fn endpoint(&self) -> &ChannelEndpoint {
        &self.endpoint
    }

    /// React to a message from the DM. Returns true if the view changed.
    pub fn handle(&mut self, message: ChannelMessage) -> bool {
        match message {
            ChannelMessage::ShowLayout(layout) => {
                info!("📺 Player now shows a {} layout", layout.layout());
                self.current = Some(layout);
                true
            }
            ChannelMessage::ClearLayout => {
                info!("📺 Player back to placeholder");
                self.current = None;
                true
            }
            ChannelMessage::RequestCurrentContent => {
                let reply = match &self.current {
                    Some(layout) => ChannelMessage::ResponseCurrentContent(Some(layout.clone())),
                    None => ChannelMessage::ResponseIsEmpty,
                };
                debug!("↩️  Answering sync request with {}", reply.kind());
                self.endpoint.post(&reply);
                false
            }
            ChannelMessage::ResponseCurrentContent(_) | ChannelMessage::ResponseIsEmpty => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::layout::{LayoutStatus, LayoutType};
    use crate::sync::channel::subscribe;

    fn live_single() -> LayoutState {
        let mut layout = LayoutState::new(LayoutType::Single);
        layout.place(0, "http://host/static/images/a.png".into(), Some(1));
        layout.publish().unwrap()
    }

    #[test]
    fn test_show_and_clear() {
        let mut player = PlayerDisplay::new(subscribe("test-player-show-clear"));
        assert!(player.current().is_none());

        assert!(player.handle(ChannelMessage::ShowLayout(live_single())));
        assert_eq!(player.current().map(LayoutState::status), Some(LayoutStatus::Live));

        assert!(player.handle(ChannelMessage::ClearLayout));
        assert!(player.current().is_none());
    }

    #[test]
    fn test_answers_request_without_changing_view() {
        let name = "test-player-answers";
        let mut player = PlayerDisplay::new(subscribe(name));
        let mut dm = subscribe(name).listen();

        assert!(!player.handle(ChannelMessage::RequestCurrentContent));
        assert_eq!(dm.try_recv(), Some(ChannelMessage::ResponseIsEmpty));

        let layout = live_single();
        player.handle(ChannelMessage::ShowLayout(layout.clone()));
        assert!(!player.handle(ChannelMessage::RequestCurrentContent));
        assert_eq!(
            dm.try_recv(),
            Some(ChannelMessage::ResponseCurrentContent(Some(layout.clone())))
        );
        assert_eq!(player.current(), Some(&layout));
    }

    #[test]
    fn test_ignores_responses() {
        let mut player = PlayerDisplay::new(subscribe("test-player-ignores"));
        assert!(!player.handle(ChannelMessage::ResponseIsEmpty));
        assert!(!player.handle(ChannelMessage::ResponseCurrentContent(Some(live_single()))));
        assert!(player.current().is_none());
    }
}
