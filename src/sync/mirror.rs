/// DM side of screen mirroring
///
/// The Mirror owns the staged layout and the DM's channel endpoint. Every
/// edit goes through it so it can decide when the player must hear about
/// the change:
/// - publish sends `show_layout`, unpublish sends `clear_layout`
/// - moves and zooms on a live layout re-send the whole layout
/// - drops and clears never broadcast, even while live
/// - a closed player window quietly demotes live to staged

use log::{debug, info};

use super::channel::{ChannelEndpoint, ChannelMessage};
use crate::state::layout::{LayoutState, LayoutStatus, LayoutType, ZoomDirection};

/// Banner text when the player answers a sync request with nothing
pub const EMPTY_PLAYER_NOTICE: &str = "Player window is clear. Nothing to sync.";

/// What a message from the player did to the DM's layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The player's layout replaced ours
    Replaced,
    /// The player shows nothing; the layout is untouched
    PlayerEmpty,
    /// Not a message the DM reacts to
    Ignored,
}

#[derive(Debug)]
pub struct Mirror {
    layout: LayoutState,
    endpoint: ChannelEndpoint,
}

impl Mirror {
    /// Start with an empty single layout
    pub fn new(endpoint: ChannelEndpoint) -> Self {
        Self {
            layout: LayoutState::default(),
            endpoint,
        }
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn status(&self) -> LayoutStatus {
        self.layout.status()
    }

    pub fn endpoint(&self) -> &ChannelEndpoint {
        &self.endpoint
    }

    /// Switch grid shape; every slot is emptied
    pub fn set_layout_type(&mut self, layout: LayoutType) {
        self.layout.set_layout(layout);
    }

    pub fn drop_asset(&mut self, slot_id: usize, url: String, image_id: Option<u64>) -> bool {
        self.layout.place(slot_id, url, image_id)
    }

    /// Empty a slot. A live player keeps its view until the next show.
    pub fn clear_slot(&mut self, slot_id: usize) -> bool {
        self.layout.clear(slot_id)
    }

    /// Swap two slots, re-sending the layout when live
    pub fn move_slot(&mut self, source: usize, target: usize) -> bool {
        let moved = self.layout.swap(source, target);
        if moved {
            self.rebroadcast();
        }
        moved
    }

    /// Zoom a slot, re-sending the layout when live
    pub fn zoom(&mut self, slot_id: usize, direction: ZoomDirection) -> bool {
        let zoomed = self.layout.zoom(slot_id, direction);
        if zoomed {
            self.rebroadcast();
        }
        zoomed
    }

    fn rebroadcast(&self) {
        if self.layout.status() == LayoutStatus::Live {
            debug!("🔁 Re-sending live layout");
            self.endpoint.post(&ChannelMessage::ShowLayout(self.layout.clone()));
        }
    }

    /// Show To Players is enabled
    pub fn can_publish(&self) -> bool {
        self.layout.status() == LayoutStatus::Staged
    }

    pub fn publish(&mut self) -> bool {
        match self.layout.publish() {
            Some(snapshot) => {
                info!("📺 Showing {} layout to players", snapshot.layout());
                self.endpoint.post(&ChannelMessage::ShowLayout(snapshot));
                true
            }
            None => false,
        }
    }

    pub fn unpublish(&mut self) -> bool {
        if !self.layout.unpublish() {
            return false;
        }
        info!("🙈 Hiding layout from players");
        self.endpoint.post(&ChannelMessage::ClearLayout);
        true
    }

    /// Show when staged, hide when live
    pub fn toggle_live(&mut self) -> bool {
        match self.layout.status() {
            LayoutStatus::Live => self.unpublish(),
            _ => self.publish(),
        }
    }

    /// Ask the player what it currently shows
    pub fn request_sync(&self) {
        self.endpoint.post(&ChannelMessage::RequestCurrentContent);
    }

    /// React to a message received from the player
    pub fn handle(&mut self, message: ChannelMessage) -> SyncOutcome {
        match message {
            ChannelMessage::ResponseCurrentContent(Some(layout)) => {
                info!("🔄 Synced {} layout from player window", layout.layout());
                self.layout = layout;
                SyncOutcome::Replaced
            }
            ChannelMessage::ResponseCurrentContent(None) | ChannelMessage::ResponseIsEmpty => {
                SyncOutcome::PlayerEmpty
            }
            _ => SyncOutcome::Ignored,
        }
    }

    /// The player window went away. Returns true if live was demoted.
    pub fn player_closed(&mut self) -> bool {
        self.layout.unpublish()
    }

    /// Replace the layout with a restored preset, always staged
    pub fn load(&mut self, layout: LayoutState) {
        self.layout = layout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::notification::{dismiss_after, Notification};
    use crate::sync::channel::{subscribe, Listener};
    use crate::sync::player::PlayerDisplay;
    use std::time::Duration;

    /// A mirror plus a listener that sees everything it posts
    fn setup(name: &str) -> (Mirror, Listener) {
        let mirror = Mirror::new(subscribe(name));
        let spy = subscribe(name).listen();
        (mirror, spy)
    }

    fn drain(listener: &mut Listener) -> Vec<ChannelMessage> {
        std::iter::from_fn(|| listener.try_recv()).collect()
    }

    fn staged_quad(mirror: &mut Mirror) {
        mirror.set_layout_type(LayoutType::Quad);
        mirror.drop_asset(0, "http://host/static/images/a.png".into(), Some(1));
        mirror.drop_asset(3, "http://host/static/images/b.png".into(), Some(2));
    }

    #[test]
    fn test_publish_requires_staged_content() {
        let (mut mirror, mut spy) = setup("test-mirror-publish-guard");

        assert!(!mirror.can_publish());
        assert!(!mirror.publish());
        assert_eq!(mirror.status(), LayoutStatus::Empty);
        assert!(drain(&mut spy).is_empty());

        staged_quad(&mut mirror);
        assert!(mirror.publish());
        assert!(!mirror.publish());
        assert_eq!(drain(&mut spy).len(), 1);
    }

    #[test]
    fn test_show_then_hide_keeps_contents() {
        let (mut mirror, mut spy) = setup("test-mirror-show-hide");
        staged_quad(&mut mirror);
        let staged = mirror.layout().clone();

        assert!(mirror.toggle_live());
        assert_eq!(mirror.status(), LayoutStatus::Live);
        assert!(mirror.toggle_live());
        assert_eq!(mirror.status(), LayoutStatus::Staged);
        assert_eq!(mirror.layout(), &staged);

        let sent = drain(&mut spy);
        assert!(matches!(sent[0], ChannelMessage::ShowLayout(ref l) if l.status() == LayoutStatus::Live));
        assert_eq!(sent[1], ChannelMessage::ClearLayout);
        assert_eq!(sent.len(), 2);
    }

    #[test]
    fn test_quad_scenario() {
        let (mut mirror, mut spy) = setup("test-mirror-quad-scenario");
        mirror.set_layout_type(LayoutType::Quad);

        mirror.drop_asset(2, "http://host/static/images/x.png".into(), Some(5));
        assert_eq!(mirror.status(), LayoutStatus::Staged);
        assert_eq!(
            mirror.layout().slot(2).and_then(|s| s.url.as_deref()),
            Some("http://host/static/images/x.png")
        );

        assert!(mirror.publish());
        assert_eq!(mirror.status(), LayoutStatus::Live);
        match drain(&mut spy).as_slice() {
            [ChannelMessage::ShowLayout(sent)] => {
                assert_eq!(sent.layout(), LayoutType::Quad);
                assert_eq!(sent.slots().len(), 4);
                assert_eq!(sent.slots(), mirror.layout().slots());
            }
            other => panic!("expected one show_layout, got {other:?}"),
        }

        let before = mirror.layout().slots().to_vec();
        assert!(mirror.player_closed());
        assert_eq!(mirror.status(), LayoutStatus::Staged);
        assert_eq!(mirror.layout().slots(), before.as_slice());
        assert!(drain(&mut spy).is_empty());
    }

    #[test]
    fn test_live_edits_rebroadcast_exactly_once() {
        let (mut mirror, mut spy) = setup("test-mirror-rebroadcast");
        staged_quad(&mut mirror);
        mirror.publish();
        drain(&mut spy);

        assert!(mirror.zoom(3, ZoomDirection::In));
        match drain(&mut spy).as_slice() {
            [ChannelMessage::ShowLayout(sent)] => assert_eq!(sent, mirror.layout()),
            other => panic!("expected one show_layout, got {other:?}"),
        }

        assert!(mirror.move_slot(0, 1));
        match drain(&mut spy).as_slice() {
            [ChannelMessage::ShowLayout(sent)] => {
                assert_eq!(sent.slot(1).and_then(|s| s.image_id), Some(1));
                assert_eq!(sent, mirror.layout());
            }
            other => panic!("expected one show_layout, got {other:?}"),
        }

        // Self-move and unknown slots change nothing and send nothing
        assert!(!mirror.move_slot(1, 1));
        assert!(!mirror.zoom(9, ZoomDirection::In));
        assert!(drain(&mut spy).is_empty());
    }

    #[test]
    fn test_staged_edits_stay_local() {
        let (mut mirror, mut spy) = setup("test-mirror-staged-local");
        staged_quad(&mut mirror);
        mirror.zoom(0, ZoomDirection::Out);
        mirror.move_slot(0, 3);
        assert!(drain(&mut spy).is_empty());
    }

    #[test]
    fn test_clear_while_live_does_not_broadcast() {
        let (mut mirror, mut spy) = setup("test-mirror-clear-live");
        staged_quad(&mut mirror);
        mirror.publish();
        drain(&mut spy);

        assert!(mirror.clear_slot(0));
        assert_eq!(mirror.status(), LayoutStatus::Live);
        assert!(drain(&mut spy).is_empty());
    }

    #[test]
    fn test_sync_replaces_layout() {
        let (mut mirror, _spy) = setup("test-mirror-sync-replace");
        let mut theirs = LayoutState::new(LayoutType::Dual);
        theirs.place(1, "http://host/static/images/z.png".into(), Some(8));
        let theirs = theirs.publish().unwrap();

        let outcome = mirror.handle(ChannelMessage::ResponseCurrentContent(Some(theirs.clone())));
        assert_eq!(outcome, SyncOutcome::Replaced);
        assert_eq!(mirror.layout(), &theirs);
        assert_eq!(mirror.status(), LayoutStatus::Live);

        assert_eq!(mirror.handle(ChannelMessage::ClearLayout), SyncOutcome::Ignored);
        assert_eq!(mirror.layout(), &theirs);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_with_empty_player_shows_notice() {
        let name = "test-mirror-sync-empty";
        let (mut mirror, _spy) = setup(name);
        staged_quad(&mut mirror);
        let before = mirror.layout().clone();

        let mut player = PlayerDisplay::new(subscribe(name));
        let mut player_inbox = player.endpoint().listen();
        let mut dm_inbox = mirror.endpoint().listen();

        mirror.request_sync();
        let request = player_inbox.recv().await.unwrap();
        player.handle(request);

        let reply = dm_inbox.recv().await.unwrap();
        assert_eq!(reply, ChannelMessage::ResponseIsEmpty);
        assert_eq!(mirror.handle(reply), SyncOutcome::PlayerEmpty);
        assert_eq!(mirror.layout(), &before);

        let mut banner = Notification::default();
        let generation = banner.show(EMPTY_PLAYER_NOTICE);
        assert_eq!(banner.text(), Some("Player window is clear. Nothing to sync."));

        let expired = dismiss_after(Duration::from_millis(2500), generation).await;
        assert!(banner.dismiss(expired));
        assert!(!banner.is_visible());
        assert_eq!(mirror.layout(), &before);
    }

    #[test]
    fn test_null_response_counts_as_empty() {
        let (mut mirror, _spy) = setup("test-mirror-null-response");
        assert_eq!(
            mirror.handle(ChannelMessage::ResponseCurrentContent(None)),
            SyncOutcome::PlayerEmpty
        );
    }

    #[test]
    fn test_player_closed_when_not_live() {
        let (mut mirror, _spy) = setup("test-mirror-closed-staged");
        staged_quad(&mut mirror);
        assert!(!mirror.player_closed());
        assert_eq!(mirror.status(), LayoutStatus::Staged);
    }
}
