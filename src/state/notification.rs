/// Transient banner shown on top of the staging area
///
/// Every `show` bumps a generation counter. The dismiss timer carries the
/// generation it was started for, so an old timer never hides a newer
/// message.

use std::time::Duration;

#[derive(Debug, Default)]
pub struct Notification {
    text: Option<String>,
    visible: bool,
    generation: u64,
}

impl Notification {
    /// Show a message and return the generation to dismiss later
    pub fn show(&mut self, text: impl Into<String>) -> u64 {
        self.generation += 1;
        self.text = Some(text.into());
        self.visible = true;
        self.generation
    }

    /// Hide the banner if no newer message was shown since `generation`
    pub fn dismiss(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The last message, kept after hiding so the banner can fade out
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Wait for the banner timeout, then hand back the generation to dismiss
pub async fn dismiss_after(timeout: Duration, generation: u64) -> u64 {
    tokio::time::sleep(timeout).await;
    generation
}
