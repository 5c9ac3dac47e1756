/// Screen mirroring between the DM window and the player window
///
/// - Named message bus between windows (channel.rs)
/// - Player window lifecycle and liveness polling (popup.rs)
/// - DM side: staged layout and what to broadcast (mirror.rs)
/// - Player side: shown layout and sync replies (player.rs)

pub mod channel;
pub mod mirror;
pub mod player;
pub mod popup;
