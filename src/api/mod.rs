/// Asset backend access
///
/// - REST client for assets, presets and uploads (client.rs)
/// - WebSocket push notifications (updates.rs)

pub mod client;
pub mod updates;
