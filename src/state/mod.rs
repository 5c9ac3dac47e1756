/// State management module
/// 
/// This module handles all application state, including:
/// - The mirrored layout model and its lifecycle (layout.rs)
/// - Backend data structures (data.rs)
/// - Saving and restoring presets (preset.rs)
/// - The media cache catalog (library.rs)
/// - The transient staging banner (notification.rs)

pub mod data;
pub mod layout;
pub mod library;
pub mod notification;
pub mod preset;
