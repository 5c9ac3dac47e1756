/// Media handling module
///
/// This module handles:
/// - Downloading static media into a disk cache
/// - Generating thumbnails for the asset bar
/// - Keeping image handles for the windows
/// - Uploading local images to the backend

use std::path::PathBuf;
use thiserror::Error;

use crate::api::client::ApiError;

pub mod cache;
pub mod import;
pub mod store;
pub mod thumbnail;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("download failed: {0}")]
    Api(#[from] ApiError),
    #[error("could not write {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
