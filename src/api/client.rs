/// HTTP client for the asset backend
///
/// Wraps the REST endpoints for assets, type tags, presets and uploads,
/// and builds the static URLs media files are served from.

use log::{debug, info};
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::state::data::{MediaAsset, NewPreset, PresetLayout};

/// Largest file the backend accepts for upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Only the backend's connect phase is bounded
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not read {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Map a file extension to an upload content type, None if not an image
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    static_root: Url,
    http: Client,
}

impl ApiClient {
    /// Build a client for an API root such as `http://localhost:8080/api/v1`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // Url::join drops the last segment unless the base ends with a slash
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(base_url.to_string(), e.to_string()))?;

        let static_root = Url::parse(&format!("{}/static/", base.origin().ascii_serialization()))
            .map_err(|e| ApiError::InvalidUrl(base_url.to_string(), e.to_string()))?;

        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        Ok(Self {
            base,
            static_root,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(path.to_string(), e.to_string()))
    }

    /// Public URL of a stored file; a leading `public/` is not served
    pub fn static_url(&self, file_path: &str) -> String {
        let relative = file_path
            .trim_start_matches('/')
            .trim_start_matches("public/");
        match self.static_root.join(relative) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.static_root, relative),
        }
    }

    pub fn asset_url(&self, asset: &MediaAsset) -> String {
        self.static_url(&asset.file_path)
    }

    /// Fail on a non-2xx answer, keeping the body for the log
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Distinct type tags known to the backend
    pub async fn list_types(&self) -> Result<Vec<String>, ApiError> {
        let types: Option<Vec<String>> = self.get_json(self.endpoint("images/types")?).await?;
        Ok(types.unwrap_or_default())
    }

    /// All assets, or only those tagged `kind`
    pub async fn list_assets(&self, kind: Option<&str>) -> Result<Vec<MediaAsset>, ApiError> {
        let mut url = self.endpoint("images/images")?;
        if let Some(kind) = kind {
            url.query_pairs_mut().append_pair("type", kind);
        }
        let assets: Option<Vec<MediaAsset>> = self.get_json(url).await?;
        Ok(assets.unwrap_or_default())
    }

    /// Save an asset with a new type tag
    pub async fn update_asset_type(
        &self,
        asset: &MediaAsset,
        kind: &str,
    ) -> Result<MediaAsset, ApiError> {
        let url = self.endpoint(&format!("images/images/{}", asset.id))?;
        let updated = MediaAsset {
            kind: kind.to_string(),
            ..asset.clone()
        };
        debug!("PUT {}", url);
        Self::check(self.http.put(url).json(&updated).send().await?).await?;
        info!("🏷️  Asset {} tagged as {}", asset.name, kind);
        Ok(updated)
    }

    pub async fn list_presets(&self) -> Result<Vec<PresetLayout>, ApiError> {
        let presets: Option<Vec<PresetLayout>> =
            self.get_json(self.endpoint("images/presets")?).await?;
        Ok(presets.unwrap_or_default())
    }

    pub async fn create_preset(&self, preset: &NewPreset) -> Result<PresetLayout, ApiError> {
        let url = self.endpoint("images/presets")?;
        debug!("POST {}", url);
        let response = Self::check(self.http.post(url).json(preset).send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_preset(&self, id: u64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("images/presets/{id}"))?;
        debug!("DELETE {}", url);
        Self::check(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    /// Send a local image to the backend's media folder
    pub async fn upload_image(&self, path: &Path) -> Result<(), ApiError> {
        let display = path.display().to_string();
        let mime = image_mime(path).ok_or_else(|| {
            ApiError::Rejected(format!("{display} is not a jpg, png, gif or webp image"))
        })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Io(display.clone(), e))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Rejected(format!("{display} is larger than 10MB")));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)?;
        let form = multipart::Form::new().part("file", part);

        let url = self.endpoint("images/upload")?;
        debug!("POST {} ({})", url, display);
        Self::check(self.http.post(url).multipart(form).send().await?).await?;
        Ok(())
    }

    /// Ask the backend to rescan its media folder
    pub async fn sync_assets(&self) -> Result<(), ApiError> {
        let url = self.endpoint("images/sync")?;
        Self::check(self.http.get(url).send().await?).await?;
        Ok(())
    }

    /// Download a static media file
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
