/// Disk cache for static media
///
/// Each URL is downloaded once into the media directory under a name
/// derived from the URL, and a thumbnail is produced alongside. The
/// SQLite catalog remembers which file belongs to which URL.
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use super::thumbnail::generate_thumbnail;
use super::MediaError;
use crate::api::client::ApiClient;

/// Where cached media and thumbnails are written
#[derive(Debug, Clone, PartialEq)]
pub struct CacheDirs {
    pub media: PathBuf,
    pub thumbnails: PathBuf,
}

impl CacheDirs {
    /// Cache under the user cache directory
    /// (~/.cache/dm-display on Linux), falling back to the temp dir
    pub fn new() -> Result<Self, MediaError> {
        let root = dirs_next::cache_dir()
            .or_else(dirs_next::home_dir)
            .map(|path| path.join("dm-display"))
            .unwrap_or_else(|| std::env::temp_dir().join("dm-display"));
        Self::at(&root)
    }

    /// Cache under an explicit root, creating the directories
    pub fn at(root: &Path) -> Result<Self, MediaError> {
        let dirs = Self {
            media: root.join("media"),
            thumbnails: root.join("thumbnails"),
        };
        for dir in [&dirs.media, &dirs.thumbnails] {
            fs::create_dir_all(dir).map_err(|e| MediaError::Io(dir.clone(), e))?;
        }
        Ok(dirs)
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// File stem for a URL: 64-bit FNV-1a of its bytes, so a name written by
/// one build is found again by the next
pub fn cache_stem(url: &str) -> String {
    let hash = url
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME));
    format!("{:016x}", hash)
}

/// Extension of the file the URL points to, "img" when unknown
fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .unwrap_or_else(|| "img".to_string())
}

/// A media file now available on disk
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedMedia {
    pub cache_path: PathBuf,
    /// None when the file could not be decoded into a thumbnail
    pub thumbnail_path: Option<PathBuf>,
}

/// Download `url` into the cache and build its thumbnail
pub async fn fetch_media(
    client: ApiClient,
    dirs: CacheDirs,
    url: String,
) -> Result<FetchedMedia, MediaError> {
    let bytes = client.fetch_bytes(&url).await?;

    // Writing and decoding are blocking, keep them off the UI executor
    tokio::task::spawn_blocking(move || store_blocking(&dirs, url, &bytes)).await?
}

/// Write downloaded bytes and their thumbnail
pub fn store_blocking(
    dirs: &CacheDirs,
    url: String,
    bytes: &[u8],
) -> Result<FetchedMedia, MediaError> {
    let stem = cache_stem(&url);
    let cache_path = dirs.media.join(format!("{}.{}", stem, url_extension(&url)));
    fs::write(&cache_path, bytes).map_err(|e| MediaError::Io(cache_path.clone(), e))?;

    let thumbnail_path = match generate_thumbnail(bytes, &dirs.thumbnails, &stem) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("⚠️  No thumbnail for {}: {}", url, e);
            None
        }
    };

    Ok(FetchedMedia {
        cache_path,
        thumbnail_path,
    })
}

fn modified_before(entry: &walkdir::DirEntry, cutoff: SystemTime) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|meta| meta.modified().ok())
        .is_some_and(|modified| modified < cutoff)
}

/// Delete cached files the catalog no longer knows about.
///
/// `known` is a snapshot taken at `cutoff`; files written since then may
/// simply not be catalogued yet and are left alone. Returns the number
/// of files removed.
pub fn prune_orphans(dirs: &CacheDirs, known: &HashSet<PathBuf>, cutoff: SystemTime) -> usize {
    let mut removed = 0;

    for root in [&dirs.media, &dirs.thumbnails] {
        for entry in WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if known.contains(entry.path()) || !modified_before(&entry, cutoff) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!("⚠️  Could not remove {}: {}", entry.path().display(), e),
            }
        }
    }

    if removed > 0 {
        info!("🧹 Removed {} orphaned cache files", removed);
    }
    removed
}
