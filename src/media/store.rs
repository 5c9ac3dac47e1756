use iced::widget::image::Handle;
use std::collections::HashMap;
use std::path::Path;

/// Loading state of one media URL
#[derive(Debug, Clone)]
pub enum MediaEntry {
    Loading,
    Ready {
        full: Handle,
        thumbnail: Option<Handle>,
    },
    Failed,
}

/// Image handles the windows render from, keyed by media URL
#[derive(Debug, Default)]
pub struct MediaStore {
    entries: HashMap<String, MediaEntry>,
}

impl MediaStore {
    pub fn get(&self, url: &str) -> Option<&MediaEntry> {
        self.entries.get(url)
    }

    #[cfg(test)]
    pub fn full(&self, url: &str) -> Option<&Handle> {
        match self.entries.get(url) {
            Some(MediaEntry::Ready { full, .. }) => Some(full),
            _ => None,
        }
    }

    /// Thumbnail, or the full image when no thumbnail could be made
    pub fn thumbnail(&self, url: &str) -> Option<&Handle> {
        match self.entries.get(url) {
            Some(MediaEntry::Ready { thumbnail, full }) => Some(thumbnail.as_ref().unwrap_or(full)),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_loading(&self, url: &str) -> bool {
        matches!(self.entries.get(url), Some(MediaEntry::Loading))
    }

    /// Mark a URL as loading. Returns true if a download should start.
    pub fn begin(&mut self, url: &str) -> bool {
        match self.entries.get(url) {
            Some(MediaEntry::Loading) | Some(MediaEntry::Ready { .. }) => false,
            Some(MediaEntry::Failed) | None => {
                self.entries.insert(url.to_string(), MediaEntry::Loading);
                true
            }
        }
    }

    pub fn ready(&mut self, url: &str, cache_path: &Path, thumbnail_path: Option<&Path>) {
        self.entries.insert(
            url.to_string(),
            MediaEntry::Ready {
                full: Handle::from_path(cache_path),
                thumbnail: thumbnail_path.map(Handle::from_path),
            },
        );
    }

    /// Ready from memory, for when there is no disk cache to write to
    pub fn ready_bytes(&mut self, url: &str, bytes: Vec<u8>) {
        self.entries.insert(
            url.to_string(),
            MediaEntry::Ready {
                full: Handle::from_bytes(bytes),
                thumbnail: None,
            },
        );
    }

    pub fn failed(&mut self, url: &str) {
        self.entries.insert(url.to_string(), MediaEntry::Failed);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
