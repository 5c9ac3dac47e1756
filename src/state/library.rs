use chrono::Utc;
use log::info;
use rusqlite::{Connection, OptionalExtension, Result as SqlResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::data::CachedMedia;

/// Errors raised while opening the media catalog
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("could not determine the user data directory")]
    NoDataDir,
    #[error("failed to create {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

/// The MediaLibrary manages the SQLite catalog of downloaded media.
/// It maps every static media URL to its copy in the disk cache,
/// plus the thumbnail generated for the asset bar.
pub struct MediaLibrary {
    conn: Connection,
    db_path: PathBuf,
}

impl MediaLibrary {
    /// Open the catalog in the user's data directory.
    ///
    /// - Linux: ~/.local/share/dm-display/media_cache.db
    /// - macOS: ~/Library/Application Support/dm-display/media_cache.db
    /// - Windows: %APPDATA%\dm-display\media_cache.db
    pub fn new() -> Result<Self, LibraryError> {
        let db_path = Self::get_db_path().ok_or(LibraryError::NoDataDir)?;

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LibraryError::CreateDir(parent.to_path_buf(), e))?;
        }

        let library = Self::open_at(&db_path)?;
        info!("📁 Media catalog initialized at: {}", library.path().display());
        Ok(library)
    }

    /// Open (or create) a catalog at an explicit path
    pub fn open_at(path: &Path) -> SqlResult<Self> {
        let conn = Connection::open(path)?;
        let mut library = MediaLibrary {
            conn,
            db_path: path.to_path_buf(),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Catalog that lives only as long as the process
    pub fn in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        let mut library = MediaLibrary {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Get the path where the database should be stored
    fn get_db_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("dm-display");
        path.push("media_cache.db");
        Some(path)
    }

    /// Create the media table and its index if they don't exist
    fn init_schema(&mut self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS media (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                url             TEXT NOT NULL UNIQUE,
                cache_path      TEXT NOT NULL,
                thumbnail_path  TEXT,
                fetched_at      INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_media_fetched_at
             ON media(fetched_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Get a count of cached media files
    pub fn media_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))
    }

    /// Find the cached copy of a URL
    pub fn lookup(&self, url: &str) -> SqlResult<Option<CachedMedia>> {
        self.conn
            .query_row(
                "SELECT url, cache_path, thumbnail_path, fetched_at FROM media WHERE url = ?1",
                [url],
                |row| {
                    Ok(CachedMedia {
                        url: row.get(0)?,
                        cache_path: row.get(1)?,
                        thumbnail_path: row.get(2)?,
                        fetched_at: row.get(3)?,
                    })
                },
            )
            .optional()
    }

    /// Remember where a URL was downloaded to.
    /// A fresh download invalidates the previous thumbnail.
    pub fn record(&self, url: &str, cache_path: &Path) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO media (url, cache_path, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET
                cache_path = excluded.cache_path,
                thumbnail_path = NULL,
                fetched_at = excluded.fetched_at",
            rusqlite::params![url, cache_path.to_string_lossy(), Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Store the thumbnail generated for a cached URL
    pub fn set_thumbnail(&self, url: &str, thumbnail_path: &Path) -> SqlResult<()> {
        self.conn.execute(
            "UPDATE media SET thumbnail_path = ?1 WHERE url = ?2",
            rusqlite::params![thumbnail_path.to_string_lossy(), url],
        )?;
        Ok(())
    }

    /// Every file the catalog still points at
    pub fn known_files(&self) -> SqlResult<HashSet<PathBuf>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cache_path, thumbnail_path FROM media")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut files = HashSet::new();
        for row in rows {
            let (cache_path, thumbnail_path) = row?;
            files.insert(PathBuf::from(cache_path));
            if let Some(thumbnail_path) = thumbnail_path {
                files.insert(PathBuf::from(thumbnail_path));
            }
        }
        Ok(files)
    }

    /// Verify cached files actually exist on disk.
    /// Rows whose file disappeared are removed so the URL is fetched again;
    /// rows that only lost their thumbnail get it regenerated later.
    pub fn verify_files(&self) -> SqlResult<usize> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, cache_path, thumbnail_path FROM media")?;

        let cached: Vec<(i64, String, Option<String>)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .filter_map(|r| r.ok())
            .collect();

        let mut removed = 0;
        for (id, cache_path, thumbnail_path) in cached {
            if !Path::new(&cache_path).exists() {
                self.conn
                    .execute("DELETE FROM media WHERE id = ?1", rusqlite::params![id])?;
                removed += 1;
            } else if let Some(thumbnail_path) = thumbnail_path {
                if !Path::new(&thumbnail_path).exists() {
                    self.conn.execute(
                        "UPDATE media SET thumbnail_path = NULL WHERE id = ?1",
                        rusqlite::params![id],
                    )?;
                }
            }
        }

        if removed > 0 {
            info!("🔄 Dropped {} cached media entries whose file is missing", removed);
        }

        Ok(removed)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for MediaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLibrary")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dm-display-library-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn test_record_and_lookup() {
        let library = MediaLibrary::in_memory().unwrap();
        assert_eq!(library.media_count().unwrap(), 0);
        assert!(library.lookup("http://h/static/a.png").unwrap().is_none());

        library
            .record("http://h/static/a.png", Path::new("/cache/a.png"))
            .unwrap();
        library
            .set_thumbnail("http://h/static/a.png", Path::new("/cache/thumbs/a.jpg"))
            .unwrap();

        let cached = library.lookup("http://h/static/a.png").unwrap().unwrap();
        assert_eq!(cached.cache_path, "/cache/a.png");
        assert_eq!(cached.thumbnail_path.as_deref(), Some("/cache/thumbs/a.jpg"));
        assert_eq!(library.media_count().unwrap(), 1);
    }

    #[test]
    fn test_record_again_resets_thumbnail() {
        let library = MediaLibrary::in_memory().unwrap();
        library.record("u", Path::new("/cache/1.png")).unwrap();
        library.set_thumbnail("u", Path::new("/cache/t.jpg")).unwrap();
        library.record("u", Path::new("/cache/2.png")).unwrap();

        let cached = library.lookup("u").unwrap().unwrap();
        assert_eq!(cached.cache_path, "/cache/2.png");
        assert!(cached.thumbnail_path.is_none());
        assert_eq!(library.media_count().unwrap(), 1);
    }

    #[test]
    fn test_verify_files_drops_missing() {
        let library = MediaLibrary::in_memory().unwrap();
        let present = temp_file("present.png");
        library.record("present", &present).unwrap();
        library
            .set_thumbnail("present", Path::new("/nonexistent/thumb.jpg"))
            .unwrap();
        library
            .record("gone", Path::new("/nonexistent/gone.png"))
            .unwrap();

        assert_eq!(library.verify_files().unwrap(), 1);
        assert!(library.lookup("gone").unwrap().is_none());
        let kept = library.lookup("present").unwrap().unwrap();
        assert!(kept.thumbnail_path.is_none());

        let files = library.known_files().unwrap();
        assert!(files.contains(&present));
        assert_eq!(files.len(), 1);
    }
}
