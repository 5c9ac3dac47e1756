/// Importing local images into the backend
///
/// "Browse" picks a single file, "Import Folder" walks a whole tree. Every
/// image found is uploaded; anything the backend refuses is counted as
/// skipped so one bad file never stops the rest.

use log::{info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::api::client::{image_mime, ApiClient};

/// Result of an import operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub uploaded: usize,
    pub skipped: usize,
}

/// Every file with an uploadable image extension below `folder`
pub fn collect_images(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| image_mime(path).is_some())
        .collect();
    files.sort();
    files
}

async fn upload_all(client: &ApiClient, files: Vec<PathBuf>) -> ImportResult {
    let mut result = ImportResult::default();

    for path in files {
        match client.upload_image(&path).await {
            Ok(()) => {
                result.uploaded += 1;
                info!("⬆️  Uploaded {}", path.display());
            }
            Err(e) => {
                result.skipped += 1;
                warn!("⚠️  Skipped {}: {}", path.display(), e);
            }
        }
    }

    result
}

/// Upload every image in a folder tree
pub async fn import_folder_async(client: ApiClient, folder: PathBuf) -> ImportResult {
    info!("🔍 Scanning folder: {}", folder.display());

    let scan_root = folder.clone();
    let files = match tokio::task::spawn_blocking(move || collect_images(&scan_root)).await {
        Ok(files) => files,
        Err(e) => {
            warn!("⚠️  Folder scan of {} failed: {}", folder.display(), e);
            Vec::new()
        }
    };

    let result = upload_all(&client, files).await;
    info!("📊 Import summary: {} uploaded, {} skipped", result.uploaded, result.skipped);
    result
}

/// Upload a single picked file
pub async fn import_file_async(client: ApiClient, path: PathBuf) -> ImportResult {
    upload_all(&client, vec![path]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_images_walks_subfolders() {
        let root = std::env::temp_dir().join(format!("dm-display-import-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("maps/caves")).unwrap();

        fs::write(root.join("portrait.JPG"), b"x").unwrap();
        fs::write(root.join("maps/city.png"), b"x").unwrap();
        fs::write(root.join("maps/caves/deep.webp"), b"x").unwrap();
        fs::write(root.join("maps/notes.md"), b"x").unwrap();
        fs::write(root.join("session.nef"), b"x").unwrap();

        let files = collect_images(&root);
        assert_eq!(files.len(), 3);
        assert!(files.contains(&root.join("maps/caves/deep.webp")));
        assert!(!files.contains(&root.join("maps/notes.md")));

        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_rejected_files_are_skipped() {
        let client = ApiClient::new("http://127.0.0.1:9/api/v1").unwrap();
        let result = import_file_async(client, PathBuf::from("/tmp/readme.txt")).await;
        assert_eq!(result, ImportResult { uploaded: 0, skipped: 1 });
    }
}
