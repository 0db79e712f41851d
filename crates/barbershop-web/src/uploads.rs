//! Barber photo storage on the local filesystem.

use std::path::{Path, PathBuf};

use database::validation::validate_photo_upload;
use tracing::{info, warn};

use crate::error::{Result, WebError};

/// Path prefix under which photos are served and recorded on the barber row.
pub const PHOTO_URL_PREFIX: &str = "images/barber/";

/// Directory holding uploaded barber photos.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and write an uploaded photo.
    ///
    /// Returns the path to record on the barber, `images/barber/<stored name>`.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        validate_photo_upload(file_name, bytes.len() as u64)?;

        let stored = stored_name(file_name, chrono::Utc::now().timestamp_millis());
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| WebError::Internal(format!("Failed to create photo directory: {}", e)))?;
        tokio::fs::write(self.dir.join(&stored), bytes)
            .await
            .map_err(|e| WebError::Internal(format!("Failed to store photo {}: {}", stored, e)))?;

        info!(file = %stored, bytes = bytes.len(), "Stored barber photo");
        Ok(format!("{}{}", PHOTO_URL_PREFIX, stored))
    }

    /// Delete a previously stored photo. Failures are logged and swallowed.
    pub async fn remove(&self, photo: &str) {
        let Some(name) = file_name_of(photo) else {
            warn!(photo, "Refusing to delete photo outside the upload directory");
            return;
        };

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => info!(photo, "Deleted barber photo"),
            Err(e) => warn!(photo, error = %e, "Failed to delete barber photo"),
        }
    }
}

/// On-disk name for an upload: `<unix millis>_<original name>`.
pub fn stored_name(file_name: &str, millis: i64) -> String {
    format!("{}_{}", millis, file_name.trim())
}

/// File name part of a recorded photo path, if it points into the upload
/// directory.
fn file_name_of(photo: &str) -> Option<&str> {
    let name = photo.strip_prefix(PHOTO_URL_PREFIX)?;
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name(" cut.png ", 1700000000000), "1700000000000_cut.png");
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("images/barber/1_a.png"), Some("1_a.png"));
        assert_eq!(file_name_of("images/barber/../secret.png"), None);
        assert_eq!(file_name_of("images/barber/"), None);
        assert_eq!(file_name_of("/etc/passwd"), None);
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = std::env::temp_dir().join(format!("barbershop_photos_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = PhotoStore::new(&dir);

        let photo = store.save("cut.PNG", b"not really a png").await.unwrap();
        assert!(photo.starts_with(PHOTO_URL_PREFIX));
        assert!(photo.ends_with("_cut.PNG"));

        let on_disk = dir.join(file_name_of(&photo).unwrap());
        assert!(on_disk.exists());

        store.remove(&photo).await;
        assert!(!on_disk.exists());

        // A second removal only logs.
        store.remove(&photo).await;

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_save_rejects_bad_uploads() {
        let dir = std::env::temp_dir().join(format!("barbershop_rejects_{}", std::process::id()));
        let store = PhotoStore::new(&dir);

        assert!(matches!(
            store.save("notes.txt", b"hello").await,
            Err(WebError::Validation(_))
        ));
        assert!(matches!(
            store.save("../cut.png", b"hello").await,
            Err(WebError::Validation(_))
        ));
        assert!(!dir.exists());
    }
}
