use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

/// Bucket every screenshot and strategy chart lives in.
pub const BUCKET: &str = "trade-screenshots";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid object owner: {0}")]
    InvalidOwner(String),
}

/// What an uploaded image is attached to; decides its object name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Screenshot,
    StrategyChart,
}

/// Object storage for trade images, backed by a local directory that the
/// router serves under `/storage`.
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    root: PathBuf,
    public_base_url: String,
}

impl ScreenshotStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<user_id>/<timestamp>.<ext>` or `<user_id>/strategy-chart-<timestamp>.<ext>`
    pub fn object_path(
        user_id: &str,
        kind: ImageKind,
        timestamp_ms: i64,
        file_name: &str,
    ) -> Result<String, StorageError> {
        let valid_owner = !user_id.is_empty()
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_owner {
            return Err(StorageError::InvalidOwner(user_id.to_string()));
        }

        let ext = extension(file_name);
        let name = match kind {
            ImageKind::Screenshot => format!("{timestamp_ms}.{ext}"),
            ImageKind::StrategyChart => format!("strategy-chart-{timestamp_ms}.{ext}"),
        };

        Ok(format!("{user_id}/{name}"))
    }

    pub fn public_url(&self, object_path: &str) -> String {
        format!("{}/storage/{BUCKET}/{object_path}", self.public_base_url)
    }

    /// Store the image and return its public URL.
    pub async fn upload(
        &self,
        user_id: &str,
        kind: ImageKind,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let object_path =
            Self::object_path(user_id, kind, Utc::now().timestamp_millis(), file_name)?;
        let full_path = self.root.join(BUCKET).join(&object_path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, bytes).await?;

        tracing::info!(
            user_id,
            path = %object_path,
            size = bytes.len(),
            "Trade image stored"
        );

        Ok(self.public_url(&object_path))
    }
}

/// Lower-cased extension of the uploaded name, `png` when absent or odd.
fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "png".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_paths() {
        assert_eq!(
            ScreenshotStore::object_path("user-1", ImageKind::Screenshot, 1700000000000, "P&L.JPG")
                .unwrap(),
            "user-1/1700000000000.jpg"
        );
        assert_eq!(
            ScreenshotStore::object_path("user-1", ImageKind::StrategyChart, 5, "chart").unwrap(),
            "user-1/strategy-chart-5.png"
        );
    }

    #[test]
    fn owner_cannot_escape_bucket() {
        assert!(ScreenshotStore::object_path("../etc", ImageKind::Screenshot, 1, "a.png").is_err());
        assert!(ScreenshotStore::object_path("a/b", ImageKind::Screenshot, 1, "a.png").is_err());
        assert!(ScreenshotStore::object_path("", ImageKind::Screenshot, 1, "a.png").is_err());
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(dir.path(), "https://journal.example.com/");

        let url = store
            .upload("u1", ImageKind::Screenshot, "shot.png", b"fake-png")
            .await
            .unwrap();

        assert!(url.starts_with("https://journal.example.com/storage/trade-screenshots/u1/"));
        assert!(url.ends_with(".png"));

        let object = url.rsplit("/trade-screenshots/").next().unwrap();
        let written = std::fs::read(dir.path().join(BUCKET).join(object)).unwrap();
        assert_eq!(written, b"fake-png");
    }
}
