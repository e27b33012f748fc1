//! Filesystem-backed selfie and asset sources.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use refstack_core::{AssetSource, FetchError, SelfieSource};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads selfies as files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsSelfieSource {
    root: PathBuf,
}

impl FsSelfieSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SelfieSource for FsSelfieSource {
    async fn fetch_selfie(&self, id: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(id);
        tracing::debug!(path = %path.display(), "reading selfie");
        tokio::fs::read(&path)
            .await
            .map_err(|e| FetchError::from(format!("{}: {e}", path.display())))
    }
}

/// Resolves asset keys to files under a root directory and serves them
/// base64-encoded. A missing file is "not found", not an error.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssetSource {
    async fn fetch_asset(&self, key: &str) -> Result<Option<String>, FetchError> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(BASE64_STANDARD.encode(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FetchError::from(format!("{}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_selfie_read_relative_to_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("selfies")).unwrap();
        std::fs::write(temp.path().join("selfies/a.jpg"), b"jpeg-bytes").unwrap();

        let source = FsSelfieSource::new(temp.path());
        assert_eq!(source.fetch_selfie("selfies/a.jpg").await.unwrap(), b"jpeg-bytes");
        assert!(source.fetch_selfie("selfies/missing.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_asset_is_base64_encoded() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("logo.png"), [1u8, 2, 3]).unwrap();

        let source = FsAssetSource::new(temp.path());
        assert_eq!(source.fetch_asset("logo.png").await.unwrap().as_deref(), Some("AQID"));
    }

    #[tokio::test]
    async fn test_missing_asset_is_none() {
        let temp = TempDir::new().unwrap();
        let source = FsAssetSource::new(temp.path());
        assert_eq!(source.fetch_asset("nope.png").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_asset_is_error() {
        // Reading a directory is an I/O error other than NotFound.
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("logo.png")).unwrap();
        let source = FsAssetSource::new(temp.path());
        assert!(source.fetch_asset("logo.png").await.is_err());
    }
}
