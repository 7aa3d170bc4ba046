// Real filesystem implementation for production use
//
// Thin wrapper around tokio::fs. Test code uses MockFileSystem or a TempDir
// instead.

use super::traits::FileSystem;
use crate::error::{LauncherError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Real filesystem implementation using tokio::fs
///
/// Usage:
///     let fs = RealFileSystem;
///     let content = fs.read_to_string(Path::new("installed/notepad.json")).await?;
pub struct RealFileSystem;

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(LauncherError::IoError)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(LauncherError::IoError)
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LauncherError::IoError(e)),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(LauncherError::IoError)
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(LauncherError::IoError)?;

        while let Some(entry) = read_dir.next_entry().await.map_err(LauncherError::IoError)? {
            entries.push(entry.path());
        }

        Ok(entries)
    }
}
