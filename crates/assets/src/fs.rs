//! Filesystem access for asset writes

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// Non-blocking filesystem operations used by the committer
pub trait AssetFs: Send + Sync {
    /// Create `path` and any missing parents
    fn ensure_dir(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Replace the contents of `path` with `bytes`
    fn write_file(&self, path: &Path, bytes: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// [`AssetFs`] on tokio's filesystem API.
///
/// Files are written next to their destination and renamed into place, so a
/// failed write never leaves a truncated texture behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl AssetFs for TokioFs {
    async fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let tmp = tmp_path(path);
        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
