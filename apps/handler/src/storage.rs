use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use montazh_core::{ObjectStorage, Result};

/// Directory-rooted object store: objects live at `root/bucket/key`.
///
/// Stands in for the remote object-storage service behind the same trait;
/// deployments swap in an S3-compatible client here.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `MONTAZH_STORE_ROOT`, falling back to the platform cache
    /// directory.
    pub fn from_env() -> Self {
        match std::env::var("MONTAZH_STORE_ROOT") {
            Ok(root) => Self::new(root),
            Err(_) => Self::new(
                dirs::cache_dir()
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join("montazh"),
            ),
        }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.object_path(bucket, key)).await?)
    }

    async fn store(&self, path: &Path, bucket: &str, key: &str) -> Result<()> {
        let dest = self.object_path(bucket, key);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(path, &dest).await?;
        Ok(())
    }
}
