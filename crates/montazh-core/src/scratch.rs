use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::Result;

/// Kind of per-chunk artifact held in scratch storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Audio,
}

impl ArtifactKind {
    fn file_name(self, chunk_id: usize) -> String {
        match self {
            ArtifactKind::Image => format!("chunk_{chunk_id}.png"),
            ArtifactKind::Audio => format!("chunk_{chunk_id}.mp3"),
        }
    }
}

/// Run-scoped scratch storage addressed by chunk id and artifact kind.
///
/// Every path is keyed by chunk id, so concurrently enriched chunks never
/// collide. The store is ephemeral: it lives for one pipeline run and is not
/// cleaned up by the pipeline itself.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted in a fresh run-keyed directory under the system
    /// temp dir.
    pub fn for_run() -> Self {
        Self::new(
            std::env::temp_dir()
                .join("montazh")
                .join(Uuid::new_v4().to_string()),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a chunk's artifact of the given kind.
    pub fn artifact_path(&self, chunk_id: usize, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name(chunk_id))
    }

    /// Path of the intermediate visual segment built for one chunk.
    pub fn segment_path(&self, chunk_id: usize) -> PathBuf {
        self.root.join(format!("segment_{chunk_id}.mp4"))
    }

    /// Path of the ffmpeg concat list file.
    pub fn concat_list_path(&self) -> PathBuf {
        self.root.join("concat.txt")
    }

    /// Deterministic location of the final video.
    pub fn output_path(&self) -> PathBuf {
        self.root.join("final_video.mp4")
    }

    /// Write an artifact and return its path.
    pub async fn put(&self, chunk_id: usize, kind: ArtifactKind, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;
        let path = self.artifact_path(chunk_id, kind);
        fs::write(&path, bytes).await?;
        Ok(path)
    }
}
