use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A group of consecutive transcript sentences.
///
/// `chunk_id` is the chunk's 0-based position in segmentation order, which
/// also defines the order of segments in the final video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: usize,
    pub original_text: String,
}

/// A chunk plus the artifacts derived for it by the enricher.
///
/// `summary` is the image-generation caption only; narration audio is always
/// synthesized from `original_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedChunk {
    pub chunk_id: usize,
    pub original_text: String,
    pub summary: String,
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
}

impl EnrichedChunk {
    pub fn new(chunk: Chunk, summary: String, image_path: PathBuf, audio_path: PathBuf) -> Self {
        Self {
            chunk_id: chunk.chunk_id,
            original_text: chunk.original_text,
            summary,
            image_path,
            audio_path,
        }
    }
}
