use std::sync::Arc;

use tracing::info;

use crate::error::{MontazhError, Result};
use crate::scratch::{ArtifactKind, ScratchStore};
use crate::services::{ImageGenerator, SpeechSynthesizer, Summarizer};
use crate::types::{Chunk, EnrichedChunk};

/// Upper bound for caption length, in tokens.
pub const SUMMARY_MAX_TOKENS: u32 = 15;

/// Turns one chunk into its full artifact bundle: caption, image, narration.
pub struct Enricher {
    summarizer: Arc<dyn Summarizer>,
    images: Arc<dyn ImageGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    scratch: ScratchStore,
}

impl Enricher {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        images: Arc<dyn ImageGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        scratch: ScratchStore,
    ) -> Self {
        Self {
            summarizer,
            images,
            speech,
            scratch,
        }
    }

    /// Enrich a single chunk.
    ///
    /// The caption drives image generation only; narration is synthesized
    /// from the full chunk text. Returns only once both artifacts are
    /// written to scratch storage. Self-contained per chunk: distinct chunks
    /// can be enriched concurrently since every scratch path is chunk-keyed.
    pub async fn enrich(&self, chunk: Chunk) -> Result<EnrichedChunk> {
        let chunk_id = chunk.chunk_id;

        let summary = self
            .summarizer
            .summarize(&chunk.original_text, SUMMARY_MAX_TOKENS)
            .await
            .map_err(|e| enrichment_error(chunk_id, "summarize", e))?;

        let image_bytes = self
            .images
            .generate_image(&summary)
            .await
            .map_err(|e| enrichment_error(chunk_id, "image", e))?;
        let image_path = self
            .scratch
            .put(chunk_id, ArtifactKind::Image, &image_bytes)
            .await
            .map_err(|e| enrichment_error(chunk_id, "scratch", e))?;

        let audio_bytes = self
            .speech
            .synthesize(&chunk.original_text)
            .await
            .map_err(|e| enrichment_error(chunk_id, "speech", e))?;
        let audio_path = self
            .scratch
            .put(chunk_id, ArtifactKind::Audio, &audio_bytes)
            .await
            .map_err(|e| enrichment_error(chunk_id, "scratch", e))?;

        info!(chunk_id, "chunk enriched");
        Ok(EnrichedChunk::new(chunk, summary, image_path, audio_path))
    }
}

fn enrichment_error(chunk_id: usize, subsystem: &'static str, source: MontazhError) -> MontazhError {
    MontazhError::Enrichment {
        chunk_id,
        subsystem,
        reason: source.to_string(),
    }
}
