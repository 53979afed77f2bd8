//! Montazh Core Library
//!
//! Core pipeline for turning a transcript into a narrated summary video:
//! sentence segmentation into two-sentence chunks, per-chunk enrichment
//! (caption, generated image, synthesized narration), and ffmpeg assembly
//! of the artifacts into a single MP4 handed off to object storage.

pub mod assembler;
pub mod enricher;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod scratch;
pub mod segmenter;
pub mod services;
pub mod types;

// Re-export commonly used items at crate root
pub use assembler::{FRAME_RATE, FfmpegAssembler, VideoAssembler};
pub use enricher::{Enricher, SUMMARY_MAX_TOKENS};
pub use error::{MontazhError, Result};
pub use pipeline::{Pipeline, RunOutcome, RunState};
pub use provider::OpenAiClient;
pub use scratch::{ArtifactKind, ScratchStore};
pub use segmenter::{SENTENCES_PER_CHUNK, segment};
pub use services::{ImageGenerator, ObjectStorage, SpeechSynthesizer, Summarizer};
pub use types::{Chunk, EnrichedChunk};
