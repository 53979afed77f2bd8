use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Produces a short caption for a piece of transcript text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, max_tokens: u32) -> Result<String>;
}

/// Renders one still image for a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// Synthesizes narration audio for a piece of text with a fixed voice
/// profile.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Object storage boundary: where transcript documents come from and where
/// the finished video goes.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    async fn store(&self, path: &Path, bucket: &str, key: &str) -> Result<()>;
}
