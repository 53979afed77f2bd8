use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::info;

use crate::error::{MontazhError, Result};
use crate::scratch::ScratchStore;
use crate::types::EnrichedChunk;

/// Frame rate of the final video.
pub const FRAME_RATE: u32 = 24;

/// Builds the final video out of enriched chunks.
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    /// Concatenate the chunks' visual segments, in the given order, into one
    /// video and return its path.
    async fn assemble(&self, chunks: &[EnrichedChunk]) -> Result<PathBuf>;
}

/// ffmpeg-backed assembler.
///
/// Each chunk becomes a still-image segment held for exactly its narration
/// audio's duration; segments are letterboxed onto a common canvas and
/// joined with the concat demuxer, hard cuts only.
pub struct FfmpegAssembler {
    scratch: ScratchStore,
}

impl FfmpegAssembler {
    pub fn new(scratch: ScratchStore) -> Self {
        Self { scratch }
    }

    async fn build_segment(
        &self,
        chunk: &EnrichedChunk,
        canvas: (u32, u32),
        duration: f64,
    ) -> Result<PathBuf> {
        let (width, height) = canvas;
        let segment = self.scratch.segment_path(chunk.chunk_id);
        // Scale to fit and pad, never crop or distort.
        let filter = format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
        );

        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-loop")
            .arg("1")
            .arg("-i")
            .arg(&chunk.image_path)
            .arg("-i")
            .arg(&chunk.audio_path)
            .arg("-vf")
            .arg(&filter)
            .arg("-t")
            .arg(duration.to_string())
            .arg("-r")
            .arg(FRAME_RATE.to_string())
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg("-c:v")
            .arg("libx264")
            .arg("-c:a")
            .arg("aac")
            .arg("-shortest")
            .arg(&segment)
            .output()
            .await?;

        if !output.status.success() {
            return Err(MontazhError::Assembly {
                chunk_id: Some(chunk.chunk_id),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(segment)
    }

    async fn concat_segments(&self, segments: &[PathBuf]) -> Result<PathBuf> {
        let list_path = self.scratch.concat_list_path();
        fs::write(&list_path, concat_list(segments)).await?;

        let output_path = self.scratch.output_path();
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(&list_path)
            .arg("-c")
            .arg("copy")
            .arg(&output_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(MontazhError::Assembly {
                chunk_id: None,
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(output_path)
    }
}

#[async_trait]
impl VideoAssembler for FfmpegAssembler {
    async fn assemble(&self, chunks: &[EnrichedChunk]) -> Result<PathBuf> {
        if chunks.is_empty() {
            return Err(MontazhError::EmptyPipeline);
        }

        // Validate every input and probe all metadata before encoding
        // anything, so a bad chunk fails the run without partial output.
        let mut durations = Vec::with_capacity(chunks.len());
        let mut canvas = (0u32, 0u32);
        for chunk in chunks {
            ensure_readable(&chunk.image_path, chunk.chunk_id).await?;
            ensure_readable(&chunk.audio_path, chunk.chunk_id).await?;

            let duration = probe_duration_seconds(&chunk.audio_path)
                .await
                .map_err(|e| assembly_error(chunk.chunk_id, e))?;
            if duration <= 0.0 {
                return Err(MontazhError::Assembly {
                    chunk_id: Some(chunk.chunk_id),
                    reason: "narration audio has zero duration".to_string(),
                });
            }
            durations.push(duration);

            let (width, height) = probe_dimensions(&chunk.image_path)
                .await
                .map_err(|e| assembly_error(chunk.chunk_id, e))?;
            canvas.0 = canvas.0.max(width);
            canvas.1 = canvas.1.max(height);
        }

        let canvas = even_canvas(canvas);

        let mut segments = Vec::with_capacity(chunks.len());
        for (chunk, duration) in chunks.iter().zip(durations) {
            segments.push(self.build_segment(chunk, canvas, duration).await?);
        }

        let output = self.concat_segments(&segments).await?;
        info!(segments = segments.len(), output = %output.display(), "video assembled");
        Ok(output)
    }
}

/// Concat-demuxer list, one segment per line, in the given order.
fn concat_list(segments: &[PathBuf]) -> String {
    let mut list = String::new();
    for segment in segments {
        list.push_str(&format!("file '{}'\n", segment.display()));
    }
    list
}

/// yuv420p needs even frame dimensions.
fn even_canvas((width, height): (u32, u32)) -> (u32, u32) {
    (width + width % 2, height + height % 2)
}

async fn ensure_readable(path: &Path, chunk_id: usize) -> Result<()> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(MontazhError::Assembly {
            chunk_id: Some(chunk_id),
            reason: format!("{} is not a regular file", path.display()),
        }),
        Err(e) => Err(MontazhError::Assembly {
            chunk_id: Some(chunk_id),
            reason: format!("cannot read {}: {e}", path.display()),
        }),
    }
}

fn assembly_error(chunk_id: usize, source: anyhow::Error) -> MontazhError {
    MontazhError::Assembly {
        chunk_id: Some(chunk_id),
        reason: format!("{source:#}"),
    }
}

/// Container duration in seconds, via ffprobe.
async fn probe_duration_seconds(path: &Path) -> anyhow::Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .with_context(|| format!("failed to run ffprobe for {}", path.display()))?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    duration_str
        .trim()
        .parse()
        .with_context(|| format!("unparseable ffprobe duration {:?}", duration_str.trim()))
}

/// Image dimensions, via ffprobe.
async fn probe_dimensions(path: &Path) -> anyhow::Result<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
        ])
        .arg(path)
        .output()
        .await
        .with_context(|| format!("failed to probe dimensions of {}", path.display()))?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value = stdout.trim();
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("ffprobe returned no dimensions for {}", path.display()))?;

    Ok((width.parse()?, height.parse()?))
}
