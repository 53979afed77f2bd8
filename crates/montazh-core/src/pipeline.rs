use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::assembler::VideoAssembler;
use crate::enricher::Enricher;
use crate::error::{MontazhError, Result};
use crate::segmenter::segment;
use crate::services::ObjectStorage;
use crate::types::{Chunk, EnrichedChunk};

/// States of one pipeline run. The machine is linear; `NoWork` and `Failed`
/// are the only early terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    Segmented,
    Enriched,
    Assembled,
    Published,
    /// Segmentation produced no chunks; nothing to narrate, no video.
    NoWork,
    Failed,
}

/// Terminal report of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub state: RunState,
    /// Destination key of the published video, when one was produced.
    pub video_key: Option<String>,
}

/// Drives segmentation, enrichment, assembly and publication for one
/// transcript.
///
/// All collaborators are injected at construction; the pipeline holds no
/// ambient global state and lives for one invocation.
pub struct Pipeline {
    enricher: Arc<Enricher>,
    assembler: Arc<dyn VideoAssembler>,
    storage: Arc<dyn ObjectStorage>,
}

impl Pipeline {
    pub fn new(
        enricher: Arc<Enricher>,
        assembler: Arc<dyn VideoAssembler>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            enricher,
            assembler,
            storage,
        }
    }

    /// Run the whole pipeline for one transcript and publish the result.
    ///
    /// Fails atomically: any component error aborts the run and nothing is
    /// published.
    pub async fn run(
        &self,
        transcript: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<RunOutcome> {
        match self.execute(transcript, dest_bucket, dest_key).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(state = ?RunState::Failed, error = %e, "pipeline run failed");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        transcript: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<RunOutcome> {
        let mut state = RunState::Received;
        info!(state = ?state, chars = transcript.len(), "transcript received");

        let chunks = segment(transcript)?;
        if chunks.is_empty() {
            state = RunState::NoWork;
            info!(state = ?state, "transcript yielded no sentences; nothing to narrate");
            return Ok(RunOutcome {
                state,
                video_key: None,
            });
        }
        state = RunState::Segmented;
        info!(state = ?state, chunks = chunks.len(), "transcript segmented");

        let enriched = self.enrich_all(chunks).await?;
        state = RunState::Enriched;
        info!(state = ?state, chunks = enriched.len(), "all chunks enriched");

        let video_path = self.assembler.assemble(&enriched).await?;
        state = RunState::Assembled;
        info!(state = ?state, video = %video_path.display(), "video assembled");

        self.storage
            .store(&video_path, dest_bucket, dest_key)
            .await
            .map_err(|e| MontazhError::ExternalService {
                service: "storage",
                reason: e.to_string(),
            })?;
        state = RunState::Published;
        info!(state = ?state, bucket = dest_bucket, key = dest_key, "video published");

        Ok(RunOutcome {
            state,
            video_key: Some(dest_key.to_string()),
        })
    }

    /// Enrich every chunk on its own task, then join them all.
    ///
    /// The join is a barrier: every task has finished (or its failure been
    /// collected) before any result is inspected, so assembly can never
    /// start against an incomplete enrichment set. Results are restored to
    /// `chunk_id` order before being returned.
    async fn enrich_all(&self, chunks: Vec<Chunk>) -> Result<Vec<EnrichedChunk>> {
        let mut handles: Vec<(usize, JoinHandle<Result<EnrichedChunk>>)> =
            Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let enricher = Arc::clone(&self.enricher);
            let chunk_id = chunk.chunk_id;
            handles.push((
                chunk_id,
                tokio::spawn(async move { enricher.enrich(chunk).await }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (chunk_id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(MontazhError::Enrichment {
                    chunk_id,
                    subsystem: "task",
                    reason: e.to_string(),
                }),
            };
            results.push((chunk_id, result));
        }

        results.sort_by_key(|(chunk_id, _)| *chunk_id);

        let mut enriched = Vec::with_capacity(results.len());
        for (_, result) in results {
            enriched.push(result?);
        }
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::Enricher;
    use crate::scratch::ScratchStore;
    use crate::services::{ImageGenerator, SpeechSynthesizer, Summarizer};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Summarizer that fails for any text containing the poison marker.
    struct MarkerSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for MarkerSummarizer {
        async fn summarize(&self, text: &str, _max_tokens: u32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("Poison") {
                return Err(MontazhError::ExternalService {
                    service: "summarization",
                    reason: "model refused".to_string(),
                });
            }
            Ok("caption".to_string())
        }
    }

    struct StubImages;

    #[async_trait]
    impl ImageGenerator for StubImages {
        async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>> {
            Ok(b"png".to_vec())
        }
    }

    struct StubSpeech;

    #[async_trait]
    impl SpeechSynthesizer for StubSpeech {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
            Ok(b"mp3".to_vec())
        }
    }

    struct CountingAssembler {
        calls: AtomicUsize,
        output: PathBuf,
    }

    #[async_trait]
    impl VideoAssembler for CountingAssembler {
        async fn assemble(&self, chunks: &[EnrichedChunk]) -> Result<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!chunks.is_empty());
            Ok(self.output.clone())
        }
    }

    struct CountingStorage {
        stored: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ObjectStorage for CountingStorage {
        async fn fetch(&self, _bucket: &str, _key: &str) -> Result<Vec<u8>> {
            unimplemented!("pipeline never fetches")
        }

        async fn store(&self, _path: &Path, bucket: &str, key: &str) -> Result<()> {
            self.stored
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        pipeline: Pipeline,
        summarizer: Arc<MarkerSummarizer>,
        assembler: Arc<CountingAssembler>,
        storage: Arc<CountingStorage>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = Arc::new(MarkerSummarizer { calls: AtomicUsize::new(0) });
        let assembler = Arc::new(CountingAssembler {
            calls: AtomicUsize::new(0),
            output: dir.path().join("final_video.mp4"),
        });
        let storage = Arc::new(CountingStorage { stored: Mutex::new(Vec::new()) });
        let enricher = Arc::new(Enricher::new(
            Arc::clone(&summarizer) as Arc<dyn Summarizer>,
            Arc::new(StubImages),
            Arc::new(StubSpeech),
            ScratchStore::new(dir.path()),
        ));
        let pipeline = Pipeline::new(
            enricher,
            Arc::clone(&assembler) as Arc<dyn VideoAssembler>,
            Arc::clone(&storage) as Arc<dyn ObjectStorage>,
        );
        Fixture {
            pipeline,
            summarizer,
            assembler,
            storage,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_run_publishes_video_for_valid_transcript() {
        let f = fixture();
        let outcome = f
            .pipeline
            .run("One. Two. Three. Four. Five.", "out-bucket", "output_run.mp4")
            .await
            .unwrap();

        assert_eq!(outcome.state, RunState::Published);
        assert_eq!(outcome.video_key.as_deref(), Some("output_run.mp4"));
        // 5 sentences -> 3 chunks, each enriched exactly once.
        assert_eq!(f.summarizer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(f.assembler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.storage.stored.lock().unwrap().as_slice(),
            [("out-bucket".to_string(), "output_run.mp4".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_transcript_terminates_with_no_work() {
        let f = fixture();
        let outcome = f.pipeline.run("", "out-bucket", "output.mp4").await.unwrap();

        assert_eq!(outcome.state, RunState::NoWork);
        assert_eq!(outcome.video_key, None);
        assert_eq!(f.summarizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.assembler.calls.load(Ordering::SeqCst), 0);
        assert!(f.storage.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failed_chunk_aborts_before_assembly() {
        let f = fixture();
        // 5 sentences -> chunks [0,1,2]; the marker lands in chunk 2.
        let err = f
            .pipeline
            .run("One. Two. Three. Four. Poison five.", "out-bucket", "output.mp4")
            .await
            .unwrap_err();

        match err {
            MontazhError::Enrichment { chunk_id, subsystem, .. } => {
                assert_eq!(chunk_id, 2);
                assert_eq!(subsystem, "summarize");
            }
            other => panic!("expected enrichment error, got {other}"),
        }
        assert_eq!(f.assembler.calls.load(Ordering::SeqCst), 0);
        assert!(f.storage.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nul_transcript_fails_segmentation() {
        let f = fixture();
        let err = f
            .pipeline
            .run("Bad\0input.", "out-bucket", "output.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, MontazhError::Segmentation { .. }));
        assert_eq!(f.summarizer.calls.load(Ordering::SeqCst), 0);
    }
}
