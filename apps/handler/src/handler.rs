use std::path::Path;

use tracing::{error, info};

use montazh_core::{ObjectStorage, Pipeline, RunState};

use crate::event::{InvocationResult, StorageEvent, TranscriptDocument};

/// Destination bucket for published videos.
pub const OUTPUT_BUCKET: &str = "montazh-video-output";

/// Handle one storage notification: fetch the transcript document, run the
/// pipeline, and report a wire-shaped result. Errors never escape; every
/// outcome maps to a status code.
pub async fn handle(
    event: StorageEvent,
    pipeline: &Pipeline,
    storage: &dyn ObjectStorage,
) -> InvocationResult {
    let Some(record) = event.records.first() else {
        return InvocationResult::bad_request("Invalid event structure");
    };
    let bucket = &record.s3.bucket.name;
    let key = &record.s3.object.key;
    info!(bucket = %bucket, key = %key, "processing transcript object");

    let raw = match storage.fetch(bucket, key).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = %e, bucket = %bucket, key = %key, "failed to fetch transcript object");
            return InvocationResult::server_error("Transcript object unavailable");
        }
    };

    let document: TranscriptDocument = match serde_json::from_slice(&raw) {
        Ok(document) => document,
        Err(e) => {
            error!(error = %e, key = %key, "object is not a valid transcript document");
            return InvocationResult::bad_request("Malformed transcript document");
        }
    };

    let dest_key = output_key(key);
    match pipeline.run(&document.transcript, OUTPUT_BUCKET, &dest_key).await {
        Ok(outcome) if outcome.state == RunState::NoWork => {
            InvocationResult::ok("Transcript contained nothing to narrate")
        }
        Ok(_) => InvocationResult::ok(format!("Video published to {OUTPUT_BUCKET}/{dest_key}")),
        Err(e) => {
            error!(error = %e, key = %key, "video generation failed");
            InvocationResult::server_error("Video generation failed")
        }
    }
}

/// Destination key for the published video, derived from the input key's
/// stem.
fn output_key(input_key: &str) -> String {
    let stem = Path::new(input_key)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_key.to_string());
    format!("output_{stem}.mp4")
}
