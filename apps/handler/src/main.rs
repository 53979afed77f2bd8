use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncReadExt;
use tracing::error;

use montazh_core::{
    Enricher, FfmpegAssembler, ImageGenerator, ObjectStorage, OpenAiClient, Pipeline,
    ScratchStore, SpeechSynthesizer, Summarizer, VideoAssembler,
};

use crate::event::{InvocationResult, StorageEvent};
use crate::storage::FsObjectStore;

mod event;
mod handler;
mod storage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    // One structured event per invocation, delivered on stdin.
    let mut raw = String::new();
    tokio::io::stdin().read_to_string(&mut raw).await?;

    let result = match serde_json::from_str::<StorageEvent>(&raw) {
        Ok(event) => run(event).await,
        Err(e) => {
            error!(error = %e, "invocation event is not valid JSON");
            InvocationResult::bad_request("Invalid event structure")
        }
    };

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

/// Build the collaborator handles for one invocation and run the handler.
async fn run(event: StorageEvent) -> InvocationResult {
    let client = match OpenAiClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "service credentials unavailable");
            return InvocationResult::server_error("Service credentials unavailable");
        }
    };

    let scratch = ScratchStore::for_run();
    let storage = Arc::new(FsObjectStore::from_env());

    let enricher = Arc::new(Enricher::new(
        Arc::clone(&client) as Arc<dyn Summarizer>,
        Arc::clone(&client) as Arc<dyn ImageGenerator>,
        Arc::clone(&client) as Arc<dyn SpeechSynthesizer>,
        scratch.clone(),
    ));
    let assembler = Arc::new(FfmpegAssembler::new(scratch)) as Arc<dyn VideoAssembler>;
    let pipeline = Pipeline::new(
        enricher,
        assembler,
        Arc::clone(&storage) as Arc<dyn ObjectStorage>,
    );

    handler::handle(event, &pipeline, storage.as_ref()).await
}
