use thiserror::Error;

#[derive(Debug, Error)]
pub enum MontazhError {
    #[error("sentence segmentation failed: {reason}")]
    Segmentation { reason: String },

    #[error("enrichment failed for chunk {chunk_id} during {subsystem}: {reason}")]
    Enrichment {
        chunk_id: usize,
        subsystem: &'static str,
        reason: String,
    },

    #[error("video assembly failed{}: {reason}", fmt_chunk(.chunk_id))]
    Assembly {
        chunk_id: Option<usize>,
        reason: String,
    },

    #[error("pipeline has no chunks to assemble")]
    EmptyPipeline,

    #[error("{service} request failed: {reason}")]
    ExternalService {
        service: &'static str,
        reason: String,
    },

    #[error("missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

fn fmt_chunk(chunk_id: &Option<usize>) -> String {
    match chunk_id {
        Some(id) => format!(" for chunk {id}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, MontazhError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly_error_names_chunk_when_known() {
        let err = MontazhError::Assembly {
            chunk_id: Some(3),
            reason: "bad segment".to_string(),
        };
        assert_eq!(err.to_string(), "video assembly failed for chunk 3: bad segment");
    }

    #[test]
    fn test_assembly_error_without_chunk() {
        let err = MontazhError::Assembly {
            chunk_id: None,
            reason: "concat failed".to_string(),
        };
        assert_eq!(err.to_string(), "video assembly failed: concat failed");
    }

    #[test]
    fn test_enrichment_error_names_chunk_and_subsystem() {
        let err = MontazhError::Enrichment {
            chunk_id: 2,
            subsystem: "speech",
            reason: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("chunk 2"));
        assert!(msg.contains("speech"));
    }
}
