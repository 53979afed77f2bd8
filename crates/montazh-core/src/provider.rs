use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{MontazhError, Result};
use crate::services::{ImageGenerator, SpeechSynthesizer, Summarizer};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const IMAGE_GENERATIONS_URL: &str = "https://api.openai.com/v1/images/generations";
const SPEECH_SYNTHESIS_URL: &str = "https://api.openai.com/v1/audio/speech";

const SUMMARY_MODEL: &str = "gpt-4o-mini";
const IMAGE_MODEL: &str = "dall-e-3";
const SPEECH_MODEL: &str = "tts-1";

const IMAGE_SIZE: &str = "1792x1024";
/// Fixed narration voice profile.
const VOICE: &str = "alloy";
/// Longest prompt the image endpoint accepts.
const MAX_IMAGE_PROMPT_CHARS: usize = 4000;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

const SUMMARY_SYSTEM_PROMPT: &str = "Condense the user's passage into one short scene caption \
suitable as an image-generation prompt. Reply with the caption only, nothing else.";

/// Generative-services client backed by the OpenAI API.
///
/// One client implements all three generative collaborators: summarization
/// via chat completions, image generation, and speech synthesis.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from the process environment, validating the API key
    /// eagerly.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| MontazhError::MissingApiKey { env_var: API_KEY_ENV })?;
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, text: &str, max_tokens: u32) -> Result<String> {
        if text.trim().is_empty() {
            return Err(MontazhError::ExternalService {
                service: "summarization",
                reason: "refusing to summarize empty text".to_string(),
            });
        }

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": SUMMARY_MODEL,
                "messages": [
                    { "role": "system", "content": SUMMARY_SYSTEM_PROMPT },
                    { "role": "user", "content": text },
                ],
                "max_tokens": max_tokens,
                "temperature": 0.3,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| MontazhError::ExternalService {
                service: "summarization",
                reason: format!("invalid API response: {response:?}"),
            })?;

        let summary = content.trim().to_string();
        debug!(summary = %summary, "caption generated");
        Ok(summary)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(MontazhError::ExternalService {
                service: "image generation",
                reason: "empty prompt".to_string(),
            });
        }
        if prompt.chars().count() > MAX_IMAGE_PROMPT_CHARS {
            return Err(MontazhError::ExternalService {
                service: "image generation",
                reason: format!("prompt exceeds {MAX_IMAGE_PROMPT_CHARS} characters"),
            });
        }

        #[derive(Deserialize)]
        struct ImageResponse {
            data: Vec<ImageDatum>,
        }
        #[derive(Deserialize)]
        struct ImageDatum {
            url: String,
        }

        let response = self
            .client
            .post(IMAGE_GENERATIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": IMAGE_MODEL,
                "prompt": prompt,
                "size": IMAGE_SIZE,
                "quality": "standard",
                "n": 1,
            }))
            .send()
            .await?;

        // Content-policy rejections and malformed prompts land here.
        if !response.status().is_success() {
            let reason = response.text().await?;
            return Err(MontazhError::ExternalService {
                service: "image generation",
                reason,
            });
        }

        let parsed: ImageResponse = response.json().await?;
        let datum = parsed.data.first().ok_or_else(|| MontazhError::ExternalService {
            service: "image generation",
            reason: "no image in response".to_string(),
        })?;

        debug!(url = %datum.url, "downloading generated image");
        let download = self.client.get(&datum.url).send().await?;
        if !download.status().is_success() {
            return Err(MontazhError::ExternalService {
                service: "image generation",
                reason: format!("image download failed with status {}", download.status()),
            });
        }
        Ok(download.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(MontazhError::ExternalService {
                service: "speech synthesis",
                reason: "empty narration text".to_string(),
            });
        }

        let response = self
            .client
            .post(SPEECH_SYNTHESIS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": SPEECH_MODEL,
                "voice": VOICE,
                "input": text,
                "response_format": "mp3",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let reason = response.text().await?;
            return Err(MontazhError::ExternalService {
                service: "speech synthesis",
                reason,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
