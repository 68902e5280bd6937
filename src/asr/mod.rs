use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::TranscriptSegment;

/// Boundary to the speech-to-text model.
///
/// Transcription is the only pipeline stage whose failure is fatal to a run;
/// implementations should return errors instead of degrading.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn transcribe(&self, audio: &Path, model_size: &str) -> Result<Vec<TranscriptSegment>>;
}

/// Transcription backend talking to a faster-whisper style HTTP service.
pub struct RemoteAsrClient {
    client: Client,
    service_url: String,
}

impl RemoteAsrClient {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            service_url: service_url.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AsrRequest {
    /// Base64-encoded audio file contents
    audio_b64: String,
    model_size: String,
    beam_size: u32,
}

#[derive(Debug, Deserialize)]
struct AsrResponse {
    segments: Vec<AsrSegment>,
}

#[derive(Debug, Deserialize)]
struct AsrSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl TranscriptionBackend for RemoteAsrClient {
    async fn transcribe(&self, audio: &Path, model_size: &str) -> Result<Vec<TranscriptSegment>> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("Failed to read audio file: {:?}", audio))?;

        let request = AsrRequest {
            audio_b64: BASE64.encode(&bytes),
            model_size: model_size.to_string(),
            beam_size: 5,
        };

        let url = format!("{}/transcribe", self.service_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to transcription service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Transcription service error: {} - {}", status, body);
        }

        let response: AsrResponse = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        Ok(response
            .segments
            .into_iter()
            .map(|s| TranscriptSegment::new(s.start, s.end, s.text.trim()))
            .collect())
    }
}
