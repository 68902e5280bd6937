use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DiarizationBackend, DiarizationModel, DiarizeError, LoadStrategy};

/// Diarization backend talking to a pyannote model host over HTTP.
///
/// The host exposes two load routes matching the two pyannote APIs; the
/// resolver tries both per candidate model.
pub struct RemoteDiarizationBackend {
    client: Client,
    base_url: String,
}

impl RemoteDiarizationBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    model_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    handle: String,
}

#[derive(Debug, Serialize)]
struct DiarizeRequest<'a> {
    handle: &'a str,
    /// Base64-encoded audio file contents
    audio_b64: String,
}

#[async_trait]
impl DiarizationBackend for RemoteDiarizationBackend {
    async fn describe(&self) -> String {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => format!("{} ({})", self.base_url, body.trim()),
                Err(_) => format!("{} (no version info)", self.base_url),
            },
            Err(err) => format!("{} (unreachable: {})", self.base_url, err),
        }
    }

    async fn load(
        &self,
        model_id: &str,
        strategy: LoadStrategy,
        token: &str,
    ) -> Result<Box<dyn DiarizationModel>, DiarizeError> {
        let route = match strategy {
            LoadStrategy::Pipeline => "pipelines/load",
            LoadStrategy::SpeakerDiarization => "diarizers/load",
        };
        let url = format!("{}/{}", self.base_url, route);

        let load_error = |message: String| DiarizeError::Load {
            model_id: model_id.to_string(),
            strategy,
            message,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&LoadRequest { model_id })
            .send()
            .await
            .map_err(|e| load_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(load_error(format!("{} - {}", status, body)));
        }

        let loaded: LoadResponse = response
            .json()
            .await
            .map_err(|e| load_error(format!("bad load response: {}", e)))?;

        Ok(Box::new(RemoteDiarizationModel {
            client: self.client.clone(),
            url: format!("{}/diarize", self.base_url),
            token: token.to_string(),
            handle: loaded.handle,
        }))
    }
}

/// A model handle on the remote host.
struct RemoteDiarizationModel {
    client: Client,
    url: String,
    token: String,
    handle: String,
}

#[async_trait]
impl DiarizationModel for RemoteDiarizationModel {
    async fn diarize(&self, audio: &Path) -> Result<Value, DiarizeError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| DiarizeError::Inference(format!("failed to read {:?}: {}", audio, e)))?;

        let request = DiarizeRequest {
            handle: &self.handle,
            audio_b64: BASE64.encode(&bytes),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DiarizeError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DiarizeError::Inference(format!("{} - {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| DiarizeError::Inference(format!("bad diarize response: {}", e)))
    }
}
