pub mod remote;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{fallback_segments, DiarizationSegment};

pub use remote::RemoteDiarizationBackend;

/// Candidate diarization model identifiers, most specific first. Resolution
/// walks this list and stops at the first candidate that loads.
pub const CANDIDATE_MODELS: [&str; 3] = [
    "pyannote/speaker-diarization-precision-2",
    "pyannote/speaker-diarization-3.1",
    "pyannote/speaker-diarization",
];

/// How to load a candidate model. Each candidate is tried with the primary
/// strategy first, then the alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// The standard pretrained-pipeline route
    Pipeline,
    /// The dedicated speaker-diarization route exposed by newer backends
    SpeakerDiarization,
}

#[derive(Debug, Error)]
pub enum DiarizeError {
    #[error("failed to load {model_id} via {strategy:?}: {message}")]
    Load {
        model_id: String,
        strategy: LoadStrategy,
        message: String,
    },
    #[error("diarization inference failed: {0}")]
    Inference(String),
    #[error("unrecognized diarization output shape")]
    MalformedOutput,
    #[error("no diarization model available (last error: {0})")]
    Unavailable(String),
}

/// Boundary to a diarization model host.
#[async_trait]
pub trait DiarizationBackend: Send + Sync {
    /// One-line environment/version description, logged before the first
    /// load attempt. Diagnostics only.
    async fn describe(&self) -> String;

    async fn load(
        &self,
        model_id: &str,
        strategy: LoadStrategy,
        token: &str,
    ) -> Result<Box<dyn DiarizationModel>, DiarizeError>;
}

/// A loaded diarization model, ready for inference.
#[async_trait]
pub trait DiarizationModel: Send + Sync {
    /// Run diarization once and return the raw model output. The output
    /// shape varies between model generations; `parse_segments` handles it.
    async fn diarize(&self, audio: &Path) -> Result<Value, DiarizeError>;
}

/// Produces speaker segments for an audio file, degrading to a single
/// synthetic full-file segment whenever real diarization cannot run.
///
/// Degradation is deliberate policy, not silent success: every fallback is
/// logged with its cause, and the caller always receives a non-empty
/// segment list.
pub struct DiarizationSource {
    backend: Arc<dyn DiarizationBackend>,
}

impl DiarizationSource {
    pub fn new(backend: Arc<dyn DiarizationBackend>) -> Self {
        Self { backend }
    }

    pub async fn diarize(
        &self,
        audio: &Path,
        token: Option<&str>,
        force_fallback: bool,
    ) -> Vec<DiarizationSegment> {
        if force_fallback {
            info!("Forced fallback: skipping diarization model");
            return fallback_segments();
        }

        let Some(token) = token else {
            warn!("No access token available, using diarization fallback");
            return fallback_segments();
        };

        info!("Diarization backend: {}", self.backend.describe().await);

        let model = match self.resolve_model(token).await {
            Ok(model) => model,
            Err(err) => {
                warn!("{}, using diarization fallback", err);
                return fallback_segments();
            }
        };

        let output = match model.diarize(audio).await {
            Ok(output) => output,
            Err(err) => {
                warn!("Diarization run failed: {}, using fallback", err);
                return fallback_segments();
            }
        };

        match parse_segments(&output) {
            Ok(segments) if segments.is_empty() => {
                warn!("Diarization produced no segments, using fallback");
                fallback_segments()
            }
            Ok(segments) => {
                info!("Diarization produced {} segments", segments.len());
                segments
            }
            Err(err) => {
                warn!("{}, using fallback", err);
                fallback_segments()
            }
        }
    }

    /// Walk the candidate list, trying both load strategies per candidate.
    /// First success wins; exhaustion yields `DiarizeError::Unavailable`
    /// carrying the last encountered error.
    async fn resolve_model(&self, token: &str) -> Result<Box<dyn DiarizationModel>, DiarizeError> {
        let mut last_error = String::from("no candidates tried");

        for model_id in CANDIDATE_MODELS {
            for strategy in [LoadStrategy::Pipeline, LoadStrategy::SpeakerDiarization] {
                debug!("Trying to load {} via {:?}", model_id, strategy);
                match self.backend.load(model_id, strategy, token).await {
                    Ok(model) => {
                        info!("Loaded diarization model {} via {:?}", model_id, strategy);
                        return Ok(model);
                    }
                    Err(err) => {
                        debug!("Load failed: {}", err);
                        last_error = err.to_string();
                    }
                }
            }
        }

        Err(DiarizeError::Unavailable(last_error))
    }
}

/// Parse raw diarization output into segments.
///
/// Two shapes are tolerated: an object with a `segments` array, and a bare
/// array whose items are either `{start, end, speaker}` objects or
/// `[start, end, speaker]` triples.
pub fn parse_segments(output: &Value) -> Result<Vec<DiarizationSegment>, DiarizeError> {
    let items = match output {
        Value::Object(map) => map
            .get("segments")
            .and_then(Value::as_array)
            .ok_or(DiarizeError::MalformedOutput)?,
        Value::Array(items) => items,
        _ => return Err(DiarizeError::MalformedOutput),
    };

    let mut segments = Vec::with_capacity(items.len());
    for item in items {
        segments.push(parse_one(item)?);
    }
    Ok(segments)
}

fn parse_one(item: &Value) -> Result<DiarizationSegment, DiarizeError> {
    match item {
        Value::Object(map) => {
            let start = map.get("start").and_then(Value::as_f64);
            let end = map.get("end").and_then(Value::as_f64);
            let speaker = map.get("speaker").and_then(Value::as_str);
            match (start, end, speaker) {
                (Some(start), Some(end), Some(speaker)) => {
                    Ok(DiarizationSegment::new(start, end, speaker))
                }
                _ => Err(DiarizeError::MalformedOutput),
            }
        }
        Value::Array(triple) if triple.len() == 3 => {
            let start = triple[0].as_f64();
            let end = triple[1].as_f64();
            let speaker = triple[2].as_str();
            match (start, end, speaker) {
                (Some(start), Some(end), Some(speaker)) => {
                    Ok(DiarizationSegment::new(start, end, speaker))
                }
                _ => Err(DiarizeError::MalformedOutput),
            }
        }
        _ => Err(DiarizeError::MalformedOutput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FALLBACK_SPEAKER;
    use serde_json::json;

    #[test]
    fn test_parse_object_shape() {
        let output = json!({
            "segments": [
                {"start": 0.0, "end": 4.5, "speaker": "SPEAKER_00"},
                {"start": 4.5, "end": 9.0, "speaker": "SPEAKER_01"}
            ]
        });
        let segments = parse_segments(&output).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker, "SPEAKER_00");
        assert_eq!(segments[1].start, 4.5);
    }

    #[test]
    fn test_parse_array_shape() {
        let output = json!([
            [0.0, 2.0, "SPEAKER_00"],
            {"start": 2.0, "end": 5.0, "speaker": "SPEAKER_01"}
        ]);
        let segments = parse_segments(&output).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].end, 2.0);
        assert_eq!(segments[1].speaker, "SPEAKER_01");
    }

    #[test]
    fn test_parse_rejects_unknown_shape() {
        assert!(parse_segments(&json!("nope")).is_err());
        assert!(parse_segments(&json!({"turns": []})).is_err());
        assert!(parse_segments(&json!([[0.0, 2.0]])).is_err());
    }

    struct UnavailableBackend;

    #[async_trait]
    impl DiarizationBackend for UnavailableBackend {
        async fn describe(&self) -> String {
            "test backend (always unavailable)".to_string()
        }

        async fn load(
            &self,
            model_id: &str,
            strategy: LoadStrategy,
            _token: &str,
        ) -> Result<Box<dyn DiarizationModel>, DiarizeError> {
            Err(DiarizeError::Load {
                model_id: model_id.to_string(),
                strategy,
                message: "connection refused".to_string(),
            })
        }
    }

    struct FixedBackend(Value);

    #[async_trait]
    impl DiarizationBackend for FixedBackend {
        async fn describe(&self) -> String {
            "test backend".to_string()
        }

        async fn load(
            &self,
            _model_id: &str,
            _strategy: LoadStrategy,
            _token: &str,
        ) -> Result<Box<dyn DiarizationModel>, DiarizeError> {
            Ok(Box::new(FixedModel(self.0.clone())))
        }
    }

    struct FixedModel(Value);

    #[async_trait]
    impl DiarizationModel for FixedModel {
        async fn diarize(&self, _audio: &Path) -> Result<Value, DiarizeError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_every_candidate_failing_yields_fallback() {
        let source = DiarizationSource::new(Arc::new(UnavailableBackend));
        let segments = source.diarize(Path::new("a.wav"), Some("hf_token"), false).await;
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, FALLBACK_SPEAKER);
        assert_eq!(segments[0].start, 0.0);
        assert!(segments[0].end.is_infinite());
    }

    #[tokio::test]
    async fn test_forced_fallback_skips_backend() {
        // UnavailableBackend would log load failures; forced fallback must
        // return before any load is attempted.
        let source = DiarizationSource::new(Arc::new(UnavailableBackend));
        let segments = source.diarize(Path::new("a.wav"), Some("hf_token"), true).await;
        assert_eq!(segments[0].speaker, FALLBACK_SPEAKER);
    }

    #[tokio::test]
    async fn test_missing_token_yields_fallback() {
        let source = DiarizationSource::new(Arc::new(UnavailableBackend));
        let segments = source.diarize(Path::new("a.wav"), None, false).await;
        assert_eq!(segments[0].speaker, FALLBACK_SPEAKER);
    }

    #[tokio::test]
    async fn test_empty_model_output_yields_fallback() {
        let source = DiarizationSource::new(Arc::new(FixedBackend(json!({"segments": []}))));
        let segments = source.diarize(Path::new("a.wav"), Some("hf_token"), false).await;
        assert_eq!(segments[0].speaker, FALLBACK_SPEAKER);
    }

    #[tokio::test]
    async fn test_successful_diarization() {
        let source = DiarizationSource::new(Arc::new(FixedBackend(json!({
            "segments": [{"start": 0.0, "end": 3.0, "speaker": "SPEAKER_00"}]
        }))));
        let segments = source.diarize(Path::new("a.wav"), Some("hf_token"), false).await;
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, "SPEAKER_00");
    }
}
