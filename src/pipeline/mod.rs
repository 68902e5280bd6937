pub mod merge;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::anonymize::Anonymizer;
use crate::asr::TranscriptionBackend;
use crate::diarize::DiarizationSource;
use crate::models::{DebugBundle, FinalLine, PipelineOptions};

pub use merge::{find_speaker_for_time, format_line, merge_transcript};

/// Boundary to the audio preprocessor (resample/normalize). Produces a new
/// temporary file; the pipeline removes it after the run.
#[async_trait]
pub trait AudioPreprocessor: Send + Sync {
    async fn preprocess(&self, input: &Path) -> Result<PathBuf>;
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The newline-joined, formatted transcript
    pub text: String,
    /// Structured per-segment lines behind the formatted text
    pub lines: Vec<FinalLine>,
    /// Raw segment streams, for inspection
    pub debug: DebugBundle,
}

/// The transcription pipeline: speech-to-text, optional diarization,
/// optional anonymization, merged into one speaker-attributed transcript.
///
/// Every stage except transcription degrades on failure: diarization falls
/// back to a single dummy speaker, anonymization to pass-through. A run that
/// transcribes successfully always yields a complete (possibly degraded)
/// transcript.
pub struct Pipeline {
    asr: Arc<dyn TranscriptionBackend>,
    diarization: Option<DiarizationSource>,
    anonymizer: Option<Anonymizer>,
    preprocessor: Option<Arc<dyn AudioPreprocessor>>,
}

impl Pipeline {
    pub fn new(asr: Arc<dyn TranscriptionBackend>) -> Self {
        Self {
            asr,
            diarization: None,
            anonymizer: None,
            preprocessor: None,
        }
    }

    pub fn with_diarization(mut self, source: DiarizationSource) -> Self {
        self.diarization = Some(source);
        self
    }

    pub fn with_anonymizer(mut self, anonymizer: Anonymizer) -> Self {
        self.anonymizer = Some(anonymizer);
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn AudioPreprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Run the full pipeline on one audio file.
    pub async fn run(
        &self,
        audio: &Path,
        token: Option<&str>,
        options: &PipelineOptions,
    ) -> Result<PipelineOutput> {
        let (input, created_temp) = self.prepare_input(audio, options).await;

        let result = self.run_stages(&input, token, options).await;

        if let Some(temp) = created_temp {
            if temp != audio {
                if let Err(err) = tokio::fs::remove_file(&temp).await {
                    warn!("Failed to remove temp file {:?}: {}", temp, err);
                }
            }
        }

        result
    }

    async fn prepare_input(
        &self,
        audio: &Path,
        options: &PipelineOptions,
    ) -> (PathBuf, Option<PathBuf>) {
        if !options.preprocess {
            info!("Preprocessing disabled, using original audio");
            return (audio.to_path_buf(), None);
        }

        let Some(preprocessor) = &self.preprocessor else {
            warn!("Preprocessing enabled but no preprocessor configured, using original audio");
            return (audio.to_path_buf(), None);
        };

        match preprocessor.preprocess(audio).await {
            Ok(cleaned) => {
                info!("Audio preprocessing complete: {:?}", cleaned);
                (cleaned.clone(), Some(cleaned))
            }
            Err(err) => {
                warn!("Preprocessing failed: {}, using original audio", err);
                (audio.to_path_buf(), None)
            }
        }
    }

    async fn run_stages(
        &self,
        input: &Path,
        token: Option<&str>,
        options: &PipelineOptions,
    ) -> Result<PipelineOutput> {
        info!("Starting transcription (model size: {})", options.model_size);
        let transcript_segments = self
            .asr
            .transcribe(input, &options.model_size)
            .await
            .context("Transcription failed")?;
        info!("Transcription complete: {} segments", transcript_segments.len());

        let diar_segments = if options.diarize {
            match &self.diarization {
                Some(source) => {
                    let segments = source.diarize(input, token, options.force_fallback).await;
                    info!("Received {} diarization segments", segments.len());
                    segments
                }
                None => {
                    warn!("Diarization enabled but no source configured");
                    Vec::new()
                }
            }
        } else {
            info!("Diarization disabled");
            Vec::new()
        };

        let (text, lines) = merge_transcript(
            &transcript_segments,
            &diar_segments,
            self.anonymizer.as_ref(),
            options,
        )
        .await;

        Ok(PipelineOutput {
            text,
            lines,
            debug: DebugBundle {
                transcript_segments,
                diar_segments,
            },
        })
    }
}
