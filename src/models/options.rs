/// Per-run pipeline configuration.
///
/// Passed by value into the pipeline so one run cannot observe another run's
/// settings. There is no ambient configuration state.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Transcription model size (e.g., "large")
    pub model_size: String,
    /// Run the audio preprocessor (resample/normalize) before transcription
    pub preprocess: bool,
    /// Anonymize segment text before formatting
    pub anonymize: bool,
    /// Attribute each line to a speaker via diarization
    pub diarize: bool,
    /// Prefix each line with a `[start-end]` timestamp
    pub timestamps: bool,
    /// Skip the diarization model entirely and collapse all speakers into one
    /// placeholder identity
    pub force_fallback: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            model_size: "large".to_string(),
            preprocess: false,
            anonymize: false,
            diarize: false,
            timestamps: false,
            force_fallback: false,
        }
    }
}
