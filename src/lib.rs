pub mod anonymize;
pub mod asr;
pub mod config;
pub mod diarize;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod record;
pub mod speakers;

pub use anonymize::{Anonymizer, EntityRecognizer, HfNerClient, PatternSet};
pub use asr::{RemoteAsrClient, TranscriptionBackend};
pub use config::{check_format, mask, TokenCheck, TokenStore};
pub use diarize::{DiarizationBackend, DiarizationSource, DiarizeError, RemoteDiarizationBackend};
pub use export::{write_json, write_text, JsonExport};
pub use models::{
    fallback_segments, DebugBundle, DiarizationSegment, FinalLine, PipelineOptions,
    TranscriptSegment,
};
pub use pipeline::{merge_transcript, Pipeline, PipelineOutput};
pub use record::{record_to_wav, AudioInput, LevelMonitor};
pub use speakers::SpeakerMap;
