use serde::{Deserialize, Serialize};

/// A transcribed span of audio, as emitted by the transcription backend.
///
/// Segments arrive ordered by start time and are never re-sorted by the
/// pipeline. `start <= end`, both in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text, whitespace-trimmed
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A span of audio attributed to one speaker.
///
/// Produced by the diarization backend or by the fallback generator. `end`
/// may be `f64::INFINITY` (the fallback segment covers the whole file).
/// Segments are usually non-overlapping but the merge step tolerates overlaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds, possibly infinite
    pub end: f64,
    /// Raw speaker label from the model (e.g., "SPEAKER_00")
    pub speaker: String,
}

impl DiarizationSegment {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }

    /// Whether this segment's interval contains the given timestamp,
    /// inclusive on both ends.
    pub fn contains(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Raw speaker label of the synthetic fallback segment.
pub const FALLBACK_SPEAKER: &str = "Person-DUMMY";

/// The single synthetic segment used when real diarization is unavailable:
/// one placeholder speaker covering the entire file.
pub fn fallback_segments() -> Vec<DiarizationSegment> {
    vec![DiarizationSegment::new(0.0, f64::INFINITY, FALLBACK_SPEAKER)]
}

/// One fully processed transcript line.
///
/// `speaker` holds the mapped display name and is present iff diarization
/// was enabled for the run.
#[derive(Debug, Clone, Serialize)]
pub struct FinalLine {
    pub start: f64,
    pub end: f64,
    /// Text after optional anonymization
    pub text: String,
    pub speaker: Option<String>,
}

/// The raw segment streams behind one pipeline run, kept for inspection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugBundle {
    pub transcript_segments: Vec<TranscriptSegment>,
    pub diar_segments: Vec<DiarizationSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_inclusive_bounds() {
        let seg = DiarizationSegment::new(1.0, 2.0, "SPEAKER_00");
        assert!(seg.contains(1.0));
        assert!(seg.contains(1.5));
        assert!(seg.contains(2.0));
        assert!(!seg.contains(0.99));
        assert!(!seg.contains(2.01));
    }

    #[test]
    fn test_fallback_covers_everything() {
        let fallback = fallback_segments();
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback[0].speaker, FALLBACK_SPEAKER);
        assert!(fallback[0].contains(0.0));
        assert!(fallback[0].contains(1e9));
    }
}
