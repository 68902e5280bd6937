use tracing::warn;

use crate::anonymize::Anonymizer;
use crate::models::{DiarizationSegment, FinalLine, PipelineOptions, TranscriptSegment};
use crate::speakers::{SpeakerMap, UNKNOWN_SPEAKER};

/// Literal prefix added to every attributed line in forced-fallback mode.
const DUMMY_PREFIX: &str = "[DUMMY-Fallback] ";

/// Raw speaker label for a timestamp: the first diarization segment whose
/// interval contains it, or `UNKNOWN_SPEAKER` if none does. Linear scan;
/// input sizes are tens of segments.
pub fn find_speaker_for_time(diar_segments: &[DiarizationSegment], timestamp: f64) -> &str {
    diar_segments
        .iter()
        .find(|seg| seg.contains(timestamp))
        .map(|seg| seg.speaker.as_str())
        .unwrap_or(UNKNOWN_SPEAKER)
}

/// Merge the two segment streams into final, formatted transcript lines.
///
/// Transcript segments are processed in input order (they arrive
/// time-ordered; no re-sorting). Per segment: optional anonymization with
/// pass-through on failure, speaker lookup by start-time containment when
/// diarization is on and produced segments, then line formatting.
pub async fn merge_transcript(
    transcript_segments: &[TranscriptSegment],
    diar_segments: &[DiarizationSegment],
    anonymizer: Option<&Anonymizer>,
    options: &PipelineOptions,
) -> (String, Vec<FinalLine>) {
    let mut speaker_map = SpeakerMap::new(options.force_fallback);
    let attribute_speakers = options.diarize && !diar_segments.is_empty();

    let mut final_lines = Vec::with_capacity(transcript_segments.len());
    for segment in transcript_segments {
        let mut text = segment.text.clone();

        if options.anonymize {
            if let Some(anonymizer) = anonymizer {
                match anonymizer.apply(&text).await {
                    Ok(anonymized) => text = anonymized,
                    Err(err) => {
                        warn!("Anonymizer failed: {}; keeping original text", err);
                    }
                }
            }
        }

        let speaker = attribute_speakers.then(|| {
            let raw_label = find_speaker_for_time(diar_segments, segment.start);
            speaker_map.display_name(raw_label)
        });

        final_lines.push(FinalLine {
            start: segment.start,
            end: segment.end,
            text,
            speaker,
        });
    }

    let text = final_lines
        .iter()
        .map(|line| format_line(line, options))
        .collect::<Vec<_>>()
        .join("\n");

    (text, final_lines)
}

/// Render one line: optional fallback-mode prefix, optional timestamp
/// prefix, then either `Speaker: text` or bare text.
pub fn format_line(line: &FinalLine, options: &PipelineOptions) -> String {
    let mut out = String::new();

    if line.speaker.is_some() && options.force_fallback {
        out.push_str(DUMMY_PREFIX);
    }
    if options.timestamps {
        out.push_str(&format!("[{:.2}-{:.2}] ", line.start, line.end));
    }
    match &line.speaker {
        Some(speaker) => {
            out.push_str(speaker);
            out.push_str(": ");
            out.push_str(&line.text);
        }
        None => out.push_str(&line.text),
    }

    out
}
