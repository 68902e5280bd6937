use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::DebugBundle;

/// JSON export shape: one entry per non-empty transcript line.
///
/// Timing and speaker metadata from the debug bundle are intentionally not
/// included; the export keeps the established lossy shape.
#[derive(Debug, Serialize)]
pub struct JsonExport {
    pub segments: Vec<JsonSegment>,
}

#[derive(Debug, Serialize)]
pub struct JsonSegment {
    pub text: String,
}

impl JsonExport {
    pub fn from_text(text: &str) -> Self {
        Self {
            segments: text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| JsonSegment {
                    text: line.to_string(),
                })
                .collect(),
        }
    }
}

/// Write the transcript as plain text.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write text file: {:?}", path))
}

/// Write the transcript in the JSON export shape.
pub fn write_json(path: &Path, text: &str) -> Result<()> {
    let export = JsonExport::from_text(text);
    let json = serde_json::to_string_pretty(&export).context("Failed to serialize export")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write JSON file: {:?}", path))
}

/// Render the raw segment streams for inspection.
pub fn render_debug(debug: &DebugBundle) -> String {
    let mut out = String::new();

    out.push_str("Diarization segments\n");
    out.push_str("--------------------\n");
    if debug.diar_segments.is_empty() {
        out.push_str("(none)\n");
    }
    for seg in &debug.diar_segments {
        out.push_str(&format!(
            "{:.2}s - {:.2}s : {}\n",
            seg.start, seg.end, seg.speaker
        ));
    }

    out.push_str("\nTranscript segments\n");
    out.push_str("-------------------\n");
    if debug.transcript_segments.is_empty() {
        out.push_str("(none)\n");
    }
    for seg in &debug.transcript_segments {
        out.push_str(&format!(
            "{:.2}s - {:.2}s : {}\n",
            seg.start, seg.end, seg.text
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiarizationSegment, TranscriptSegment};

    #[test]
    fn test_json_export_skips_empty_lines() {
        let export = JsonExport::from_text("Zeile eins\n\nZeile zwei\n   \n");
        assert_eq!(export.segments.len(), 2);
        assert_eq!(export.segments[0].text, "Zeile eins");
        assert_eq!(export.segments[1].text, "Zeile zwei");
    }

    #[test]
    fn test_json_export_shape() {
        let export = JsonExport::from_text("Person 1: Hallo");
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"segments": [{"text": "Person 1: Hallo"}]})
        );
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let txt_path = dir.path().join("transkript.txt");
        let json_path = dir.path().join("transkript.json");

        write_text(&txt_path, "Hallo Welt").unwrap();
        write_json(&json_path, "Hallo Welt").unwrap();

        assert_eq!(std::fs::read_to_string(&txt_path).unwrap(), "Hallo Welt");
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed["segments"][0]["text"], "Hallo Welt");
    }

    #[test]
    fn test_render_debug_includes_both_streams() {
        let debug = DebugBundle {
            transcript_segments: vec![TranscriptSegment::new(0.0, 2.0, "Hallo")],
            diar_segments: vec![DiarizationSegment::new(0.0, f64::INFINITY, "Person-DUMMY")],
        };
        let rendered = render_debug(&debug);
        assert!(rendered.contains("0.00s - 2.00s : Hallo"));
        assert!(rendered.contains("Person-DUMMY"));
        assert!(rendered.contains("inf"));
    }
}
