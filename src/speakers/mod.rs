use std::collections::HashMap;

/// Raw label assigned when no diarization segment contains a transcript
/// segment's start time.
pub const UNKNOWN_SPEAKER: &str = "Unbekannt";

/// Display name used for every speaker in forced-fallback mode.
const FALLBACK_DISPLAY_NAME: &str = "Person";

/// Assigns stable, human-readable names to raw speaker labels.
///
/// Scoped to a single pipeline run. The first distinct raw label seen becomes
/// "Person 1", the second "Person 2", and so on; repeat lookups of the same
/// label always return the same name. The map is append-only for the run's
/// duration.
///
/// In forced-fallback mode every label collapses to the constant "Person",
/// with no numbering. The degraded path has exactly one speaker identity.
#[derive(Debug, Default)]
pub struct SpeakerMap {
    names: HashMap<String, String>,
    force_fallback: bool,
}

impl SpeakerMap {
    pub fn new(force_fallback: bool) -> Self {
        Self {
            names: HashMap::new(),
            force_fallback,
        }
    }

    /// Look up (or assign) the display name for a raw speaker label.
    pub fn display_name(&mut self, raw_label: &str) -> String {
        if self.force_fallback {
            return FALLBACK_DISPLAY_NAME.to_string();
        }

        if let Some(name) = self.names.get(raw_label) {
            return name.clone();
        }

        let name = format!("Person {}", self.names.len() + 1);
        self.names.insert(raw_label.to_string(), name.clone());
        name
    }

    /// Number of distinct raw labels seen so far.
    pub fn distinct_speakers(&self) -> usize {
        self.names.len()
    }
}
