pub mod ner;
pub mod patterns;

use std::sync::Arc;

use anyhow::Result;

pub use ner::{EntityLabel, EntityRecognizer, EntitySpan, HfNerClient};
pub use patterns::PatternSet;

/// Rewrites free text by replacing identifying substrings with category
/// placeholders.
///
/// Two phases, applied in this order: regex patterns (dates, phones, emails,
/// digit runs) and then recognizer entities (persons, locations,
/// organizations). Patterns go first so placeholder tokens are already in
/// place before entity boundaries are detected.
///
/// `apply` returns an error only when the entity recognizer fails; the caller
/// is expected to keep the unanonymized text for that segment and continue.
pub struct Anonymizer {
    patterns: PatternSet,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
}

impl Anonymizer {
    /// Pattern-only anonymizer, no entity recognition.
    pub fn patterns_only() -> Self {
        Self {
            patterns: PatternSet::new(),
            recognizer: None,
        }
    }

    pub fn with_recognizer(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            patterns: PatternSet::new(),
            recognizer: Some(recognizer),
        }
    }

    pub async fn apply(&self, text: &str) -> Result<String> {
        let masked = self.patterns.apply(text);

        let Some(recognizer) = &self.recognizer else {
            return Ok(masked);
        };

        let spans = recognizer.entities(&masked).await?;
        Ok(replace_entities(&masked, spans))
    }
}

/// Replace each entity span with its category placeholder.
///
/// Spans are processed rightmost-first so earlier replacements do not shift
/// the character offsets of spans not yet processed. Offsets are character
/// positions; out-of-range or inverted spans are skipped.
pub fn replace_entities(text: &str, mut spans: Vec<EntitySpan>) -> String {
    let chars: Vec<char> = text.chars().collect();
    spans.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result: Vec<char> = chars;
    for span in spans {
        if span.start >= span.end || span.end > result.len() {
            continue;
        }
        result.splice(span.start..span.end, span.label.placeholder().chars());
    }

    result.into_iter().collect()
}
