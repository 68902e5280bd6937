use regex::Regex;

/// Compiled regexes for the pattern phase of anonymization.
///
/// Substitution order is significant: dates first so a date is not re-tagged
/// by the digit-run rule, then phone numbers before bare digit runs so a
/// separated phone group reads as `[TELEFON]` rather than two `[ZAHL]`
/// halves. The phone rule requires a separator; an unbroken digit run is a
/// number, not a phone. None of the placeholders re-introduce digits, so
/// later rules never match inside earlier replacements.
#[derive(Debug)]
pub struct PatternSet {
    date: Regex,
    phone: Regex,
    email: Regex,
    number: Regex,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSet {
    pub fn new() -> Self {
        Self {
            date: Regex::new(r"\b\d{2,4}[-/]\d{2,4}[-/]\d{2,4}\b").expect("valid date pattern"),
            phone: Regex::new(r"\b\d{2,5}[-\s]\d{3,}\b").expect("valid phone pattern"),
            email: Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"),
            number: Regex::new(r"\b\d{3,}\b").expect("valid number pattern"),
        }
    }

    /// Replace date-, phone-, email- and number-like tokens with category
    /// placeholders. Pure function of the input text.
    pub fn apply(&self, text: &str) -> String {
        let text = self.date.replace_all(text, "[DATUM]");
        let text = self.phone.replace_all(&text, "[TELEFON]");
        let text = self.email.replace_all(&text, "[EMAIL]");
        let text = self.number.replace_all(&text, "[ZAHL]");
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_identity() {
        let patterns = PatternSet::new();
        let text = "Hallo Welt, wie geht es dir heute?";
        assert_eq!(patterns.apply(text), text);
    }

    #[test]
    fn test_phone_number_replaced() {
        let patterns = PatternSet::new();
        let result = patterns.apply("Ruf mich unter 0151-1234567 an");
        assert_eq!(result, "Ruf mich unter [TELEFON] an");
        assert!(!result.contains("0151"));
        assert!(!result.contains("1234567"));
    }

    #[test]
    fn test_date_replaced_before_digit_runs() {
        let patterns = PatternSet::new();
        assert_eq!(patterns.apply("Termin am 12-05-2024 bitte"), "Termin am [DATUM] bitte");
        assert_eq!(patterns.apply("Termin am 12/05/2024 bitte"), "Termin am [DATUM] bitte");
    }

    #[test]
    fn test_email_replaced() {
        let patterns = PatternSet::new();
        let result = patterns.apply("Schreib an max.mustermann@example.de bitte");
        assert_eq!(result, "Schreib an [EMAIL] bitte");
    }

    #[test]
    fn test_spaced_phone_number_replaced() {
        let patterns = PatternSet::new();
        assert_eq!(patterns.apply("Ruf 0151 1234567 an"), "Ruf [TELEFON] an");
    }

    #[test]
    fn test_bare_digit_run_is_a_number_not_a_phone() {
        let patterns = PatternSet::new();
        assert_eq!(
            patterns.apply("Es waren 12345678 Leute da"),
            "Es waren [ZAHL] Leute da"
        );
    }

    #[test]
    fn test_short_digit_run_replaced() {
        let patterns = PatternSet::new();
        assert_eq!(patterns.apply("Zimmer 412 im dritten Stock"), "Zimmer [ZAHL] im dritten Stock");
    }

    #[test]
    fn test_two_digit_number_kept() {
        let patterns = PatternSet::new();
        assert_eq!(patterns.apply("Es waren 42 Leute da"), "Es waren 42 Leute da");
    }
}
