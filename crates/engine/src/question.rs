use serde::Deserialize;

/// One trivia question: shown as a category, revealed as a clue,
/// judged against a set of accepted answers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub category: String,
    pub clue: String,
    pub accepted_answers: Vec<String>,
    pub display_answer: String,
}

impl Question {
    /// Whether the submitted text matches any accepted answer.
    /// Both sides are compared in normalized form.
    pub fn accepts(&self, text: &str) -> bool {
        let submitted = normalize(text);
        !submitted.is_empty()
            && self
                .accepted_answers
                .iter()
                .any(|accepted| normalize(accepted) == submitted)
    }
    /// Clue length in characters, the unit `reveal_index` counts in.
    pub fn clue_len(&self) -> usize {
        self.clue.chars().count()
    }
    /// The clue prefix visible at a given reveal index.
    pub fn revealed(&self, index: usize) -> String {
        self.clue.chars().take(index).collect()
    }
}

/// Canonical comparison form: trimmed, lower-cased.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: "q1".into(),
            category: "Geography".into(),
            clue: "This city hosted the 1992 Summer Olympics".into(),
            accepted_answers: vec!["barcelona".into(), "Barcelona, Spain".into()],
            display_answer: "Barcelona".into(),
        }
    }
    #[test]
    fn accepts_normalized_variants() {
        let q = question();
        assert!(q.accepts("Barcelona"));
        assert!(q.accepts("  barcelona  "));
        assert!(q.accepts("BARCELONA, SPAIN"));
    }
    #[test]
    fn rejects_wrong_and_empty() {
        let q = question();
        assert!(!q.accepts("Madrid"));
        assert!(!q.accepts(""));
        assert!(!q.accepts("   "));
    }
    #[test]
    fn revealed_prefix_is_clamped() {
        let q = question();
        assert_eq!(q.revealed(4), "This");
        assert_eq!(q.revealed(10_000), q.clue);
        assert_eq!(q.revealed(0), "");
    }
}
