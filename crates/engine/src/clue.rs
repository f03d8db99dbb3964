use bzp_core::*;

/// Reveal progress for the current question's clue.
/// `reveal_index` is monotone non-decreasing within a question and
/// never exceeds the clue length.
#[derive(Debug, Clone, Default)]
pub struct ClueState {
    pub reveal_index: usize,
    pub clue_complete: bool,
    pub clue_complete_at: Option<Millis>,
}

impl ClueState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
    /// Advance the reveal by `chars`, clamped to the clue length.
    pub fn advance(&mut self, chars: usize, clue_len: usize) -> usize {
        self.reveal_index = (self.reveal_index + chars).min(clue_len);
        self.reveal_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn advance_clamps_to_length() {
        let mut clue = ClueState::default();
        assert_eq!(clue.advance(6, 10), 6);
        assert_eq!(clue.advance(6, 10), 10);
        assert_eq!(clue.advance(6, 10), 10);
    }
    #[test]
    fn reset_clears_progress() {
        let mut clue = ClueState::default();
        clue.advance(6, 10);
        clue.clue_complete = true;
        clue.reset();
        assert_eq!(clue.reveal_index, 0);
        assert!(!clue.clue_complete);
    }
}
