use super::*;
use bzp_core::*;

/// Per-slot mutable state that survives across questions.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Chips available to bet. Never negative.
    pub balance: Chips,
    /// Snapshot taken when a question's category phase begins;
    /// used only for the per-question delta shown at resolution.
    pub balance_at_question_start: Chips,
    /// Folds left for the whole match. At zero the player is forced to act.
    pub folds_remaining: u8,
    /// Raw answer text submitted for the current question, if any.
    pub answer: Option<String>,
}

impl PlayerState {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            balance: config.starting_balance,
            balance_at_question_start: config.starting_balance,
            folds_remaining: config.folds_per_player,
            answer: None,
        }
    }
    pub fn can_fold(&self) -> bool {
        self.folds_remaining > 0
    }
    /// Signed balance change since the current question started.
    pub fn delta(&self) -> Delta {
        self.balance as Delta - self.balance_at_question_start as Delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn starts_with_configured_resources() {
        let player = PlayerState::new(&MatchConfig::default());
        assert_eq!(player.balance, 500);
        assert_eq!(player.folds_remaining, 2);
        assert!(player.answer.is_none());
    }
    #[test]
    fn delta_is_signed() {
        let mut player = PlayerState::new(&MatchConfig::default());
        player.balance = 450;
        assert_eq!(player.delta(), -50);
        player.balance = 600;
        assert_eq!(player.delta(), 100);
    }
}
