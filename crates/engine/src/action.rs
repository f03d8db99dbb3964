use bzp_core::*;

/// An inbound player action, already attributed to a slot by the
/// coordinator. Legality is decided entirely by the engine; an illegal
/// action is ignored without effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Open the betting with an amount from the bet menu.
    Bet(Chips),
    /// Match the opponent's open bet (possibly a partial all-in).
    Match,
    /// Raise to a new total contribution.
    Raise(Chips),
    /// Concede the question, forfeiting the pot.
    Fold,
    /// Claim the buzzer during the clue phase.
    Buzz,
    /// Submit an answer while holding the buzzer.
    Answer(String),
    /// Side-channel typing echo; never mutates state.
    Typing(String),
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerAction::Bet(amount) => write!(f, "bet {}", amount),
            PlayerAction::Match => write!(f, "match"),
            PlayerAction::Raise(amount) => write!(f, "raise {}", amount),
            PlayerAction::Fold => write!(f, "fold"),
            PlayerAction::Buzz => write!(f, "buzz"),
            PlayerAction::Answer(_) => write!(f, "answer"),
            PlayerAction::Typing(_) => write!(f, "typing"),
        }
    }
}
