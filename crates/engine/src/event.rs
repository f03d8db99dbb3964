use super::*;
use bzp_core::*;

/// How a question ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A slot answered correctly and took the pot.
    Win(Slot),
    /// A slot folded and forfeited the pot.
    Fold(Slot),
    /// No winner; each slot took back its own contributions.
    Draw,
}

impl Outcome {
    /// Wire tag, e.g. `A_WIN`, `B_FOLD`, `DRAW`.
    pub fn tag(self) -> String {
        match self {
            Outcome::Win(slot) => format!("{}_WIN", slot),
            Outcome::Fold(slot) => format!("{}_FOLD", slot),
            Outcome::Draw => "DRAW".to_string(),
        }
    }
}

/// Final match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Winner(Slot),
    Tie,
}

impl MatchResult {
    pub fn tag(self) -> String {
        match self {
            MatchResult::Winner(slot) => slot.to_string(),
            MatchResult::Tie => "TIE".to_string(),
        }
    }
}

/// Events emitted by the engine, one per phase transition or applied
/// action. The room broadcasts each to both participants after protocol
/// encoding; deadlines are wall-clock so clients can render countdowns.
#[derive(Debug, Clone)]
pub enum Event {
    /// New question: category shown before betting opens.
    Category {
        question_index: usize,
        category: String,
        ends_at: Millis,
    },
    /// It is someone's turn to bet.
    BettingTurn {
        first_actor: Slot,
        awaiting_action: Slot,
        available_actions: Vec<BetAction>,
        bet_options: Vec<Chips>,
        current_bet: Option<Chips>,
        pot: Chips,
        deadline: Millis,
    },
    /// A betting action was applied.
    BetPlaced {
        slot: Slot,
        action: BetAction,
        amount: Chips,
        pot: Chips,
        awaiting_action: Option<Slot>,
        available_actions: Vec<BetAction>,
        current_bet: Option<Chips>,
        deadline: Option<Millis>,
    },
    /// Clue phase opened; reveal begins.
    Clue {
        clue: String,
        reveal_rate: u32,
        pot: Chips,
    },
    /// Reveal advanced.
    ClueTick { reveal_index: usize },
    /// Clue fully revealed; buzz window running.
    ClueComplete { deadline: Millis },
    /// A slot claimed the buzzer.
    Buzzed { slot: Slot, answer_deadline: Millis },
    /// An answer was judged.
    AnswerSubmitted {
        slot: Slot,
        answer: String,
        correct: bool,
    },
    /// Typing echo from the answering slot.
    Typing { slot: Slot, text: String },
    /// Reveal resumed after a wrong answer.
    ClueResumed {
        reveal_index: usize,
        deadline: Option<Millis>,
    },
    /// Question resolved.
    Resolution {
        outcome: Outcome,
        correct_answer: String,
        answers: PerSlot<Option<String>>,
        balance_changes: PerSlot<Delta>,
        new_balances: PerSlot<Chips>,
        next_phase_at: Millis,
    },
    /// Match over.
    Complete {
        winner: MatchResult,
        final_balances: PerSlot<Chips>,
    },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::Category { question_index, category, .. } => {
                write!(f, "Q{}: {}", question_index, category)
            }
            Event::BettingTurn { awaiting_action, pot, .. } => {
                write!(f, "betting turn {} (pot {})", awaiting_action, pot)
            }
            Event::BetPlaced { slot, action, amount, pot, .. } => {
                write!(f, "{}: {} {} (pot {})", slot, action, amount, pot)
            }
            Event::Clue { pot, .. } => write!(f, "clue (pot {})", pot),
            Event::ClueTick { reveal_index } => write!(f, "tick @{}", reveal_index),
            Event::ClueComplete { .. } => write!(f, "clue complete"),
            Event::Buzzed { slot, .. } => write!(f, "{}: buzzed", slot),
            Event::AnswerSubmitted { slot, correct, .. } => {
                write!(f, "{}: answered ({})", slot, if *correct { "correct" } else { "wrong" })
            }
            Event::Typing { slot, .. } => write!(f, "{}: typing", slot),
            Event::ClueResumed { reveal_index, .. } => write!(f, "resumed @{}", reveal_index),
            Event::Resolution { outcome, .. } => write!(f, "resolved {}", outcome.tag()),
            Event::Complete { winner, .. } => write!(f, "complete, winner {}", winner.tag()),
        }
    }
}
