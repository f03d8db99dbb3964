use super::*;
use bzp_core::*;
use serde::Serialize;

/// A slot's buzzer status for the current question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuzzerStatus {
    #[default]
    Available,
    Buzzed,
    Failed,
}

/// Buzz arbitration for the current question.
/// Reset to both-available when each clue phase opens.
#[derive(Debug, Clone, Default)]
pub struct BuzzerState {
    pub status: PerSlot<BuzzerStatus>,
    pub currently_answering: Option<Slot>,
    pub answer_deadline: Option<Millis>,
}

impl BuzzerState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
    /// Whether the slot may claim the buzzer right now.
    pub fn may_buzz(&self, slot: Slot) -> bool {
        self.status[slot] == BuzzerStatus::Available && self.currently_answering.is_none()
    }
    /// Whether both slots have burned their buzz.
    pub fn exhausted(&self) -> bool {
        Slot::BOTH
            .iter()
            .all(|&slot| self.status[slot] == BuzzerStatus::Failed)
    }
}
