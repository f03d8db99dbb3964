use super::*;
use bzp_core::*;
use serde::Serialize;

/// A point-in-time view of a match, enough for a client to rebuild its
/// whole UI after a reconnect. Clue text is the revealed prefix only;
/// the full clue and answer never leave the server early.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub question_index: usize,
    pub balances: PerSlot<Chips>,
    pub folds_remaining: PerSlot<u8>,
    pub pot: Chips,
    pub side_pot: Chips,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clue: Option<String>,
    pub reveal_index: usize,
    pub clue_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awaiting_action: Option<Slot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_actions: Vec<BetAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bet_options: Vec<Chips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bet: Option<Chips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currently_answering: Option<Slot>,
    pub buzzers: PerSlot<BuzzerStatus>,
}

impl MatchEngine {
    /// Capture the current state for a (re)connecting client.
    pub fn snapshot(&self) -> Snapshot {
        let in_question = !matches!(self.phase, Phase::Waiting | Phase::Complete);
        let clue_visible = matches!(self.phase, Phase::Clue | Phase::Answer | Phase::Resolution);
        let question = &self.questions[self.question_index.min(self.questions.len() - 1)];
        let awaiting = match self.phase {
            Phase::Betting => self.ledger.awaiting_action,
            _ => None,
        };
        Snapshot {
            phase: self.phase,
            question_index: self.question_index,
            balances: self.balances(),
            folds_remaining: self.players.map(|_, p| p.folds_remaining),
            pot: self.ledger.pot,
            side_pot: self.ledger.side_pot,
            category: in_question.then(|| question.category.clone()),
            clue: clue_visible.then(|| question.revealed(self.clue.reveal_index)),
            reveal_index: self.clue.reveal_index,
            clue_complete: self.clue.clue_complete,
            awaiting_action: awaiting,
            available_actions: awaiting
                .map(|slot| self.ledger.available_actions(slot, self.players[slot].can_fold()))
                .unwrap_or_default(),
            bet_options: awaiting
                .map(|slot| bet_menu(&self.config.bet_tiers, self.players[slot].balance))
                .unwrap_or_default(),
            current_bet: awaiting.and_then(|slot| self.ledger.current_bet(slot)),
            currently_answering: self.buzzer.currently_answering,
            buzzers: self.buzzer.status,
        }
    }
}
