use super::*;
use bzp_core::*;
use serde::Deserialize;
use serde::Serialize;

/// Everything the server pushes over the socket. Internally tagged so
/// clients can switch on `type`; payload fields are camelCase to match
/// what the web client binds against.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full state, sent to a participant on (re)connect.
    RoomState {
        room_code: String,
        you: Slot,
        config: ConfigEcho,
        #[serde(skip_serializing_if = "Option::is_none")]
        opponent_rating: Option<u32>,
        snapshot: Snapshot,
        #[serde(skip_serializing_if = "Option::is_none")]
        deadline: Option<Millis>,
    },
    PlayerJoined {
        slot: Slot,
    },
    PlayerLeft {
        slot: Slot,
    },
    PhaseCategory {
        question_index: usize,
        category: String,
        ends_at: Millis,
    },
    PhaseBetting {
        first_actor: Slot,
        awaiting_action: Slot,
        available_actions: Vec<BetAction>,
        bet_options: Vec<Chips>,
        #[serde(skip_serializing_if = "Option::is_none")]
        current_bet: Option<Chips>,
        pot: Chips,
        deadline: Millis,
    },
    BetPlaced {
        slot: Slot,
        action: BetAction,
        amount: Chips,
        pot: Chips,
        #[serde(skip_serializing_if = "Option::is_none")]
        awaiting_action: Option<Slot>,
        available_actions: Vec<BetAction>,
        #[serde(skip_serializing_if = "Option::is_none")]
        current_bet: Option<Chips>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deadline: Option<Millis>,
    },
    PhaseClue {
        clue: String,
        reveal_rate: u32,
        pot: Chips,
    },
    ClueTick {
        reveal_index: usize,
    },
    ClueComplete {
        deadline: Millis,
    },
    Buzzed {
        slot: Slot,
        answer_deadline: Millis,
    },
    AnswerSubmitted {
        slot: Slot,
        answer: String,
        correct: bool,
    },
    AnswerTyping {
        slot: Slot,
        text: String,
    },
    ClueResumed {
        reveal_index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        deadline: Option<Millis>,
    },
    PhaseResolution {
        outcome: String,
        correct_answer: String,
        answers: PerSlot<Option<String>>,
        balance_changes: PerSlot<Delta>,
        new_balances: PerSlot<Chips>,
        next_phase_at: Millis,
    },
    PhaseComplete {
        winner: String,
        final_balances: PerSlot<Chips>,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
    /// Wire form. These types contain nothing unserializable.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server message serializes")
    }
}

/// Everything a client may send. Anything that fails to parse is
/// answered with an `error` message and otherwise ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Bet { amount: Chips },
    Match,
    Raise { amount: Chips },
    Fold,
    Buzz,
    Answer { text: String },
    AnswerTyping { text: String },
}
