use super::*;

/// Errors that can occur while decoding client traffic.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    Malformed(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed message: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// The protocol layer between internal events and the wire format.
/// Decoding only checks shape; legality of the decoded action is the
/// engine's call.
pub struct Protocol;

impl Protocol {
    /// Converts an internal Event to a wire ServerMessage.
    pub fn encode(event: &Event) -> ServerMessage {
        match event {
            Event::Category {
                question_index,
                category,
                ends_at,
            } => ServerMessage::PhaseCategory {
                question_index: *question_index,
                category: category.clone(),
                ends_at: *ends_at,
            },
            Event::BettingTurn {
                first_actor,
                awaiting_action,
                available_actions,
                bet_options,
                current_bet,
                pot,
                deadline,
            } => ServerMessage::PhaseBetting {
                first_actor: *first_actor,
                awaiting_action: *awaiting_action,
                available_actions: available_actions.clone(),
                bet_options: bet_options.clone(),
                current_bet: *current_bet,
                pot: *pot,
                deadline: *deadline,
            },
            Event::BetPlaced {
                slot,
                action,
                amount,
                pot,
                awaiting_action,
                available_actions,
                current_bet,
                deadline,
            } => ServerMessage::BetPlaced {
                slot: *slot,
                action: *action,
                amount: *amount,
                pot: *pot,
                awaiting_action: *awaiting_action,
                available_actions: available_actions.clone(),
                current_bet: *current_bet,
                deadline: *deadline,
            },
            Event::Clue {
                clue,
                reveal_rate,
                pot,
            } => ServerMessage::PhaseClue {
                clue: clue.clone(),
                reveal_rate: *reveal_rate,
                pot: *pot,
            },
            Event::ClueTick { reveal_index } => ServerMessage::ClueTick {
                reveal_index: *reveal_index,
            },
            Event::ClueComplete { deadline } => ServerMessage::ClueComplete {
                deadline: *deadline,
            },
            Event::Buzzed {
                slot,
                answer_deadline,
            } => ServerMessage::Buzzed {
                slot: *slot,
                answer_deadline: *answer_deadline,
            },
            Event::AnswerSubmitted {
                slot,
                answer,
                correct,
            } => ServerMessage::AnswerSubmitted {
                slot: *slot,
                answer: answer.clone(),
                correct: *correct,
            },
            Event::Typing { slot, text } => ServerMessage::AnswerTyping {
                slot: *slot,
                text: text.clone(),
            },
            Event::ClueResumed {
                reveal_index,
                deadline,
            } => ServerMessage::ClueResumed {
                reveal_index: *reveal_index,
                deadline: *deadline,
            },
            Event::Resolution {
                outcome,
                correct_answer,
                answers,
                balance_changes,
                new_balances,
                next_phase_at,
            } => ServerMessage::PhaseResolution {
                outcome: outcome.tag(),
                correct_answer: correct_answer.clone(),
                answers: answers.clone(),
                balance_changes: *balance_changes,
                new_balances: *new_balances,
                next_phase_at: *next_phase_at,
            },
            Event::Complete {
                winner,
                final_balances,
            } => ServerMessage::PhaseComplete {
                winner: winner.tag(),
                final_balances: *final_balances,
            },
        }
    }
    /// Parses a raw client frame into a PlayerAction.
    pub fn decode(s: &str) -> Result<PlayerAction, ProtocolError> {
        let msg: ClientMessage =
            serde_json::from_str(s).map_err(|_| ProtocolError::Malformed(s.to_string()))?;
        Ok(match msg {
            ClientMessage::Bet { amount } => PlayerAction::Bet(amount),
            ClientMessage::Match => PlayerAction::Match,
            ClientMessage::Raise { amount } => PlayerAction::Raise(amount),
            ClientMessage::Fold => PlayerAction::Fold,
            ClientMessage::Buzz => PlayerAction::Buzz,
            ClientMessage::Answer { text } => PlayerAction::Answer(text),
            ClientMessage::AnswerTyping { text } => PlayerAction::Typing(text),
        })
    }
}
