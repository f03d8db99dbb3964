use super::*;
use bzp_core::*;
use serde::Serialize;
use std::time::Duration;

/// Match phase. Transitions are driven only by player actions and
/// timer expiries fed through [`MatchEngine::act`] and
/// [`MatchEngine::expire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Waiting,
    Category,
    Betting,
    Clue,
    Answer,
    Resolution,
    Complete,
}

/// What the shell must do after a state transition. The engine never
/// touches clocks or sockets itself; it describes timer changes and
/// broadcasts and the room carries them out in order.
#[derive(Debug, Clone)]
pub enum Effect {
    Emit(Event),
    Arm(TimerKind, Duration),
    Disarm(TimerKind),
    DisarmAll,
}

/// A match cannot start without exactly the configured question count.
#[derive(Debug, Clone)]
pub enum SetupError {
    WrongQuestionCount { expected: usize, got: usize },
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongQuestionCount { expected, got } => {
                write!(f, "expected {} questions, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for SetupError {}

/// The rules of one match, as a pure reactive state machine.
///
/// Inputs are attributed player actions and timer expiries; outputs are
/// ordered [`Effect`]s. Illegal or stale inputs produce no effects at
/// all, so callers can feed traffic through without pre-validation.
///
/// Invariant: `balances + pot + side_pot == 2 * starting_balance` after
/// every input. [`Self::conserved`] checks it.
#[derive(Debug)]
pub struct MatchEngine {
    pub(crate) config: MatchConfig,
    pub(crate) phase: Phase,
    pub(crate) question_index: usize,
    pub(crate) questions: Vec<Question>,
    pub(crate) players: PerSlot<PlayerState>,
    pub(crate) ledger: Ledger,
    pub(crate) clue: ClueState,
    pub(crate) buzzer: BuzzerState,
}

impl MatchEngine {
    pub fn new(config: MatchConfig, questions: Vec<Question>) -> Result<Self, SetupError> {
        if questions.len() != config.questions_per_match {
            return Err(SetupError::WrongQuestionCount {
                expected: config.questions_per_match,
                got: questions.len(),
            });
        }
        let players = PerSlot::init(|_| PlayerState::new(&config));
        Ok(Self {
            config,
            phase: Phase::Waiting,
            question_index: 0,
            questions,
            players,
            ledger: Ledger::default(),
            clue: ClueState::default(),
            buzzer: BuzzerState::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn question_index(&self) -> usize {
        self.question_index
    }
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
    pub fn balances(&self) -> PerSlot<Chips> {
        self.players.map(|_, p| p.balance)
    }
    /// Total chips in play never change. A violation is fatal.
    pub fn conserved(&self) -> bool {
        let total = self.balances()[Slot::A]
            + self.balances()[Slot::B]
            + self.ledger.pot
            + self.ledger.side_pot;
        total == 2 * self.config.starting_balance
    }

    fn question(&self) -> &Question {
        &self.questions[self.question_index]
    }

    /// Kick off the first question. Only valid once, from the waiting phase.
    pub fn start(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Waiting => self.category_entry(),
            _ => vec![],
        }
    }

    /// Apply an attributed player action. Illegal input yields no effects.
    pub fn act(&mut self, slot: Slot, action: PlayerAction) -> Vec<Effect> {
        match (self.phase, action) {
            (Phase::Betting, PlayerAction::Bet(amount)) => self.bet(slot, amount),
            (Phase::Betting, PlayerAction::Match) => self.match_bet(slot),
            (Phase::Betting, PlayerAction::Raise(amount)) => self.raise(slot, amount),
            (Phase::Betting, PlayerAction::Fold) => self.fold(slot),
            (Phase::Clue, PlayerAction::Buzz) => self.buzz(slot),
            (Phase::Answer, PlayerAction::Answer(text)) => self.answer(slot, text),
            (Phase::Answer, PlayerAction::Typing(text)) => self.typing(slot, text),
            _ => vec![],
        }
    }

    /// Apply a timer expiry. Stale kinds that no longer match the phase
    /// fall through harmlessly.
    pub fn expire(&mut self, kind: TimerKind) -> Vec<Effect> {
        match (self.phase, kind) {
            (Phase::Category, TimerKind::Category) => self.betting_entry(),
            (Phase::Betting, TimerKind::Betting) => self.bet_timeout(),
            (Phase::Clue, TimerKind::ClueTick) => self.tick(),
            (Phase::Clue, TimerKind::PostClue) => self.draw_resolution(),
            (Phase::Answer, TimerKind::Answer) => self.answer_timeout(),
            (Phase::Resolution, TimerKind::Resolution) => self.advance(),
            _ => vec![],
        }
    }

    // ── per-question phases ─────────────────────────────────────────

    fn category_entry(&mut self) -> Vec<Effect> {
        self.phase = Phase::Category;
        let first_actor = match self.question_index % 2 {
            0 => Slot::A,
            _ => Slot::B,
        };
        for slot in Slot::BOTH {
            let player = &mut self.players[slot];
            player.balance_at_question_start = player.balance;
            player.answer = None;
        }
        self.ledger = Ledger::new(first_actor);
        self.clue.reset();
        self.buzzer.reset();
        vec![
            Effect::Emit(Event::Category {
                question_index: self.question_index,
                category: self.question().category.clone(),
                ends_at: deadline_in(self.config.category_reveal),
            }),
            Effect::Arm(TimerKind::Category, self.config.category_reveal),
        ]
    }

    fn betting_entry(&mut self) -> Vec<Effect> {
        self.phase = Phase::Betting;
        let actor = self.ledger.first_actor;
        vec![
            Effect::Emit(Event::BettingTurn {
                first_actor: actor,
                awaiting_action: actor,
                available_actions: self.actions_for(actor),
                bet_options: self.menu_for(actor),
                current_bet: self.ledger.current_bet(actor),
                pot: self.ledger.pot,
                deadline: deadline_in(self.config.bet_time_limit),
            }),
            Effect::Arm(TimerKind::Betting, self.config.bet_time_limit),
        ]
    }

    fn actions_for(&self, slot: Slot) -> Vec<BetAction> {
        self.ledger
            .available_actions(slot, self.players[slot].can_fold())
    }
    fn menu_for(&self, slot: Slot) -> Vec<Chips> {
        bet_menu(&self.config.bet_tiers, self.players[slot].balance)
    }
    fn my_turn(&self, slot: Slot) -> bool {
        self.ledger.awaiting_action == Some(slot)
    }

    /// BetPlaced payload for an action that passes the turn.
    fn bet_placed(&self, slot: Slot, action: BetAction, amount: Chips) -> Event {
        let next = slot.other();
        Event::BetPlaced {
            slot,
            action,
            amount,
            pot: self.ledger.pot,
            awaiting_action: Some(next),
            available_actions: self.actions_for(next),
            current_bet: self.ledger.current_bet(next),
            deadline: Some(deadline_in(self.config.bet_time_limit)),
        }
    }

    /// BetPlaced payload for an action that closes the betting round.
    fn bet_closed(&self, slot: Slot, action: BetAction, amount: Chips) -> Event {
        Event::BetPlaced {
            slot,
            action,
            amount,
            pot: self.ledger.pot,
            awaiting_action: None,
            available_actions: vec![],
            current_bet: None,
            deadline: None,
        }
    }

    fn bet(&mut self, slot: Slot, amount: Chips) -> Vec<Effect> {
        if !self.my_turn(slot)
            || self.ledger.current_bet(slot).is_some()
            || !self.menu_for(slot).contains(&amount)
        {
            return vec![];
        }
        self.players[slot].balance -= amount;
        self.ledger.contributions[slot] += amount;
        self.ledger.bets[slot] = Some(amount);
        self.ledger.pot += amount;
        self.ledger.awaiting_action = Some(slot.other());
        vec![
            Effect::Emit(self.bet_placed(slot, BetAction::Bet, amount)),
            Effect::Arm(TimerKind::Betting, self.config.bet_time_limit),
        ]
    }

    /// Match the open bet; a shortfall becomes a partial all-in match and
    /// the excess lands in the side pot.
    fn match_bet(&mut self, slot: Slot) -> Vec<Effect> {
        if !self.my_turn(slot) || self.ledger.current_bet(slot).is_none() {
            return vec![];
        }
        let owed = self.ledger.owed(slot);
        let pay = owed.min(self.players[slot].balance);
        self.players[slot].balance -= pay;
        self.ledger.contributions[slot] += pay;
        self.ledger.settle_pots();
        let mut effects = vec![
            Effect::Emit(self.bet_closed(slot, BetAction::Match, pay)),
            Effect::Disarm(TimerKind::Betting),
        ];
        effects.extend(self.clue_entry());
        effects
    }

    /// Raise to a new total contribution. Capped at one per question.
    /// If the opponent has no chips left to respond with, betting closes
    /// immediately instead of passing them a dead turn.
    fn raise(&mut self, slot: Slot, amount: Chips) -> Vec<Effect> {
        let other = slot.other();
        let delta = amount.saturating_sub(self.ledger.contributions[slot]);
        if !self.my_turn(slot)
            || self.ledger.current_bet(slot).is_none()
            || self.ledger.raises >= 1
            || amount <= self.ledger.contributions[other]
            || delta == 0
            || delta > self.players[slot].balance
        {
            return vec![];
        }
        self.ledger.raises += 1;
        self.players[slot].balance -= delta;
        self.ledger.contributions[slot] = amount;
        self.ledger.bets[slot] = Some(amount);
        self.ledger.pot += delta;
        if self.players[other].balance == 0 {
            self.ledger.settle_pots();
            let mut effects = vec![
                Effect::Emit(self.bet_closed(slot, BetAction::Raise, amount)),
                Effect::Disarm(TimerKind::Betting),
            ];
            effects.extend(self.clue_entry());
            effects
        } else {
            self.ledger.awaiting_action = Some(other);
            vec![
                Effect::Emit(self.bet_placed(slot, BetAction::Raise, amount)),
                Effect::Arm(TimerKind::Betting, self.config.bet_time_limit),
            ]
        }
    }

    fn fold(&mut self, slot: Slot) -> Vec<Effect> {
        if !self.my_turn(slot) || !self.players[slot].can_fold() {
            return vec![];
        }
        self.players[slot].folds_remaining -= 1;
        self.players[slot.other()].balance += self.ledger.pot;
        self.ledger.pot = 0;
        self.ledger.awaiting_action = None;
        let mut effects = vec![
            Effect::Emit(self.bet_closed(slot, BetAction::Fold, 0)),
            Effect::Disarm(TimerKind::Betting),
        ];
        effects.extend(self.resolution_entry(Outcome::Fold(slot)));
        effects
    }

    /// Betting decision window ran out. Fold if possible, otherwise match
    /// an open bet, otherwise place the smallest available bet.
    fn bet_timeout(&mut self) -> Vec<Effect> {
        let Some(slot) = self.ledger.awaiting_action else {
            return vec![];
        };
        if self.players[slot].can_fold() {
            self.fold(slot)
        } else if self.ledger.current_bet(slot).is_some() {
            self.match_bet(slot)
        } else if let Some(&smallest) = self.menu_for(slot).first() {
            self.bet(slot, smallest)
        } else {
            vec![]
        }
    }

    fn clue_entry(&mut self) -> Vec<Effect> {
        self.phase = Phase::Clue;
        self.clue.reset();
        self.buzzer.reset();
        vec![
            Effect::Emit(Event::Clue {
                clue: self.question().clue.clone(),
                reveal_rate: self.config.reveal_rate_chars_per_sec,
                pot: self.ledger.pot,
            }),
            Effect::Arm(TimerKind::ClueTick, self.config.clue_tick_interval),
        ]
    }

    fn tick(&mut self) -> Vec<Effect> {
        // Interval firings can race a buzz or completion through the
        // command queue; drop anything stale.
        if self.clue.clue_complete || self.buzzer.currently_answering.is_some() {
            return vec![];
        }
        let revealed = self
            .clue
            .advance(self.config.chars_per_tick(), self.question().clue_len());
        let mut effects = vec![Effect::Emit(Event::ClueTick {
            reveal_index: revealed,
        })];
        if revealed == self.question().clue_len() {
            self.clue.clue_complete = true;
            self.clue.clue_complete_at = Some(now_ms());
            effects.push(Effect::Emit(Event::ClueComplete {
                deadline: deadline_in(self.config.post_clue_timeout),
            }));
            effects.push(Effect::Disarm(TimerKind::ClueTick));
            effects.push(Effect::Arm(TimerKind::PostClue, self.config.post_clue_timeout));
        }
        effects
    }

    fn buzz(&mut self, slot: Slot) -> Vec<Effect> {
        if !self.buzzer.may_buzz(slot) {
            return vec![];
        }
        self.phase = Phase::Answer;
        self.buzzer.status[slot] = BuzzerStatus::Buzzed;
        self.buzzer.currently_answering = Some(slot);
        let deadline = deadline_in(self.config.answer_time_limit);
        self.buzzer.answer_deadline = Some(deadline);
        vec![
            Effect::Disarm(TimerKind::ClueTick),
            Effect::Disarm(TimerKind::PostClue),
            Effect::Emit(Event::Buzzed {
                slot,
                answer_deadline: deadline,
            }),
            Effect::Arm(TimerKind::Answer, self.config.answer_time_limit),
        ]
    }

    fn answer(&mut self, slot: Slot, text: String) -> Vec<Effect> {
        if self.buzzer.currently_answering != Some(slot) {
            return vec![];
        }
        self.players[slot].answer = Some(text.clone());
        let correct = self.question().accepts(&text);
        let mut effects = vec![
            Effect::Emit(Event::AnswerSubmitted {
                slot,
                answer: text,
                correct,
            }),
            Effect::Disarm(TimerKind::Answer),
        ];
        if correct {
            self.award(slot);
            effects.extend(self.resolution_entry(Outcome::Win(slot)));
        } else {
            self.buzzer.status[slot] = BuzzerStatus::Failed;
            self.buzzer.currently_answering = None;
            self.buzzer.answer_deadline = None;
            if self.buzzer.exhausted() {
                effects.extend(self.draw_resolution());
            } else {
                effects.extend(self.resume());
            }
        }
        effects
    }

    fn answer_timeout(&mut self) -> Vec<Effect> {
        match self.buzzer.currently_answering {
            Some(slot) => self.answer(slot, String::new()),
            None => vec![],
        }
    }

    fn typing(&mut self, slot: Slot, text: String) -> Vec<Effect> {
        if self.buzzer.currently_answering != Some(slot) {
            return vec![];
        }
        vec![Effect::Emit(Event::Typing { slot, text })]
    }

    /// Reopen the clue for the remaining contender after a wrong answer.
    /// A fresh buzz window starts if the clue was already fully revealed.
    fn resume(&mut self) -> Vec<Effect> {
        self.phase = Phase::Clue;
        if self.clue.clue_complete {
            vec![
                Effect::Emit(Event::ClueResumed {
                    reveal_index: self.clue.reveal_index,
                    deadline: Some(deadline_in(self.config.post_clue_timeout)),
                }),
                Effect::Arm(TimerKind::PostClue, self.config.post_clue_timeout),
            ]
        } else {
            vec![
                Effect::Emit(Event::ClueResumed {
                    reveal_index: self.clue.reveal_index,
                    deadline: None,
                }),
                Effect::Arm(TimerKind::ClueTick, self.config.clue_tick_interval),
            ]
        }
    }

    /// Correct answer: main pot to the answerer, side pot back to its owner.
    fn award(&mut self, slot: Slot) {
        self.players[slot].balance += self.ledger.pot;
        self.ledger.pot = 0;
        if let Some(owner) = self.ledger.side_owner() {
            self.players[owner].balance += self.ledger.side_pot;
            self.ledger.side_pot = 0;
        }
    }

    /// Nobody answered correctly: every chip goes back where it came from.
    fn draw_resolution(&mut self) -> Vec<Effect> {
        for slot in Slot::BOTH {
            self.players[slot].balance += self.ledger.contributions[slot];
        }
        self.ledger.pot = 0;
        self.ledger.side_pot = 0;
        self.resolution_entry(Outcome::Draw)
    }

    fn resolution_entry(&mut self, outcome: Outcome) -> Vec<Effect> {
        self.phase = Phase::Resolution;
        vec![
            Effect::DisarmAll,
            Effect::Emit(Event::Resolution {
                outcome,
                correct_answer: self.question().display_answer.clone(),
                answers: self.players.map(|_, p| p.answer.clone()),
                balance_changes: self.players.map(|_, p| p.delta()),
                new_balances: self.balances(),
                next_phase_at: deadline_in(self.config.resolution_display),
            }),
            Effect::Arm(TimerKind::Resolution, self.config.resolution_display),
        ]
    }

    /// Resolution display elapsed: next question, or the end of the match
    /// when questions run out or either side is broke.
    fn advance(&mut self) -> Vec<Effect> {
        self.question_index += 1;
        let broke = Slot::BOTH.iter().any(|&s| self.players[s].balance == 0);
        if self.question_index >= self.config.questions_per_match || broke {
            self.complete()
        } else {
            self.category_entry()
        }
    }

    fn complete(&mut self) -> Vec<Effect> {
        self.phase = Phase::Complete;
        let balances = self.balances();
        let winner = match balances[Slot::A].cmp(&balances[Slot::B]) {
            std::cmp::Ordering::Greater => MatchResult::Winner(Slot::A),
            std::cmp::Ordering::Less => MatchResult::Winner(Slot::B),
            std::cmp::Ordering::Equal => MatchResult::Tie,
        };
        vec![
            Effect::DisarmAll,
            Effect::Emit(Event::Complete {
                winner,
                final_balances: balances,
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(i: usize) -> Question {
        Question {
            id: format!("q{}", i),
            category: format!("Category {}", i),
            clue: "This city hosted the 1992 Summer Olympics".into(),
            accepted_answers: vec!["barcelona".into()],
            display_answer: "Barcelona".into(),
        }
    }
    fn questions(n: usize) -> Vec<Question> {
        (0..n).map(question).collect()
    }
    fn engine() -> MatchEngine {
        MatchEngine::new(MatchConfig::default(), questions(3)).unwrap()
    }
    /// Drive an engine from waiting into the first betting phase.
    fn into_betting(engine: &mut MatchEngine) {
        engine.start();
        engine.expire(TimerKind::Category);
        assert_eq!(engine.phase(), Phase::Betting);
    }
    /// Drive the clue reveal to completion.
    fn reveal_all(engine: &mut MatchEngine) {
        while !engine.clue.clue_complete {
            assert!(!engine.expire(TimerKind::ClueTick).is_empty());
        }
    }
    fn emitted(effects: &[Effect]) -> Vec<&Event> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Emit(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rejects_wrong_question_count() {
        assert!(MatchEngine::new(MatchConfig::default(), questions(2)).is_err());
        assert!(MatchEngine::new(MatchConfig::default(), questions(3)).is_ok());
    }

    #[test]
    fn start_opens_category_once() {
        let mut engine = engine();
        let effects = engine.start();
        assert_eq!(engine.phase(), Phase::Category);
        assert!(matches!(emitted(&effects)[0], Event::Category { question_index: 0, .. }));
        assert!(engine.start().is_empty());
    }

    #[test]
    fn bet_match_moves_to_clue() {
        let mut engine = engine();
        into_betting(&mut engine);
        let effects = engine.act(Slot::A, PlayerAction::Bet(50));
        assert!(matches!(
            emitted(&effects)[0],
            Event::BetPlaced { action: BetAction::Bet, amount: 50, .. }
        ));
        let effects = engine.act(Slot::B, PlayerAction::Match);
        assert_eq!(engine.phase(), Phase::Clue);
        assert_eq!(engine.ledger.pot, 100);
        assert!(matches!(emitted(&effects).last().unwrap(), Event::Clue { pot: 100, .. }));
        assert!(engine.conserved());
    }

    #[test]
    fn out_of_turn_and_off_menu_bets_are_ignored() {
        let mut engine = engine();
        into_betting(&mut engine);
        assert!(engine.act(Slot::B, PlayerAction::Bet(50)).is_empty());
        assert!(engine.act(Slot::A, PlayerAction::Bet(7)).is_empty());
        assert!(engine.act(Slot::A, PlayerAction::Match).is_empty());
        assert_eq!(engine.ledger.awaiting_action, Some(Slot::A));
    }

    #[test]
    fn correct_answer_takes_the_pot() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(50));
        engine.act(Slot::B, PlayerAction::Match);
        reveal_all(&mut engine);
        engine.act(Slot::B, PlayerAction::Buzz);
        assert_eq!(engine.phase(), Phase::Answer);
        let effects = engine.act(Slot::B, PlayerAction::Answer("Barcelona".into()));
        assert_eq!(engine.phase(), Phase::Resolution);
        assert_eq!(engine.balances()[Slot::A], 450);
        assert_eq!(engine.balances()[Slot::B], 550);
        let events = emitted(&effects);
        assert!(matches!(events[0], Event::AnswerSubmitted { correct: true, .. }));
        assert!(matches!(
            events[1],
            Event::Resolution { outcome: Outcome::Win(Slot::B), .. }
        ));
        assert!(engine.conserved());
    }

    #[test]
    fn wrong_answer_resumes_then_both_wrong_draws() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(100));
        engine.act(Slot::B, PlayerAction::Match);
        engine.expire(TimerKind::ClueTick);
        engine.act(Slot::A, PlayerAction::Buzz);
        let effects = engine.act(Slot::A, PlayerAction::Answer("Madrid".into()));
        assert_eq!(engine.phase(), Phase::Clue);
        assert!(emitted(&effects)
            .iter()
            .any(|e| matches!(e, Event::ClueResumed { deadline: None, .. })));
        // A may not buzz again
        assert!(engine.act(Slot::A, PlayerAction::Buzz).is_empty());
        engine.act(Slot::B, PlayerAction::Buzz);
        let effects = engine.act(Slot::B, PlayerAction::Answer("Lisbon".into()));
        assert_eq!(engine.phase(), Phase::Resolution);
        assert!(emitted(&effects)
            .iter()
            .any(|e| matches!(e, Event::Resolution { outcome: Outcome::Draw, .. })));
        assert_eq!(engine.balances(), PerSlot::new(500, 500));
        assert!(engine.conserved());
    }

    #[test]
    fn no_buzz_window_expiry_draws() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(25));
        engine.act(Slot::B, PlayerAction::Match);
        reveal_all(&mut engine);
        let effects = engine.expire(TimerKind::PostClue);
        assert!(emitted(&effects)
            .iter()
            .any(|e| matches!(e, Event::Resolution { outcome: Outcome::Draw, .. })));
        assert_eq!(engine.balances(), PerSlot::new(500, 500));
    }

    #[test]
    fn fold_forfeits_the_pot() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(50));
        let effects = engine.act(Slot::B, PlayerAction::Fold);
        assert_eq!(engine.phase(), Phase::Resolution);
        assert_eq!(engine.balances(), PerSlot::new(500, 500));
        assert_eq!(engine.players[Slot::B].folds_remaining, 1);
        assert!(emitted(&effects)
            .iter()
            .any(|e| matches!(e, Event::Resolution { outcome: Outcome::Fold(Slot::B), .. })));
        assert!(engine.conserved());
    }

    #[test]
    fn fold_with_no_folds_left_is_ignored() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.players[Slot::A].folds_remaining = 0;
        assert!(engine.act(Slot::A, PlayerAction::Fold).is_empty());
        assert_eq!(engine.phase(), Phase::Betting);
        assert_eq!(engine.ledger.awaiting_action, Some(Slot::A));
        assert_eq!(engine.balances(), PerSlot::new(500, 500));
        assert!(engine.conserved());
    }

    #[test]
    fn unaffordable_raise_is_ignored() {
        let config = MatchConfig {
            starting_balance: 150,
            ..MatchConfig::default()
        };
        let mut engine = MatchEngine::new(config, questions(3)).unwrap();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(100));
        assert!(engine.act(Slot::B, PlayerAction::Raise(200)).is_empty());
        assert_eq!(engine.ledger.awaiting_action, Some(Slot::B));
        assert!(engine.conserved());
    }

    #[test]
    fn one_raise_per_question() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(10));
        let effects = engine.act(Slot::B, PlayerAction::Raise(25));
        assert_eq!(engine.ledger.pot, 35);
        match emitted(&effects)[0] {
            Event::BetPlaced { available_actions, .. } => {
                assert!(!available_actions.contains(&BetAction::Raise));
            }
            other => panic!("unexpected event {}", other),
        }
        assert!(engine.act(Slot::A, PlayerAction::Raise(50)).is_empty());
        engine.act(Slot::A, PlayerAction::Match);
        assert_eq!(engine.phase(), Phase::Clue);
        assert_eq!(engine.ledger.pot, 50);
        assert!(engine.conserved());
    }

    #[test]
    fn double_all_in_ends_the_match_early() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(500));
        engine.act(Slot::B, PlayerAction::Match);
        assert_eq!(engine.phase(), Phase::Clue);
        assert_eq!(engine.ledger.pot, 1000);
        reveal_all(&mut engine);
        engine.act(Slot::A, PlayerAction::Buzz);
        engine.act(Slot::A, PlayerAction::Answer("barcelona".into()));
        assert_eq!(engine.balances(), PerSlot::new(1000, 0));
        let effects = engine.expire(TimerKind::Resolution);
        assert_eq!(engine.phase(), Phase::Complete);
        assert!(matches!(
            emitted(&effects)[0],
            Event::Complete { winner: MatchResult::Winner(Slot::A), .. }
        ));
    }

    #[test]
    fn partial_match_builds_a_side_pot() {
        let mut engine = engine();
        // Q1: B wins 50 so balances diverge to 450/550.
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(50));
        engine.act(Slot::B, PlayerAction::Match);
        reveal_all(&mut engine);
        engine.act(Slot::B, PlayerAction::Buzz);
        engine.act(Slot::B, PlayerAction::Answer("barcelona".into()));
        engine.expire(TimerKind::Resolution);
        engine.expire(TimerKind::Category);
        assert_eq!(engine.balances(), PerSlot::new(450, 550));
        // Q2: B (first actor) shoves 550; A can only cover 450.
        engine.act(Slot::B, PlayerAction::Bet(550));
        engine.act(Slot::A, PlayerAction::Match);
        assert_eq!(engine.phase(), Phase::Clue);
        assert_eq!(engine.ledger.pot, 900);
        assert_eq!(engine.ledger.side_pot, 100);
        assert_eq!(engine.ledger.side_owner(), Some(Slot::B));
        assert!(engine.conserved());
        // A wins the main pot; the side pot returns to B.
        reveal_all(&mut engine);
        engine.act(Slot::A, PlayerAction::Buzz);
        engine.act(Slot::A, PlayerAction::Answer("barcelona".into()));
        assert_eq!(engine.balances(), PerSlot::new(900, 100));
        assert!(engine.conserved());
    }

    #[test]
    fn raise_against_an_all_in_closes_betting() {
        let mut engine = engine();
        into_betting(&mut engine);
        // A shoves 500; B raising past it cannot pass A a dead turn.
        engine.act(Slot::A, PlayerAction::Bet(500));
        let effects = engine.act(Slot::B, PlayerAction::Raise(500));
        // raise-to must exceed the opposing contribution
        assert!(effects.is_empty());
        engine.act(Slot::B, PlayerAction::Match);
        assert_eq!(engine.phase(), Phase::Clue);
        assert_eq!(engine.ledger.pot, 1000);
        assert!(engine.conserved());
    }

    #[test]
    fn bet_timeout_folds_when_folds_remain() {
        let mut engine = engine();
        into_betting(&mut engine);
        let effects = engine.expire(TimerKind::Betting);
        assert_eq!(engine.phase(), Phase::Resolution);
        assert_eq!(engine.players[Slot::A].folds_remaining, 1);
        assert!(emitted(&effects)
            .iter()
            .any(|e| matches!(e, Event::Resolution { outcome: Outcome::Fold(Slot::A), .. })));
    }

    #[test]
    fn bet_timeout_forces_smallest_bet_when_folds_exhausted() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.players[Slot::A].folds_remaining = 0;
        let effects = engine.expire(TimerKind::Betting);
        assert!(matches!(
            emitted(&effects)[0],
            Event::BetPlaced { action: BetAction::Bet, amount: 5, .. }
        ));
        assert_eq!(engine.ledger.awaiting_action, Some(Slot::B));
    }

    #[test]
    fn bet_timeout_matches_when_facing_a_bet_with_no_folds() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(100));
        engine.players[Slot::B].folds_remaining = 0;
        let effects = engine.expire(TimerKind::Betting);
        assert!(matches!(
            emitted(&effects)[0],
            Event::BetPlaced { action: BetAction::Match, amount: 100, .. }
        ));
        assert_eq!(engine.phase(), Phase::Clue);
        assert!(engine.conserved());
    }

    #[test]
    fn reveal_is_monotone_and_stale_ticks_are_dropped() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(5));
        engine.act(Slot::B, PlayerAction::Match);
        let mut last = 0;
        loop {
            let effects = engine.expire(TimerKind::ClueTick);
            match emitted(&effects).first() {
                Some(Event::ClueTick { reveal_index }) => {
                    assert!(*reveal_index > last);
                    last = *reveal_index;
                }
                _ => break,
            }
            if engine.clue.clue_complete {
                break;
            }
        }
        assert_eq!(last, engine.question().clue_len());
        // interval fire after completion is a no-op
        assert!(engine.expire(TimerKind::ClueTick).is_empty());
    }

    #[test]
    fn answer_timeout_counts_as_a_wrong_empty_answer() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(10));
        engine.act(Slot::B, PlayerAction::Match);
        engine.expire(TimerKind::ClueTick);
        engine.act(Slot::B, PlayerAction::Buzz);
        let effects = engine.expire(TimerKind::Answer);
        let events = emitted(&effects);
        assert!(matches!(
            events[0],
            Event::AnswerSubmitted { slot: Slot::B, correct: false, .. }
        ));
        assert_eq!(engine.phase(), Phase::Clue);
        assert_eq!(engine.buzzer.status[Slot::B], BuzzerStatus::Failed);
    }

    #[test]
    fn typing_echoes_without_mutating() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Bet(10));
        engine.act(Slot::B, PlayerAction::Match);
        engine.expire(TimerKind::ClueTick);
        engine.act(Slot::A, PlayerAction::Buzz);
        // only the answering slot echoes
        assert!(engine.act(Slot::B, PlayerAction::Typing("x".into())).is_empty());
        let effects = engine.act(Slot::A, PlayerAction::Typing("barc".into()));
        assert!(matches!(
            emitted(&effects)[0],
            Event::Typing { slot: Slot::A, .. }
        ));
        assert_eq!(engine.phase(), Phase::Answer);
        assert!(engine.conserved());
    }

    #[test]
    fn three_instant_folds_end_in_a_tie() {
        let mut engine = engine();
        into_betting(&mut engine);
        engine.act(Slot::A, PlayerAction::Fold);
        engine.expire(TimerKind::Resolution);
        engine.expire(TimerKind::Category);
        engine.act(Slot::B, PlayerAction::Fold);
        engine.expire(TimerKind::Resolution);
        engine.expire(TimerKind::Category);
        engine.act(Slot::A, PlayerAction::Fold);
        let effects = engine.expire(TimerKind::Resolution);
        assert_eq!(engine.phase(), Phase::Complete);
        assert!(matches!(
            emitted(&effects)[0],
            Event::Complete { winner: MatchResult::Tie, .. }
        ));
        assert_eq!(engine.balances(), PerSlot::new(500, 500));
    }

    #[test]
    fn first_actor_alternates_by_question() {
        let mut engine = engine();
        into_betting(&mut engine);
        assert_eq!(engine.ledger.first_actor, Slot::A);
        engine.act(Slot::A, PlayerAction::Fold);
        engine.expire(TimerKind::Resolution);
        engine.expire(TimerKind::Category);
        assert_eq!(engine.ledger.first_actor, Slot::B);
    }
}
