use super::*;
use bzp_core::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Commands accepted by a running room task. Everything that can touch
/// match state funnels through this queue and is applied one at a time,
/// which is what makes simultaneous buzzes and racing timers safe.
#[derive(Debug)]
pub enum Command {
    /// Begin the match. Idempotent; only the first one acts.
    Start,
    /// An attributed player action, already decoded.
    Act(Slot, PlayerAction),
    /// A timer fired. Carries the generation it was armed under so a
    /// firing that raced a disarm is dropped instead of misapplied.
    Expire(TimerKind, u64),
    /// Bind a slot's outbox for broadcasts.
    Attach(Slot, UnboundedSender<String>),
    /// Unbind a slot's outbox on disconnect.
    Detach(Slot),
    /// Reply with current state and pending deadline, for reconnects.
    Snapshot(oneshot::Sender<(Snapshot, Option<Millis>)>),
    /// Broadcast a pre-encoded frame to both outboxes. Used by the
    /// coordinator for room-level notices the engine knows nothing about.
    Notify(String),
    /// Tear the room down. Idempotent.
    Destroy,
}

/// What the room reports upward when a match finishes.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub code: RoomCode,
    pub winner: MatchResult,
    pub final_balances: PerSlot<Chips>,
}

struct ArmedTimer {
    handle: JoinHandle<()>,
    generation: u64,
    ends_at: Millis,
}

/// Live match coordinator.
/// Imperative shell that owns the [`MatchEngine`] (functional core) and
/// handles clocks, broadcasting, and lifecycle concerns. Runs as a
/// single task consuming its [`Command`] queue.
pub struct Room {
    code: RoomCode,
    engine: MatchEngine,
    outboxes: PerSlot<Option<UnboundedSender<String>>>,
    timers: HashMap<TimerKind, ArmedTimer>,
    generation: u64,
    tx: UnboundedSender<Command>,
    done: Option<oneshot::Sender<MatchSummary>>,
}

impl Room {
    /// Spawn the room task. The returned sender is the only handle to
    /// the room; dropping it does not stop the task, `Destroy` does.
    pub fn spawn(
        code: RoomCode,
        config: MatchConfig,
        questions: Vec<Question>,
        done: oneshot::Sender<MatchSummary>,
    ) -> Result<UnboundedSender<Command>, SetupError> {
        let engine = MatchEngine::new(config, questions)?;
        let (tx, mut rx) = unbounded_channel();
        let mut room = Room {
            code,
            engine,
            outboxes: PerSlot::init(|_| None),
            timers: HashMap::new(),
            generation: 0,
            tx: tx.clone(),
            done: Some(done),
        };
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                if room.apply(command) {
                    break;
                }
            }
            room.disarm_all();
            log::debug!("[room {}] task exited", room.code);
        });
        Ok(tx)
    }

    /// Apply one command. Returns true when the room should shut down.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => {
                let effects = self.engine.start();
                self.run_effects(effects);
            }
            Command::Act(slot, action) => {
                log::trace!("[room {}] {}: {}", self.code, slot, action);
                let effects = self.engine.act(slot, action);
                self.run_effects(effects);
            }
            Command::Expire(kind, generation) => {
                if self.accept_expiry(kind, generation) {
                    let effects = self.engine.expire(kind);
                    self.run_effects(effects);
                }
            }
            Command::Attach(slot, outbox) => {
                self.outboxes[slot] = Some(outbox);
            }
            Command::Detach(slot) => {
                self.outboxes[slot] = None;
            }
            Command::Snapshot(reply) => {
                let _ = reply.send((self.engine.snapshot(), self.deadline()));
            }
            Command::Notify(json) => {
                self.send_all(json);
            }
            Command::Destroy => return true,
        }
        if !self.engine.conserved() {
            log::error!("[room {}] chip conservation violated, aborting", self.code);
            self.send_all(ServerMessage::error("internal error").to_json());
            return true;
        }
        false
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.broadcast(event),
                Effect::Arm(kind, duration) => self.arm(kind, duration),
                Effect::Disarm(kind) => self.disarm(kind),
                Effect::DisarmAll => self.disarm_all(),
            }
        }
    }

    fn broadcast(&mut self, event: Event) {
        log::trace!("[room {}] {}", self.code, event);
        if let Event::Complete {
            winner,
            final_balances,
        } = &event
        {
            if let Some(done) = self.done.take() {
                let _ = done.send(MatchSummary {
                    code: self.code.clone(),
                    winner: *winner,
                    final_balances: *final_balances,
                });
            }
        }
        self.send_all(Protocol::encode(&event).to_json());
    }

    fn send_all(&mut self, json: String) {
        for slot in Slot::BOTH {
            let dead = match &self.outboxes[slot] {
                Some(outbox) => outbox.send(json.clone()).is_err(),
                None => false,
            };
            if dead {
                self.outboxes[slot] = None;
            }
        }
    }

    // ── timer table ─────────────────────────────────────────────────

    /// A firing is only valid if it carries the generation the timer is
    /// currently armed under. Accepted one-shots leave the table so a
    /// duplicate firing cannot be accepted twice.
    fn accept_expiry(&mut self, kind: TimerKind, generation: u64) -> bool {
        match self.timers.get(&kind) {
            Some(armed) if armed.generation == generation => {
                if !kind.is_interval() {
                    self.timers.remove(&kind);
                }
                true
            }
            _ => false,
        }
    }

    fn arm(&mut self, kind: TimerKind, duration: Duration) {
        self.disarm(kind);
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        let handle = if kind.is_interval() {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(duration);
                interval.tick().await; // first tick resolves immediately
                loop {
                    interval.tick().await;
                    if tx.send(Command::Expire(kind, generation)).is_err() {
                        break;
                    }
                }
            })
        } else {
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                let _ = tx.send(Command::Expire(kind, generation));
            })
        };
        self.timers.insert(
            kind,
            ArmedTimer {
                handle,
                generation,
                ends_at: deadline_in(duration),
            },
        );
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(armed) = self.timers.remove(&kind) {
            armed.handle.abort();
        }
    }

    fn disarm_all(&mut self) {
        for (_, armed) in self.timers.drain() {
            armed.handle.abort();
        }
    }

    /// The pending one-shot deadline, if any; at most one is armed at a
    /// time so this is the countdown a reconnecting client should show.
    fn deadline(&self) -> Option<Millis> {
        TimerKind::ALL
            .iter()
            .filter(|kind| !kind.is_interval())
            .filter_map(|kind| self.timers.get(kind))
            .map(|armed| armed.ends_at)
            .next()
    }
}
