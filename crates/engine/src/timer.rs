use bzp_core::*;
use std::time::Duration;

/// The per-match timer table is keyed by purpose. Every phase transition
/// disarms the timers that no longer apply before arming new ones, so a
/// stale timer can never fire into a phase it does not belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One-shot: category reveal → betting.
    Category,
    /// One-shot: per-turn betting decision window.
    Betting,
    /// Recurring: clue reveal tick. The only interval timer.
    ClueTick,
    /// One-shot: buzz window after the clue is fully revealed.
    PostClue,
    /// One-shot: answer window after a buzz.
    Answer,
    /// One-shot: resolution display → next question.
    Resolution,
}

impl TimerKind {
    pub const ALL: [TimerKind; 6] = [
        TimerKind::Category,
        TimerKind::Betting,
        TimerKind::ClueTick,
        TimerKind::PostClue,
        TimerKind::Answer,
        TimerKind::Resolution,
    ];
    pub fn is_interval(self) -> bool {
        matches!(self, TimerKind::ClueTick)
    }
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Category => write!(f, "category"),
            TimerKind::Betting => write!(f, "betting"),
            TimerKind::ClueTick => write!(f, "clueTick"),
            TimerKind::PostClue => write!(f, "postClue"),
            TimerKind::Answer => write!(f, "answer"),
            TimerKind::Resolution => write!(f, "resolution"),
        }
    }
}

/// Wall-clock deadline a duration from now, for client countdowns.
pub fn deadline_in(duration: Duration) -> Millis {
    now_ms() + duration.as_millis() as Millis
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn only_clue_tick_recurs() {
        assert!(TimerKind::ClueTick.is_interval());
        assert!(
            TimerKind::ALL
                .iter()
                .filter(|k| k.is_interval())
                .count()
                == 1
        );
    }
    #[test]
    fn deadline_is_in_the_future() {
        let deadline = deadline_in(Duration::from_secs(5));
        assert!(deadline >= now_ms() + 4_000);
    }
}
