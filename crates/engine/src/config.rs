use bzp_core::*;
use serde::Serialize;
use std::time::Duration;

/// Tunable parameters for one match.
/// Defaults come from the production constants in `bzp-core`;
/// tests substitute millisecond-scale timings.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub starting_balance: Chips,
    pub questions_per_match: usize,
    pub folds_per_player: u8,
    pub bet_tiers: Vec<Chips>,
    pub reveal_rate_chars_per_sec: u32,
    pub category_reveal: Duration,
    pub bet_time_limit: Duration,
    pub clue_tick_interval: Duration,
    pub post_clue_timeout: Duration,
    pub answer_time_limit: Duration,
    pub resolution_display: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            questions_per_match: QUESTIONS_PER_MATCH,
            folds_per_player: FOLDS_PER_PLAYER,
            bet_tiers: BET_TIERS.to_vec(),
            reveal_rate_chars_per_sec: REVEAL_RATE_CHARS_PER_SEC,
            category_reveal: Duration::from_secs(CATEGORY_REVEAL_SEC),
            bet_time_limit: Duration::from_secs(BET_TIME_LIMIT_SEC),
            clue_tick_interval: Duration::from_millis(CLUE_TICK_INTERVAL_MS),
            post_clue_timeout: Duration::from_secs(POST_CLUE_TIMEOUT_SEC),
            answer_time_limit: Duration::from_secs(ANSWER_TIME_LIMIT_SEC),
            resolution_display: Duration::from_secs(RESOLUTION_DISPLAY_SEC),
        }
    }
}

impl MatchConfig {
    /// Clue characters exposed per reveal tick, never zero.
    pub fn chars_per_tick(&self) -> usize {
        let per_ms = self.reveal_rate_chars_per_sec as u64 * self.clue_tick_interval.as_millis() as u64;
        (per_ms.div_ceil(1000)).max(1) as usize
    }
}

/// Subset of the config echoed to clients on join, so both UIs
/// render countdowns against the same numbers the server enforces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEcho {
    pub reveal_rate_chars_per_sec: u32,
    pub post_clue_timeout_sec: u64,
    pub answer_time_limit_sec: u64,
    pub category_reveal_sec: u64,
    pub bet_time_limit_sec: u64,
    pub folds_per_player: u8,
}

impl From<&MatchConfig> for ConfigEcho {
    fn from(config: &MatchConfig) -> Self {
        Self {
            reveal_rate_chars_per_sec: config.reveal_rate_chars_per_sec,
            post_clue_timeout_sec: config.post_clue_timeout.as_secs(),
            answer_time_limit_sec: config.answer_time_limit.as_secs(),
            category_reveal_sec: config.category_reveal.as_secs(),
            bet_time_limit_sec: config.bet_time_limit.as_secs(),
            folds_per_player: config.folds_per_player,
        }
    }
}
