//! Core type aliases, constants, and runtime utilities for buzzpot.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the buzzpot workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Chip balances, bets, and pot sizes.
pub type Chips = u32;
/// Signed per-question balance change.
pub type Delta = i64;
/// Wall-clock timestamps in milliseconds since the unix epoch.
pub type Millis = u64;

// ============================================================================
// GAME PARAMETERS
// ============================================================================
/// Chips each player starts the match with.
pub const STARTING_BALANCE: Chips = 500;
/// Questions per match; the match ends after this many resolutions.
pub const QUESTIONS_PER_MATCH: usize = 3;
/// Folds each player may use across the whole match.
pub const FOLDS_PER_PLAYER: u8 = 2;
/// Fixed bet increments; the exact balance is appended for all-ins.
pub const BET_TIERS: [Chips; 5] = [5, 10, 25, 50, 100];
/// Clue characters exposed per second during the clue phase.
pub const REVEAL_RATE_CHARS_PER_SEC: u32 = 12;

// ============================================================================
// TIMING PARAMETERS
// ============================================================================
/// Category is shown for this long before betting opens (seconds).
pub const CATEGORY_REVEAL_SEC: u64 = 3;
/// Per-turn betting decision window (seconds).
pub const BET_TIME_LIMIT_SEC: u64 = 15;
/// Reveal tick granularity (milliseconds).
pub const CLUE_TICK_INTERVAL_MS: u64 = 500;
/// Window to buzz after the clue is fully revealed (seconds).
pub const POST_CLUE_TIMEOUT_SEC: u64 = 5;
/// Window to answer after buzzing (seconds).
pub const ANSWER_TIME_LIMIT_SEC: u64 = 5;
/// Resolution screen dwell before the next question (seconds).
pub const RESOLUTION_DISPLAY_SEC: u64 = 3;

/// Rating assumed for players with no recorded history.
pub const DEFAULT_RATING: u32 = 1200;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and code minting.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// ROOM CODES
// ============================================================================
/// Alphabet for room codes. Ambiguous glyphs (0/O, 1/I) are excluded.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of a room code.
const CODE_LENGTH: usize = 6;

/// Opaque, human-friendly identifier for a match room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Arbitrary for RoomCode {
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        Self(
            (0..CODE_LENGTH)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect(),
        )
    }
}

impl std::str::FromStr for RoomCode {
    type Err = InvalidRoomCode;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            Ok(Self(code))
        } else {
            Err(InvalidRoomCode(s.to_string()))
        }
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejection for malformed room codes presented by clients.
#[derive(Debug, Clone)]
pub struct InvalidRoomCode(pub String);

impl std::fmt::Display for InvalidRoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid room code: {}", self.0)
    }
}

impl std::error::Error for InvalidRoomCode {}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Current wall-clock time in milliseconds since the unix epoch.
pub fn now_ms() -> Millis {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_millis() as Millis
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
