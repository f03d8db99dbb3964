use super::*;
use bzp_core::*;
use bzp_engine::*;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// What gets reported when a match finishes with both seats bound.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub code: RoomCode,
    pub participants: PerSlot<ParticipantId>,
    pub winner: MatchResult,
    pub final_balances: PerSlot<Chips>,
}

/// Persistence seam for player ratings and match results. The lobby
/// only ever talks to this trait, so deployments can plug in whatever
/// backend they run.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync {
    /// Current rating, defaulting for unknown players.
    async fn rating(&self, id: ParticipantId) -> u32;
    /// Record a finished match.
    async fn record(&self, record: MatchRecord) -> anyhow::Result<()>;
}

/// Discards results and rates everyone the same. For tests and
/// deployments that do not track players.
pub struct NullStats;

#[async_trait::async_trait]
impl StatsStore for NullStats {
    async fn rating(&self, _: ParticipantId) -> u32 {
        DEFAULT_RATING
    }
    async fn record(&self, _: MatchRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

const RATING_STEP: u32 = 25;

/// In-process rating table. Winners gain a fixed step, losers lose it,
/// ties move nobody.
#[derive(Default)]
pub struct MemoryStats {
    ratings: RwLock<HashMap<ParticipantId, u32>>,
}

#[async_trait::async_trait]
impl StatsStore for MemoryStats {
    async fn rating(&self, id: ParticipantId) -> u32 {
        self.ratings
            .read()
            .await
            .get(&id)
            .copied()
            .unwrap_or(DEFAULT_RATING)
    }
    async fn record(&self, record: MatchRecord) -> anyhow::Result<()> {
        let MatchResult::Winner(winner) = record.winner else {
            return Ok(());
        };
        let mut ratings = self.ratings.write().await;
        for slot in Slot::BOTH {
            let id = record.participants[slot];
            let rating = ratings.entry(id).or_insert(DEFAULT_RATING);
            if slot == winner {
                *rating += RATING_STEP;
            } else {
                *rating = rating.saturating_sub(RATING_STEP);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(winner: MatchResult, a: ParticipantId, b: ParticipantId) -> MatchRecord {
        MatchRecord {
            code: "ABCDEF".parse().unwrap(),
            participants: PerSlot::new(a, b),
            winner,
            final_balances: PerSlot::new(700, 300),
        }
    }

    #[tokio::test]
    async fn winners_climb_and_losers_fall() {
        let stats = MemoryStats::default();
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        stats
            .record(record(MatchResult::Winner(Slot::A), a, b))
            .await
            .unwrap();
        assert_eq!(stats.rating(a).await, DEFAULT_RATING + RATING_STEP);
        assert_eq!(stats.rating(b).await, DEFAULT_RATING - RATING_STEP);
    }

    #[tokio::test]
    async fn ties_move_nobody() {
        let stats = MemoryStats::default();
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        stats.record(record(MatchResult::Tie, a, b)).await.unwrap();
        assert_eq!(stats.rating(a).await, DEFAULT_RATING);
        assert_eq!(stats.rating(b).await, DEFAULT_RATING);
    }
}
