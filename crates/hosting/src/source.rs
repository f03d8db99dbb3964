use bzp_engine::Question;
use rand::seq::SliceRandom;

/// Where a match's questions come from. Drawn once per room, before
/// the room task spawns, so a bad deck fails the create request instead
/// of a running match.
#[async_trait::async_trait]
pub trait QuestionSource: Send + Sync {
    /// Draw `count` distinct questions in play order.
    async fn draw(&self, count: usize) -> anyhow::Result<Vec<Question>>;
}

/// A deck held in memory, drawn from uniformly without replacement.
pub struct Deck {
    questions: Vec<Question>,
}

impl Deck {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
    /// Load a deck from a JSON file containing an array of questions.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        log::info!("[deck] loaded {} questions from {}", questions.len(), path);
        Ok(Self::new(questions))
    }
    pub fn len(&self) -> usize {
        self.questions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[async_trait::async_trait]
impl QuestionSource for Deck {
    async fn draw(&self, count: usize) -> anyhow::Result<Vec<Question>> {
        if self.questions.len() < count {
            anyhow::bail!(
                "deck has {} questions but {} were requested",
                self.questions.len(),
                count
            );
        }
        let mut drawn = self.questions.clone();
        drawn.shuffle(&mut rand::rng());
        drawn.truncate(count);
        Ok(drawn)
    }
}

/// Built-in starter deck, used when no deck file is configured.
pub fn sample_deck() -> Deck {
    let raw = include_str!("sample_questions.json");
    let questions: Vec<Question> = serde_json::from_str(raw).expect("bundled deck parses");
    Deck::new(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn draws_distinct_questions() {
        let deck = sample_deck();
        let drawn = deck.draw(3).await.unwrap();
        assert_eq!(drawn.len(), 3);
        let mut ids: Vec<&str> = drawn.iter().map(|q| q.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn short_deck_fails_the_draw() {
        let deck = Deck::new(vec![]);
        assert!(deck.draw(3).await.is_err());
    }

    #[test]
    fn bundled_deck_is_large_enough() {
        assert!(sample_deck().len() >= bzp_core::QUESTIONS_PER_MATCH);
    }
}
