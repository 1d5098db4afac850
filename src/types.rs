use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type ConnectionId = String;
pub type Category = String;

/// Minimum number of online players needed to start a game
pub const MIN_PLAYERS: usize = 2;

/// Letters a round can be played with. `K` is left out on purpose.
pub const ROUND_LETTERS: &[u8] = b"ABCDEFGHIJLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    /// Transport identity of the socket currently bound to this player
    pub connection_id: ConnectionId,
    pub is_online: bool,
}

impl Player {
    pub fn new(display_name: String, connection_id: &str) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            display_name,
            connection_id: connection_id.to_string(),
            is_online: true,
        }
    }
}

/// Where the round lifecycle currently stands.
///
/// `Revealing` covers the basta countdown: it is entered when someone calls
/// basta and left once the answers have been revealed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Idle,
    AwaitingAnswers,
    Revealing,
    AwaitingRoundCompletion,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub number: u32,
    pub letter: char,
    /// Categories frozen at round start; later edits do not touch a running round
    pub categories: Vec<Category>,
}

/// One player's answers for the current round. A newer submission replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerSet {
    pub answers: HashMap<Category, String>,
    pub submitted_at: String,
}

impl AnswerSet {
    pub fn new(answers: HashMap<Category, String>) -> Self {
        Self {
            answers,
            submitted_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The trimmed answer for a category, `None` when missing or blank
    pub fn answer_for(&self, category: &str) -> Option<&str> {
        self.answers
            .get(category)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_letters_exclude_k() {
        assert_eq!(ROUND_LETTERS.len(), 25);
        assert!(!ROUND_LETTERS.contains(&b'K'));
    }

    #[test]
    fn test_answer_for_ignores_blank_answers() {
        let set = AnswerSet::new(HashMap::from([
            ("Color".to_string(), "  Blue ".to_string()),
            ("Food".to_string(), "   ".to_string()),
        ]));

        assert_eq!(set.answer_for("Color"), Some("Blue"));
        assert_eq!(set.answer_for("Food"), None);
        assert_eq!(set.answer_for("Movie"), None);
    }
}
