//! Consensus scoring.
//!
//! An answer only earns points when every other online player explicitly
//! marked it valid. A player who never voted on an answer counts against it.

use super::{AppState, Session, ValidationLedger};
use crate::broadcast;
use crate::error::{GameError, GameResult};
use crate::protocol::{PlayerSummary, ServerMessage, Winner};
use crate::types::*;
use std::collections::HashMap;

/// Points for one unanimously accepted answer
pub const POINTS_PER_ANSWER: u32 = 100;

/// Score one round for the given online players.
///
/// Players without an answer set, and blank answers, earn nothing.
pub fn score_round(
    categories: &[Category],
    online: &[&Player],
    answers: &HashMap<PlayerId, AnswerSet>,
    ledger: &ValidationLedger,
) -> HashMap<PlayerId, u32> {
    online
        .iter()
        .map(|player| {
            let Some(set) = answers.get(&player.id) else {
                return (player.id.clone(), 0);
            };

            let validators: Vec<&PlayerId> = online
                .iter()
                .filter(|v| v.id != player.id)
                .map(|v| &v.id)
                .collect();

            let score = categories
                .iter()
                .filter(|category| set.answer_for(category).is_some())
                .filter(|category| {
                    !validators.is_empty()
                        && validators.iter().all(|validator| {
                            ledger.verdict(validator, &player.id, category) == Some(true)
                        })
                })
                .count() as u32
                * POINTS_PER_ANSWER;

            (player.id.clone(), score)
        })
        .collect()
}

/// Strictly highest cumulative score; ties go to whoever joined first
pub fn pick_winner(players: &[Player], scores: &HashMap<PlayerId, u32>) -> Option<Winner> {
    let mut winner: Option<Winner> = None;
    for player in players {
        let score = scores.get(&player.id).copied().unwrap_or(0);
        let leads = match &winner {
            Some(w) => score > w.score,
            None => true,
        };
        if leads {
            winner = Some(Winner {
                id: player.id.clone(),
                name: player.display_name.clone(),
                score,
            });
        }
    }
    winner
}

impl AppState {
    /// A player is done validating. Scores the round once every online player is.
    pub async fn round_complete(&self, connection_id: &str) -> GameResult<bool> {
        let mut session = self.session.write().await;
        let player = session
            .players
            .by_connection(connection_id)
            .cloned()
            .ok_or(GameError::NotRegistered)?;

        if session.phase != RoundPhase::AwaitingRoundCompletion {
            tracing::debug!(
                "Ignoring round completion from {} in phase {:?}",
                player.display_name,
                session.phase
            );
            return Ok(false);
        }

        session.ready.insert(player.id);
        tracing::info!("{} marked ready for next round", player.display_name);
        Ok(self.try_finish_round(&mut session))
    }

    /// Score the round if all online players are ready.
    /// Returns `true` when scoring happened.
    pub(crate) fn try_finish_round(&self, session: &mut Session) -> bool {
        if session.phase != RoundPhase::AwaitingRoundCompletion {
            return false;
        }

        let online: Vec<&Player> = session.players.online().collect();
        let ready = online
            .iter()
            .filter(|p| session.ready.contains(&p.id))
            .count();
        if online.is_empty() || ready < online.len() {
            tracing::info!("{}/{} players ready", ready, online.len());
            return false;
        }

        let categories = session
            .round
            .as_ref()
            .map(|r| r.categories.clone())
            .unwrap_or_default();
        let round_scores = score_round(&categories, &online, &session.revealed, &session.ledger);

        for (player_id, points) in &round_scores {
            *session.scores.entry(player_id.clone()).or_insert(0) += points;
        }
        tracing::info!("Round {} scores: {:?}", session.round_no, round_scores);

        self.broadcast_to_all(session.scores_message());
        session.ready.clear();
        session.ledger.clear();

        if session.round_no >= self.config.max_rounds {
            self.finish_game(session);
        } else {
            session.phase = RoundPhase::Idle;
            self.broadcast_to_all(ServerMessage::NextRound);
            broadcast::spawn_round_start(self.clone(), session.epoch);
        }
        true
    }

    fn finish_game(&self, session: &mut Session) {
        let winner = pick_winner(session.players.all(), &session.scores);
        tracing::info!(
            "Game over after {} rounds, winner: {:?}",
            session.round_no,
            winner
        );

        self.broadcast_to_all(ServerMessage::GameOver {
            winner,
            final_scores: session.scores.clone(),
            players: session.players.online().map(PlayerSummary::from).collect(),
        });

        session.is_game_active = false;
        session.round_no = 0;
        session.phase = RoundPhase::GameOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::*;

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            connection_id: format!("conn-{}", id),
            is_online: true,
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
        AnswerSet::new(
            pairs
                .iter()
                .map(|(c, a)| (c.to_string(), a.to_string()))
                .collect(),
        )
    }

    fn categories() -> Vec<Category> {
        vec!["Color".to_string(), "Food".to_string()]
    }

    #[test]
    fn test_three_player_scenario() {
        let (a, b, c) = (player("a"), player("b"), player("c"));
        let online = vec![&a, &b, &c];
        let sets = HashMap::from([
            ("a".to_string(), answers(&[("Color", "Blue"), ("Food", "Bread")])),
            ("b".to_string(), answers(&[("Color", "Black"), ("Food", "")])),
            ("c".to_string(), answers(&[("Color", "Blue"), ("Food", "Biscuit")])),
        ]);

        let mut ledger = ValidationLedger::default();
        for validator in ["b", "c"] {
            ledger.record(validator, "a", "Color", true);
            ledger.record(validator, "a", "Food", true);
        }
        // Only A accepts B's color; B's blank food can never score
        ledger.record("a", "b", "Color", true);
        ledger.record("a", "b", "Food", true);
        ledger.record("c", "b", "Food", true);
        // C gets everything from A and B
        for validator in ["a", "b"] {
            ledger.record(validator, "c", "Color", true);
            ledger.record(validator, "c", "Food", true);
        }

        let scores = score_round(&categories(), &online, &sets, &ledger);

        assert_eq!(scores["a"], 200);
        assert_eq!(scores["b"], 0);
        assert_eq!(scores["c"], 200);
    }

    #[test]
    fn test_missing_vote_fails_unanimity() {
        let (a, b, c) = (player("a"), player("b"), player("c"));
        let online = vec![&a, &b, &c];
        let sets = HashMap::from([("a".to_string(), answers(&[("Color", "Blue")]))]);

        let mut ledger = ValidationLedger::default();
        ledger.record("b", "a", "Color", true);

        let scores = score_round(&categories(), &online, &sets, &ledger);
        assert_eq!(scores["a"], 0);

        ledger.record("c", "a", "Color", false);
        let scores = score_round(&categories(), &online, &sets, &ledger);
        assert_eq!(scores["a"], 0);

        ledger.record("c", "a", "Color", true);
        let scores = score_round(&categories(), &online, &sets, &ledger);
        assert_eq!(scores["a"], 100);
    }

    #[test]
    fn test_lone_player_scores_nothing() {
        let a = player("a");
        let sets = HashMap::from([("a".to_string(), answers(&[("Color", "Blue")]))]);

        let scores = score_round(&categories(), &[&a], &sets, &ValidationLedger::default());

        assert_eq!(scores["a"], 0);
    }

    #[test]
    fn test_offline_players_neither_vote_nor_score() {
        let (a, b) = (player("a"), player("b"));
        let sets = HashMap::from([
            ("a".to_string(), answers(&[("Color", "Blue")])),
            ("b".to_string(), answers(&[("Color", "Brown")])),
        ]);
        let mut ledger = ValidationLedger::default();
        ledger.record("b", "a", "Color", true);

        // C went offline and is not passed in, so B alone decides for A
        let scores = score_round(&categories(), &[&a, &b], &sets, &ledger);

        assert_eq!(scores["a"], 100);
        assert_eq!(scores["b"], 0);
        assert!(!scores.contains_key("c"));
    }

    #[test]
    fn test_pick_winner_highest_then_join_order() {
        let players = vec![player("a"), player("b"), player("c")];

        let scores = HashMap::from([
            ("a".to_string(), 300),
            ("b".to_string(), 200),
        ]);
        let winner = pick_winner(&players, &scores).unwrap();
        assert_eq!(winner.id, "a");
        assert_eq!(winner.score, 300);

        let tied = HashMap::from([
            ("a".to_string(), 100),
            ("b".to_string(), 200),
            ("c".to_string(), 200),
        ]);
        assert_eq!(pick_winner(&players, &tied).unwrap().id, "b");

        assert!(pick_winner(&[], &scores).is_none());
    }

    #[tokio::test]
    async fn test_round_completion_waits_for_all_online_players() {
        let state = AppState::new(fast_config());
        let alice = state.join("c1", "Alice").await.unwrap();
        let bob = state.join("c2", "Bob").await.unwrap();
        {
            let mut session = state.session.write().await;
            session.is_game_active = true;
            session.round_no = 1;
            session.phase = RoundPhase::AwaitingRoundCompletion;
            session.round = Some(Round {
                number: 1,
                letter: 'B',
                categories: categories(),
            });
            session
                .revealed
                .insert(alice.id.clone(), answers(&[("Color", "Blue")]));
            session.ledger.record(&bob.id, &alice.id, "Color", true);
        }

        assert!(!state.round_complete("c1").await.unwrap());
        // Re-signalling does not count twice
        assert!(!state.round_complete("c1").await.unwrap());
        assert_eq!(state.phase().await, RoundPhase::AwaitingRoundCompletion);

        assert!(state.round_complete("c2").await.unwrap());
        assert_eq!(state.scores().await[&alice.id], 100);
        assert!(state.session.read().await.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_releases_quorum() {
        let state = AppState::new(fast_config());
        let alice = state.join("c1", "Alice").await.unwrap();
        state.join("c2", "Bob").await.unwrap();
        state.join("c3", "Carol").await.unwrap();
        {
            let mut session = state.session.write().await;
            session.is_game_active = true;
            session.round_no = 1;
            session.phase = RoundPhase::AwaitingRoundCompletion;
        }

        state.round_complete("c1").await.unwrap();
        state.round_complete("c2").await.unwrap();
        assert_eq!(state.phase().await, RoundPhase::AwaitingRoundCompletion);

        state.disconnect("c3").await;

        assert_ne!(state.phase().await, RoundPhase::AwaitingRoundCompletion);
        assert_eq!(state.scores().await[&alice.id], 0);
    }

    #[tokio::test]
    async fn test_final_round_ends_game() {
        let state = AppState::new(fast_config());
        let alice = state.join("c1", "Alice").await.unwrap();
        let bob = state.join("c2", "Bob").await.unwrap();
        {
            let mut session = state.session.write().await;
            session.is_game_active = true;
            session.round_no = state.config.max_rounds;
            session.phase = RoundPhase::AwaitingRoundCompletion;
            session.scores.insert(alice.id.clone(), 300);
            session.scores.insert(bob.id.clone(), 200);
        }
        let mut rx = state.broadcast.subscribe();

        state.round_complete("c1").await.unwrap();
        state.round_complete("c2").await.unwrap();

        assert!(!state.is_game_active().await);
        assert_eq!(state.phase().await, RoundPhase::GameOver);

        let game_over = drain(&mut rx)
            .into_iter()
            .find_map(|o| match o.msg {
                ServerMessage::GameOver {
                    winner, players, ..
                } => Some((winner, players)),
                _ => None,
            })
            .expect("game over should be broadcast");
        let (winner, players) = game_over;
        let winner = winner.unwrap();
        assert_eq!(winner.id, alice.id);
        assert_eq!(winner.score, 300);
        assert_eq!(players.len(), 2);

        // Scores stay until the next game starts
        assert_eq!(state.scores().await[&alice.id], 300);
    }
}
