use super::{AppState, Session};
use crate::broadcast;
use crate::error::{GameError, GameResult};
use crate::protocol::{RevealedAnswers, ServerMessage};
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;

/// Pick the letter for a round
fn random_letter() -> char {
    let mut rng = rand::rng();
    ROUND_LETTERS[rng.random_range(0..ROUND_LETTERS.len())] as char
}

/// Whether a timer scheduled for `(epoch, round_no)` still applies
fn still_current(session: &Session, epoch: u64, round_no: u32) -> bool {
    session.is_game_active && session.epoch == epoch && session.round_no == round_no
}

impl AppState {
    /// Start a game with everyone currently online.
    ///
    /// A start while a game is running restarts it; timers belonging to the
    /// old game are neutralised by the epoch bump.
    pub async fn start_game(&self) -> GameResult<u64> {
        let mut session = self.session.write().await;
        if session.players.online().count() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers);
        }

        if session.is_game_active {
            tracing::warn!("Restarting game in round {}", session.round_no);
        }

        session.epoch += 1;
        session.is_game_active = true;
        session.round_no = 0;
        session.phase = RoundPhase::Idle;
        session.round = None;
        session.answers.clear();
        session.revealed.clear();
        session.ledger.clear();
        session.ready.clear();
        for score in session.scores.values_mut() {
            *score = 0;
        }

        let epoch = session.epoch;
        tracing::info!("Game started (epoch {})", epoch);
        self.broadcast_to_all(ServerMessage::GameStarted);
        drop(session);

        broadcast::spawn_round_start(self.clone(), epoch);
        Ok(epoch)
    }

    /// Begin the next round of the game started as `epoch`.
    ///
    /// Returns `None` when the game ended or restarted in the meantime, or a
    /// round is already running.
    pub async fn start_round(&self, epoch: u64) -> Option<Round> {
        let mut session = self.session.write().await;
        if !session.is_game_active || session.epoch != epoch || session.phase != RoundPhase::Idle
        {
            tracing::debug!("Skipping stale round start for epoch {}", epoch);
            return None;
        }

        session.round_no += 1;
        session.answers.clear();
        session.revealed.clear();
        session.ledger.clear();
        session.ready.clear();

        let round = Round {
            number: session.round_no,
            letter: random_letter(),
            categories: session.categories.snapshot(),
        };
        session.round = Some(round.clone());
        session.phase = RoundPhase::AwaitingAnswers;

        tracing::info!(
            "Round {} started with letter: {}",
            round.number,
            round.letter
        );
        self.broadcast_to_all(ServerMessage::NewRound {
            round: round.number,
            letter: round.letter,
            categories: round.categories.clone(),
        });
        Some(round)
    }

    /// Store a player's answers, replacing anything they sent before
    pub async fn submit_answers(
        &self,
        connection_id: &str,
        answers: HashMap<Category, String>,
    ) -> GameResult<()> {
        let mut session = self.session.write().await;
        let player = session
            .players
            .by_connection(connection_id)
            .cloned()
            .ok_or(GameError::NotRegistered)?;

        let set = AnswerSet::new(answers);
        tracing::info!(
            "Received answers from {} at {}",
            player.display_name,
            set.submitted_at
        );
        session.answers.insert(player.id, set);
        Ok(())
    }

    /// A player calls basta: start the countdown that ends in the reveal.
    ///
    /// Only the first call in a round counts; later ones return `Ok(false)`.
    pub async fn basta(&self, connection_id: &str) -> GameResult<bool> {
        let mut session = self.session.write().await;
        let player = session
            .players
            .by_connection(connection_id)
            .cloned()
            .ok_or(GameError::NotRegistered)?;

        if !session.is_game_active || session.phase != RoundPhase::AwaitingAnswers {
            tracing::debug!(
                "Ignoring basta from {} in phase {:?}",
                player.display_name,
                session.phase
            );
            return Ok(false);
        }

        session.phase = RoundPhase::Revealing;
        let (epoch, round_no) = (session.epoch, session.round_no);
        tracing::info!("{} called Basta!", player.display_name);
        drop(session);

        broadcast::spawn_basta_countdown(
            self.clone(),
            epoch,
            round_no,
            connection_id.to_string(),
            player.display_name,
        );
        Ok(true)
    }

    /// Send one countdown tick to everyone but the caller.
    /// Returns `false` once the countdown no longer applies.
    pub async fn countdown_tick(
        &self,
        epoch: u64,
        round_no: u32,
        caller_connection: &str,
        player_name: &str,
        countdown: u32,
    ) -> bool {
        let session = self.session.read().await;
        if !still_current(&session, epoch, round_no) || session.phase != RoundPhase::Revealing {
            return false;
        }

        self.broadcast_except(
            caller_connection,
            ServerMessage::BastaCountdown {
                player_name: player_name.to_string(),
                countdown,
            },
        );
        true
    }

    /// Reveal the round's answers. Only online players with a submission are shown.
    pub async fn reveal_answers(&self, epoch: u64, round_no: u32) -> bool {
        let mut session = self.session.write().await;
        if !still_current(&session, epoch, round_no) || session.phase != RoundPhase::Revealing {
            tracing::debug!("Skipping stale reveal for round {}", round_no);
            return false;
        }

        let revealed: HashMap<PlayerId, AnswerSet> = session
            .players
            .online()
            .filter_map(|p| {
                session
                    .answers
                    .get(&p.id)
                    .map(|set| (p.id.clone(), set.clone()))
            })
            .collect();

        let answers: HashMap<PlayerId, RevealedAnswers> = revealed
            .iter()
            .filter_map(|(id, set)| {
                let player = session.players.get(id)?;
                Some((
                    id.clone(),
                    RevealedAnswers {
                        player_name: player.display_name.clone(),
                        answers: set.answers.clone(),
                    },
                ))
            })
            .collect();

        let categories = session
            .round
            .as_ref()
            .map(|r| r.categories.clone())
            .unwrap_or_default();

        tracing::info!(
            "Revealing answers of {} players for round {}",
            revealed.len(),
            round_no
        );
        session.revealed = revealed;
        session.phase = RoundPhase::AwaitingRoundCompletion;
        self.broadcast_to_all(ServerMessage::RevealAnswers {
            answers,
            categories,
        });
        true
    }
}
