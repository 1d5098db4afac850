mod category;
mod player;
mod round;
pub mod score;
mod validation;

pub use category::CategorySet;
pub use player::{PlayerRegistry, Rejoined};
pub use validation::ValidationLedger;

use crate::config::GameConfig;
use crate::protocol::{PlayerInfo, ServerMessage};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// A message fanned out to every connected socket, optionally skipping one
#[derive(Debug, Clone)]
pub struct Outbound {
    pub skip: Option<ConnectionId>,
    pub msg: ServerMessage,
}

/// The single game session.
///
/// Every handler and timer takes the write lock once and runs to completion,
/// so code operating on `&mut Session` sees a consistent snapshot.
#[derive(Debug)]
pub struct Session {
    pub players: PlayerRegistry,
    pub categories: CategorySet,
    /// Cumulative score per registered player
    pub scores: HashMap<PlayerId, u32>,
    pub is_game_active: bool,
    /// Bumped on every game start; timers scheduled for an older game become no-ops
    pub epoch: u64,
    pub round_no: u32,
    pub phase: RoundPhase,
    pub round: Option<Round>,
    /// Live answers for the current round, last submission wins
    pub answers: HashMap<PlayerId, AnswerSet>,
    /// Answers as they were shown at reveal time; scoring reads these
    pub revealed: HashMap<PlayerId, AnswerSet>,
    pub ledger: ValidationLedger,
    /// Players who signalled they are done validating this round
    pub ready: HashSet<PlayerId>,
}

impl Session {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            players: PlayerRegistry::default(),
            categories: CategorySet::new(categories),
            scores: HashMap::new(),
            is_game_active: false,
            epoch: 0,
            round_no: 0,
            phase: RoundPhase::Idle,
            round: None,
            answers: HashMap::new(),
            revealed: HashMap::new(),
            ledger: ValidationLedger::default(),
            ready: HashSet::new(),
        }
    }

    /// Drop the per-player bookkeeping of someone no longer registered
    pub fn forget_player(&mut self, player_id: &str) {
        self.scores.remove(player_id);
        self.answers.remove(player_id);
        self.ready.remove(player_id);
    }

    pub fn players_message(&self) -> ServerMessage {
        ServerMessage::PlayersUpdate {
            players: self.players.online().map(PlayerInfo::from).collect(),
        }
    }

    pub fn categories_message(&self) -> ServerMessage {
        ServerMessage::CategoriesUpdate {
            categories: self.categories.snapshot(),
        }
    }

    pub fn scores_message(&self) -> ServerMessage {
        ServerMessage::ScoresUpdate {
            scores: self.scores.clone(),
        }
    }

    pub fn game_state_message(&self) -> ServerMessage {
        ServerMessage::GameState {
            is_game_active: self.is_game_active,
            round: self.round_no,
            current_letter: self.round.as_ref().map(|r| r.letter),
            categories: self.categories.snapshot(),
            scores: self.scores.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub config: Arc<GameConfig>,
    /// Broadcast channel feeding every connected socket
    pub broadcast: broadcast::Sender<Outbound>,
}

impl AppState {
    pub fn new(config: GameConfig) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            session: Arc::new(RwLock::new(Session::new(config.categories.clone()))),
            config: Arc::new(config),
            broadcast: tx,
        }
    }

    /// Send a message to every connected client
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // Ignore send errors (no receivers connected is fine)
        let _ = self.broadcast.send(Outbound { skip: None, msg });
    }

    /// Send a message to every connected client except one
    pub fn broadcast_except(&self, connection_id: &str, msg: ServerMessage) {
        let _ = self.broadcast.send(Outbound {
            skip: Some(connection_id.to_string()),
            msg,
        });
    }

    /// Current cumulative scores
    pub async fn scores(&self) -> HashMap<PlayerId, u32> {
        self.session.read().await.scores.clone()
    }

    pub async fn is_game_active(&self) -> bool {
        self.session.read().await.is_game_active
    }

    pub async fn phase(&self) -> RoundPhase {
        self.session.read().await.phase
    }

    pub async fn current_round(&self) -> Option<Round> {
        self.session.read().await.round.clone()
    }

    pub async fn online_count(&self) -> usize {
        self.session.read().await.players.online().count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_state_is_idle() {
        let state = AppState::default();

        assert!(!state.is_game_active().await);
        assert_eq!(state.phase().await, RoundPhase::Idle);
        assert!(state.current_round().await.is_none());
        assert_eq!(state.online_count().await, 0);
    }

    #[tokio::test]
    async fn test_game_state_message_before_first_round() {
        let state = AppState::default();
        let msg = state.session.read().await.game_state_message();

        match msg {
            ServerMessage::GameState {
                is_game_active,
                round,
                current_letter,
                categories,
                ..
            } => {
                assert!(!is_game_active);
                assert_eq!(round, 0);
                assert_eq!(current_letter, None);
                assert_eq!(categories.len(), 7);
            }
            other => panic!("Expected GameState, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_except_marks_skipped_connection() {
        let state = AppState::default();
        let mut rx = state.broadcast.subscribe();

        state.broadcast_except("conn-1", ServerMessage::NextRound);

        let out = rx.try_recv().unwrap();
        assert_eq!(out.skip.as_deref(), Some("conn-1"));
        assert_eq!(out.msg, ServerMessage::NextRound);
    }
}
