use super::AppState;
use crate::broadcast;
use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::types::*;

/// Names must have at least this many characters after trimming
const MIN_NAME_LEN: usize = 2;

fn validate_name(name: &str) -> GameResult<String> {
    let name = name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(GameError::InvalidName);
    }
    Ok(name.to_string())
}

fn is_bound(player: &Player, connection_id: &str) -> bool {
    player.is_online && player.connection_id == connection_id
}

/// Registered players in join order, online or waiting out their purge window.
///
/// A connection holds at most one online player.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    /// Register a fresh player. Names are unique case-insensitively among
    /// everyone still registered, offline players included.
    ///
    /// A player already bound to the connection is replaced by the new one.
    pub fn register(&mut self, name: &str, connection_id: &str) -> GameResult<Player> {
        let name = validate_name(name)?;
        let lowered = name.to_lowercase();
        if self.players.iter().any(|p| {
            !is_bound(p, connection_id) && p.display_name.to_lowercase() == lowered
        }) {
            return Err(GameError::DuplicateName);
        }

        self.unbind(connection_id, None);
        let player = Player::new(name, connection_id);
        self.players.push(player.clone());
        Ok(player)
    }

    /// Bind a returning player to a new connection.
    ///
    /// Unknown ids fall back to a fresh registration that skips the
    /// duplicate-name check, since the client already owns that name.
    pub fn reconnect(
        &mut self,
        prior_id: &str,
        name: &str,
        connection_id: &str,
    ) -> GameResult<(Player, bool)> {
        if self.get(prior_id).is_some() {
            self.unbind(connection_id, Some(prior_id));
        }
        if let Some(player) = self.players.iter_mut().find(|p| p.id == prior_id) {
            player.connection_id = connection_id.to_string();
            player.is_online = true;
            return Ok((player.clone(), true));
        }

        let player = Player::new(validate_name(name)?, connection_id);
        self.unbind(connection_id, None);
        self.players.push(player.clone());
        Ok((player, false))
    }

    /// Remove whoever is bound to the connection, except `keep`
    fn unbind(&mut self, connection_id: &str, keep: Option<&str>) {
        self.players
            .retain(|p| !is_bound(p, connection_id) || Some(p.id.as_str()) == keep);
    }

    /// Flag the player on this connection as offline
    pub fn mark_offline(&mut self, connection_id: &str) -> Option<Player> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.connection_id == connection_id && p.is_online)?;
        player.is_online = false;
        Some(player.clone())
    }

    /// Remove a player that is still offline on the connection it dropped from.
    /// A player who came back, even if gone again since, is left alone.
    pub fn purge(&mut self, player_id: &str, connection_id: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| {
            p.id == player_id && !p.is_online && p.connection_id == connection_id
        })?;
        Some(self.players.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The online player bound to a connection
    pub fn by_connection(&self, connection_id: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.connection_id == connection_id && p.is_online)
    }

    pub fn online(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_online)
    }

    /// Every registered player in join order
    pub fn all(&self) -> &[Player] {
        &self.players
    }
}

/// What a rejoining client needs to resync
#[derive(Debug, Clone)]
pub struct Rejoined {
    pub player: Player,
    /// `true` when the prior id was still known
    pub restored: bool,
    pub categories: ServerMessage,
    /// Only present while a game is running
    pub game_state: Option<ServerMessage>,
}

impl AppState {
    /// Register a new player on a connection
    pub async fn join(&self, connection_id: &str, name: &str) -> GameResult<Player> {
        let mut session = self.session.write().await;
        let previous = session.players.by_connection(connection_id).cloned();
        let player = session.players.register(name, connection_id)?;
        if let Some(previous) = previous {
            tracing::info!(
                "{} replaced {} on connection {}",
                player.display_name,
                previous.display_name,
                connection_id
            );
            session.forget_player(&previous.id);
        }
        session.scores.insert(player.id.clone(), 0);

        tracing::info!("Player joined: {} ({})", player.display_name, player.id);
        self.broadcast_to_all(session.players_message());
        Ok(player)
    }

    /// Reattach a returning player, or register them anew if the id is unknown
    pub async fn rejoin(
        &self,
        connection_id: &str,
        player_id: &str,
        name: &str,
    ) -> GameResult<Rejoined> {
        let mut session = self.session.write().await;
        let previous = session.players.by_connection(connection_id).cloned();
        let (player, restored) = session
            .players
            .reconnect(player_id, name, connection_id)?;
        if let Some(previous) = previous.filter(|p| p.id != player.id) {
            tracing::info!(
                "{} replaced {} on connection {}",
                player.display_name,
                previous.display_name,
                connection_id
            );
            session.forget_player(&previous.id);
        }

        if restored {
            tracing::info!("Player rejoined: {} ({})", player.display_name, player.id);
            session.scores.entry(player.id.clone()).or_insert(0);
        } else {
            tracing::info!(
                "Unknown player id {} on rejoin, registered {} as new player",
                player_id,
                player.display_name
            );
            session.scores.insert(player.id.clone(), 0);
        }

        self.broadcast_to_all(session.players_message());

        Ok(Rejoined {
            player,
            restored,
            categories: session.categories_message(),
            game_state: session
                .is_game_active
                .then(|| session.game_state_message()),
        })
    }

    /// Handle a dropped connection: mark its player offline and schedule the purge
    pub async fn disconnect(&self, connection_id: &str) {
        let mut session = self.session.write().await;
        let Some(player) = session.players.mark_offline(connection_id) else {
            return;
        };

        tracing::info!("Player disconnected: {}", player.display_name);
        self.broadcast_to_all(session.players_message());

        // The departed player no longer blocks the readiness quorum
        self.try_finish_round(&mut session);
        drop(session);

        broadcast::spawn_offline_purge(self.clone(), player.id, player.connection_id);
    }

    /// Purge a player whose grace window ran out. No-op if they came back.
    pub async fn purge_if_offline(&self, player_id: &str, connection_id: &str) -> bool {
        let mut session = self.session.write().await;
        let Some(player) = session.players.purge(player_id, connection_id) else {
            return false;
        };

        session.forget_player(&player.id);
        tracing::info!("Player removed after timeout: {}", player.display_name);
        self.broadcast_to_all(session.players_message());
        true
    }

    /// The online player bound to a connection
    pub async fn player_by_connection(&self, connection_id: &str) -> Option<Player> {
        self.session
            .read()
            .await
            .players
            .by_connection(connection_id)
            .cloned()
    }
}
