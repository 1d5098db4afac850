use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Join {
        name: String,
    },
    /// Sent by a client that still holds a player id from an earlier connection
    Rejoin {
        player_id: PlayerId,
        name: String,
    },
    GetCategories,
    AddCategory {
        text: String,
    },
    RemoveCategory {
        index: i64,
    },
    StartGame,
    Basta,
    SubmitAnswers {
        answers: HashMap<Category, String>,
    },
    ValidateAnswer {
        target_player_id: PlayerId,
        category: Category,
        is_valid: bool,
    },
    RoundComplete,
    GetScores,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Joined {
        player_id: PlayerId,
        name: String,
    },
    /// Online players only
    PlayersUpdate {
        players: Vec<PlayerInfo>,
    },
    CategoriesUpdate {
        categories: Vec<Category>,
    },
    GameStarted,
    NewRound {
        round: u32,
        letter: char,
        categories: Vec<Category>,
    },
    /// Sent to everyone except the player who called basta
    BastaCountdown {
        player_name: String,
        countdown: u32,
    },
    RevealAnswers {
        answers: HashMap<PlayerId, RevealedAnswers>,
        categories: Vec<Category>,
    },
    ValidationUpdate {
        validator_id: PlayerId,
        validator_name: String,
        target_player_id: PlayerId,
        target_name: String,
        category: Category,
        is_valid: bool,
    },
    ScoresUpdate {
        scores: HashMap<PlayerId, u32>,
    },
    /// Round scored, the next one starts after the inter-round delay
    NextRound,
    GameOver {
        winner: Option<Winner>,
        final_scores: HashMap<PlayerId, u32>,
        players: Vec<PlayerSummary>,
    },
    /// Full resync sent to a player rejoining a running game
    GameState {
        is_game_active: bool,
        round: u32,
        current_letter: Option<char>,
        categories: Vec<Category>,
        scores: HashMap<PlayerId, u32>,
    },
    Error {
        message: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(e: GameError) -> Self {
        ServerMessage::Error {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub is_online: bool,
}

impl From<&Player> for PlayerInfo {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.display_name.clone(),
            is_online: p.is_online,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
}

impl From<&Player> for PlayerSummary {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.display_name.clone(),
        }
    }
}

/// A player's answers as shown to everyone during validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevealedAnswers {
    pub player_name: String,
    pub answers: HashMap<Category, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}
