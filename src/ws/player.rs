//! Player message handlers
//!
//! Joining, answering, calling basta, and validating each other's answers.

use super::handlers::error_reply;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{Category, PlayerId};
use std::collections::HashMap;
use std::sync::Arc;

pub async fn handle_join(
    state: &Arc<AppState>,
    connection_id: &str,
    name: String,
) -> Vec<ServerMessage> {
    match state.join(connection_id, &name).await {
        Ok(player) => vec![ServerMessage::Joined {
            player_id: player.id,
            name: player.display_name,
        }],
        Err(e) => {
            tracing::info!("Join rejected for {:?}: {}", name, e);
            error_reply(e)
        }
    }
}

pub async fn handle_rejoin(
    state: &Arc<AppState>,
    connection_id: &str,
    player_id: PlayerId,
    name: String,
) -> Vec<ServerMessage> {
    match state.rejoin(connection_id, &player_id, &name).await {
        Ok(rejoined) => {
            let mut replies = vec![
                ServerMessage::Joined {
                    player_id: rejoined.player.id,
                    name: rejoined.player.display_name,
                },
                rejoined.categories,
            ];
            replies.extend(rejoined.game_state);
            replies
        }
        Err(e) => error_reply(e),
    }
}

pub async fn handle_submit_answers(
    state: &Arc<AppState>,
    connection_id: &str,
    answers: HashMap<Category, String>,
) -> Vec<ServerMessage> {
    match state.submit_answers(connection_id, answers).await {
        Ok(()) => Vec::new(),
        Err(e) => error_reply(e),
    }
}

pub async fn handle_basta(state: &Arc<AppState>, connection_id: &str) -> Vec<ServerMessage> {
    match state.basta(connection_id).await {
        Ok(_) => Vec::new(),
        Err(e) => error_reply(e),
    }
}

pub async fn handle_validate_answer(
    state: &Arc<AppState>,
    connection_id: &str,
    target_player_id: PlayerId,
    category: Category,
    is_valid: bool,
) -> Vec<ServerMessage> {
    match state
        .validate_answer(connection_id, &target_player_id, &category, is_valid)
        .await
    {
        Ok(_) => Vec::new(),
        Err(e) => error_reply(e),
    }
}

pub async fn handle_round_complete(
    state: &Arc<AppState>,
    connection_id: &str,
) -> Vec<ServerMessage> {
    match state.round_complete(connection_id).await {
        Ok(_) => Vec::new(),
        Err(e) => error_reply(e),
    }
}

pub async fn handle_get_scores(state: &Arc<AppState>) -> Vec<ServerMessage> {
    vec![ServerMessage::ScoresUpdate {
        scores: state.scores().await,
    }]
}
