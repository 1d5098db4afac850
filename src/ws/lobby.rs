//! Lobby handlers: category editing and game start.
//!
//! Results are broadcast by the state layer, so successful calls reply with nothing.

use super::handlers::error_reply;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

pub async fn handle_get_categories(state: &Arc<AppState>) -> Vec<ServerMessage> {
    vec![ServerMessage::CategoriesUpdate {
        categories: state.categories().await,
    }]
}

pub async fn handle_add_category(state: &Arc<AppState>, text: String) -> Vec<ServerMessage> {
    state.add_category(&text).await;
    Vec::new()
}

pub async fn handle_remove_category(state: &Arc<AppState>, index: i64) -> Vec<ServerMessage> {
    state.remove_category(index).await;
    Vec::new()
}

pub async fn handle_start_game(state: &Arc<AppState>) -> Vec<ServerMessage> {
    match state.start_game().await {
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::info!("Refused to start game: {}", e);
            error_reply(e)
        }
    }
}
