//! HTTP endpoints next to the WebSocket.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Response for the liveness probe
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub players_online: usize,
    pub game_active: bool,
    pub round: u32,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let session = state.session.read().await;
    Json(HealthResponse {
        status: "ok",
        players_online: session.players.online().count(),
        game_active: session.is_game_active,
        round: session.round_no,
    })
}
