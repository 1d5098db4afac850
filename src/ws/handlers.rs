//! WebSocket message dispatch
//!
//! Entry point for every client message. Replies go back to the sender only;
//! anything meant for everyone is broadcast by the state layer.

use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

use super::{lobby, player};

/// Turn a failed operation into the reply for the originating client.
/// Actions from connections that never joined are dropped silently.
pub(crate) fn error_reply(e: GameError) -> Vec<ServerMessage> {
    match e {
        GameError::NotRegistered => {
            tracing::debug!("Ignoring player action from unregistered connection");
            Vec::new()
        }
        e => vec![e.into()],
    }
}

/// Handle a client message and return the replies for its sender
pub async fn handle_message(
    msg: ClientMessage,
    connection_id: &str,
    state: &Arc<AppState>,
) -> Vec<ServerMessage> {
    match msg {
        // Identity
        ClientMessage::Join { name } => player::handle_join(state, connection_id, name).await,

        ClientMessage::Rejoin { player_id, name } => {
            player::handle_rejoin(state, connection_id, player_id, name).await
        }

        // Lobby
        ClientMessage::GetCategories => lobby::handle_get_categories(state).await,

        ClientMessage::AddCategory { text } => lobby::handle_add_category(state, text).await,

        ClientMessage::RemoveCategory { index } => {
            lobby::handle_remove_category(state, index).await
        }

        ClientMessage::StartGame => lobby::handle_start_game(state).await,

        // Round play
        ClientMessage::Basta => player::handle_basta(state, connection_id).await,

        ClientMessage::SubmitAnswers { answers } => {
            player::handle_submit_answers(state, connection_id, answers).await
        }

        ClientMessage::ValidateAnswer {
            target_player_id,
            category,
            is_valid,
        } => {
            player::handle_validate_answer(
                state,
                connection_id,
                target_player_id,
                category,
                is_valid,
            )
            .await
        }

        ClientMessage::RoundComplete => player::handle_round_complete(state, connection_id).await,

        ClientMessage::GetScores => player::handle_get_scores(state).await,
    }
}
