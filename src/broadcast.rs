//! Background timers.
//!
//! Timers never cancel. Each one re-checks the session when it fires and
//! does nothing if the game has moved on in the meantime.

use crate::state::AppState;
use crate::types::{ConnectionId, PlayerId};

/// Start the next round of game `epoch` after the inter-round delay
pub fn spawn_round_start(state: AppState, epoch: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(state.config.round_delay).await;
        state.start_round(epoch).await;
    });
}

/// Run the basta countdown for everyone but the caller, then reveal the answers
pub fn spawn_basta_countdown(
    state: AppState,
    epoch: u64,
    round_no: u32,
    caller: ConnectionId,
    player_name: String,
) {
    tokio::spawn(async move {
        let mut countdown = state.config.countdown_seconds;
        loop {
            if !state
                .countdown_tick(epoch, round_no, &caller, &player_name, countdown)
                .await
            {
                tracing::debug!("Countdown for round {} overtaken, stopping", round_no);
                return;
            }
            if countdown == 0 {
                break;
            }
            tokio::time::sleep(state.config.countdown_tick).await;
            countdown -= 1;
        }

        // Give the forced submissions a moment to arrive
        tokio::time::sleep(state.config.reveal_grace).await;
        state.reveal_answers(epoch, round_no).await;
    });
}

/// Purge a disconnected player once the grace window has passed
pub fn spawn_offline_purge(state: AppState, player_id: PlayerId, connection_id: ConnectionId) {
    tokio::spawn(async move {
        tokio::time::sleep(state.config.offline_purge).await;
        state.purge_if_offline(&player_id, &connection_id).await;
    });
}
