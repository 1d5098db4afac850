use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;

/// Per-round verdicts: validator -> target -> category -> valid.
/// The last verdict for a triple wins.
#[derive(Debug, Clone, Default)]
pub struct ValidationLedger {
    verdicts: HashMap<PlayerId, HashMap<PlayerId, HashMap<Category, bool>>>,
}

impl ValidationLedger {
    pub fn record(&mut self, validator: &str, target: &str, category: &str, is_valid: bool) {
        self.verdicts
            .entry(validator.to_string())
            .or_default()
            .entry(target.to_string())
            .or_default()
            .insert(category.to_string(), is_valid);
    }

    pub fn verdict(&self, validator: &str, target: &str, category: &str) -> Option<bool> {
        self.verdicts
            .get(validator)?
            .get(target)?
            .get(category)
            .copied()
    }

    pub fn clear(&mut self) {
        self.verdicts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

impl AppState {
    /// Record a verdict on another player's answer and relay it to everyone.
    ///
    /// Returns `Ok(false)` when the verdict was ignored: wrong phase or
    /// unknown target.
    pub async fn validate_answer(
        &self,
        connection_id: &str,
        target_id: &str,
        category: &str,
        is_valid: bool,
    ) -> GameResult<bool> {
        let mut session = self.session.write().await;
        let validator = session
            .players
            .by_connection(connection_id)
            .cloned()
            .ok_or(GameError::NotRegistered)?;

        if session.phase != RoundPhase::AwaitingRoundCompletion {
            tracing::debug!(
                "Ignoring validation from {} outside of validation phase",
                validator.display_name
            );
            return Ok(false);
        }

        let Some(target_name) = session
            .players
            .get(target_id)
            .map(|t| t.display_name.clone())
        else {
            tracing::debug!("Ignoring validation for unknown player {}", target_id);
            return Ok(false);
        };

        session
            .ledger
            .record(&validator.id, target_id, category, is_valid);

        tracing::info!(
            "Validation: {} marked {} as {} for {}",
            validator.display_name,
            category,
            if is_valid { "valid" } else { "invalid" },
            target_name
        );

        self.broadcast_to_all(ServerMessage::ValidationUpdate {
            validator_id: validator.id,
            validator_name: validator.display_name,
            target_player_id: target_id.to_string(),
            target_name,
            category: category.to_string(),
            is_valid,
        });
        Ok(true)
    }
}
