/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors surfaced to the client that caused them.
///
/// The display text is what ends up in the `error` message, so it is
/// written for players, not for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid name")]
    InvalidName,

    #[error("Name already taken")]
    DuplicateName,

    #[error("Need at least 2 online players to start")]
    InsufficientPlayers,

    /// The connection sent a player action before joining. Never reported.
    #[error("Connection has not joined the game")]
    NotRegistered,
}
