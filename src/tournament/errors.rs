//! Tournament error types.

use thiserror::Error;

use super::models::{GameId, PlayerId, TournamentId, TournamentState};

/// Tournament errors
///
/// Every failure is reported synchronously and leaves the store unchanged;
/// nothing is retried internally. Retrying a pairing while allowing a
/// repeat, for example, is caller policy.
#[derive(Debug, Error, PartialEq)]
pub enum TournamentError {
    /// Bad planner or tournament configuration input
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Fewer than two signed players at start
    #[error("insufficient players: need {needed}, have {current}")]
    InsufficientPlayers { needed: usize, current: usize },

    /// Illegal lifecycle call for the tournament's current state
    #[error("invalid transition: expected {expected}, got {actual}")]
    InvalidTransition {
        expected: TournamentState,
        actual: TournamentState,
    },

    /// The game's outcome has already been recorded
    #[error("game {0} already decided")]
    GameAlreadyDecided(GameId),

    /// The game's round is no longer the tournament's current round
    #[error("round {round} is not the current round {current}")]
    StaleRound { round: u32, current: u32 },

    /// No repeat-free pairing exists for the round
    #[error("no repeat-free pairing exists for round {round}")]
    UnpairablePlayers { round: u32 },

    /// Tournament not found
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    /// Player not found
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// Game not found
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// Player already registered for the tournament
    #[error("player {player} already registered for tournament {tournament}")]
    AlreadyRegistered {
        player: PlayerId,
        tournament: TournamentId,
    },

    /// The store violated an internal invariant, e.g. a round record is
    /// missing for a started tournament
    #[error("inconsistent store: {0}")]
    InconsistentStore(String),
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
