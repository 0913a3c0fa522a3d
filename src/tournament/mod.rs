//! Tournament module for Swiss-system chess events.
//!
//! This module provides the tournament lifecycle including:
//! - Tournament creation and configuration
//! - Player registration into a not-yet-started event
//! - Round planning, pairing generation and round progression
//! - Outcome recording with exactly-once score updates
//! - Final standings (Buchholz tie-break) and Elo rating application
//!
//! ## Example
//!
//! ```
//! use swiss_arbiter::{Outcome, PairingMethod, TournamentConfig, TournamentManager};
//!
//! let mut manager = TournamentManager::new();
//! let tournament = manager
//!     .create_tournament(TournamentConfig::new("Club Open", 1, PairingMethod::Massacre))
//!     .expect("valid configuration");
//!
//! for (name, rating) in [("Anna", 1600), ("Boris", 1500)] {
//!     let player = manager.add_player(name, rating);
//!     manager.register_player(tournament, player).expect("registration open");
//! }
//!
//! manager.start_tournament(tournament).expect("enough players");
//! let games = manager.current_round_games(tournament).expect("round one");
//! manager.record_outcome(games[0].id, Outcome::WhiteWin).expect("undecided game");
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod store;

pub use errors::{TournamentError, TournamentResult};
pub use manager::{RoundAdvance, TimingObserver, TournamentManager};
pub use models::{
    Game, GameId, GameView, Outcome, PairingMethod, Participant, ParticipantId, Player, PlayerId,
    Rating, Round, RoundId, RoundSummary, Score, StandingsEntry, Tournament, TournamentConfig,
    TournamentDetails, TournamentId, TournamentInfo, TournamentState,
};
pub use store::TournamentStore;
