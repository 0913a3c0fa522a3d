//! Tournament data models for Swiss-system chess tournaments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use uuid::Uuid;

/// Globally unique player identity, minted outside any single tournament.
pub type PlayerId = Uuid;

/// Tournament ID type
pub type TournamentId = u64;

/// Participant ID type (one per player per tournament)
pub type ParticipantId = u64;

/// Round ID type
pub type RoundId = u64;

/// Game ID type
pub type GameId = u64;

/// Elo rating value.
pub type Rating = i32;

/// Tournament lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentState {
    /// Accepting registrations, no rounds exist yet
    NotStarted,
    /// Rounds in progress
    Active,
    /// All rounds played, placements and ratings final
    Finished,
}

impl fmt::Display for TournamentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NotStarted => "not started",
            Self::Active => "active",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// First-round seeding policy.
///
/// `Massacre` and `CrossGroup` share the same top-half-versus-bottom-half
/// construction but remain distinct variants so callers can keep telling
/// them apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingMethod {
    /// Seed `i` of the top half plays seed `i` of the bottom half
    #[default]
    Massacre,
    /// Cross pairing over the rating-sorted halves
    CrossGroup,
    /// Consecutive seeds play each other: (1,2), (3,4), ...
    AdjacentGroup,
    /// Uniformly shuffled pairs, not reproducible across calls
    Random,
}

impl fmt::Display for PairingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Massacre => "massacre",
            Self::CrossGroup => "cross-group",
            Self::AdjacentGroup => "adjacent-group",
            Self::Random => "random",
        };
        write!(f, "{repr}")
    }
}

/// Outcome of a concluded game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    WhiteWin,
    BlackWin,
    Draw,
}

impl Outcome {
    /// Points credited to the first-mover.
    pub fn white_score(self) -> Score {
        match self {
            Self::WhiteWin => Score::WIN,
            Self::BlackWin => Score::ZERO,
            Self::Draw => Score::DRAW,
        }
    }

    /// Points credited to the second-mover.
    pub fn black_score(self) -> Score {
        match self {
            Self::WhiteWin => Score::ZERO,
            Self::BlackWin => Score::WIN,
            Self::Draw => Score::DRAW,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WhiteWin => "1-0",
            Self::BlackWin => "0-1",
            Self::Draw => "1/2-1/2",
        };
        write!(f, "{repr}")
    }
}

/// Tournament points stored as whole half-points, so score groups and
/// Buchholz sums key on exact integers rather than floats.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Score(u32);

impl Score {
    /// A loss, or no games played.
    pub const ZERO: Self = Self(0);
    /// Half a point.
    pub const DRAW: Self = Self(1);
    /// A full point, also credited for a bye.
    pub const WIN: Self = Self(2);

    /// The raw half-point count.
    pub fn half_points(self) -> u32 {
        self.0
    }

    /// The score in points, for display and Elo actual-score terms.
    pub fn points(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Add for Score {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

/// Tournament configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Number of ranked payout slots (>= 1)
    pub prize_positions: u32,
    /// First-round seeding policy
    pub pairing_method: PairingMethod,
    /// Elo K-factor applied at tournament completion
    pub rating_k: f64,
}

/// The conventional club K-factor.
pub const DEFAULT_RATING_K: f64 = 32.0;

impl TournamentConfig {
    pub fn new(
        name: impl Into<String>,
        prize_positions: u32,
        pairing_method: PairingMethod,
    ) -> Self {
        Self {
            name: name.into(),
            prize_positions,
            pairing_method,
            rating_k: DEFAULT_RATING_K,
        }
    }

    /// Override the Elo K-factor.
    pub fn with_rating_k(mut self, rating_k: f64) -> Self {
        self.rating_k = rating_k;
        self
    }
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self::new("Tournament", 1, PairingMethod::default())
    }
}

/// A player known to the engine, outliving any single tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Updated only when a tournament the player entered finishes.
    pub rating: Rating,
}

/// A tournament record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub prize_positions: u32,
    pub pairing_method: PairingMethod,
    pub state: TournamentState,
    /// 0 before the tournament starts, then 1-based and monotone.
    pub current_round: u32,
    /// 0 before the tournament starts, then fixed by the planner.
    pub total_rounds: u32,
    /// Elo K-factor applied at completion.
    pub rating_k: f64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// A player's tournament-scoped state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub tournament: TournamentId,
    pub player: PlayerId,
    /// Rating snapshot taken when the tournament starts; all pairings and
    /// Elo expectations read this, never a mid-update value.
    pub initial_rating: Rating,
    pub score: Score,
    pub games_played: u32,
    pub had_bye: bool,
    /// Set exactly once, when the tournament finishes.
    pub final_placement: Option<u32>,
}

/// One round of a tournament. Round `k` exists only if rounds `1..k` do;
/// all rounds are created up front when the tournament starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub tournament: TournamentId,
    /// 1-based sequence number, unique within the tournament.
    pub number: u32,
    /// The unpaired participant of an odd field, credited a full point.
    pub bye: Option<ParticipantId>,
}

/// A pairing between two participants of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub tournament: TournamentId,
    pub round: RoundId,
    /// First-mover. Never equal to `black`.
    pub white: ParticipantId,
    /// Second-mover.
    pub black: ParticipantId,
    /// `None` until the game concludes; set exactly once.
    pub outcome: Option<Outcome>,
}

impl Game {
    /// Whether `participant` plays in this game.
    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.white == participant || self.black == participant
    }

    /// The other side of the board, if `participant` plays here.
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        if self.white == participant {
            Some(self.black)
        } else if self.black == participant {
            Some(self.white)
        } else {
            None
        }
    }
}

/// Summary counts for one tournament, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentInfo {
    pub id: TournamentId,
    pub name: String,
    pub prize_positions: u32,
    pub pairing_method: PairingMethod,
    pub state: TournamentState,
    pub current_round: u32,
    pub total_rounds: u32,
    pub players: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Per-round game counts, mirroring what a results board shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub number: u32,
    pub games: usize,
    pub games_decided: usize,
    /// Name of the player sitting out, if the field was odd.
    pub bye: Option<String>,
}

/// A tournament summary plus its played rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetails {
    pub info: TournamentInfo,
    pub rounds: Vec<RoundSummary>,
}

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub player: PlayerId,
    pub name: String,
    pub games_played: u32,
    pub score: Score,
    /// Dense 1-based placement; provisional while the tournament is active.
    pub placement: u32,
}

/// A game of the current round, with names resolved for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub id: GameId,
    pub round: u32,
    pub white: String,
    pub black: String,
    pub outcome: Option<Outcome>,
}
