//! Pairing generation.
//!
//! Round one is seeded by one of four policies ([`first_round`]); every
//! later round follows the general Swiss contract ([`swiss`]): pair inside
//! score groups, float the remainder of odd groups down, and never pair two
//! participants a second time.
//!
//! Both generators are pure functions over participant ids; the lifecycle
//! controller supplies seeding order, scores and pairing history from the
//! store and commits the returned pairings.

use serde::{Deserialize, Serialize};

use crate::tournament::models::ParticipantId;

pub mod first_round;
pub mod swiss;

pub use first_round::generate_first_round;
pub use swiss::pair_round;

/// The output of pairing one round: ordered boards plus at most one bye.
///
/// Each board is `(white, black)`; color assignment alternates by board
/// index for the deterministic policies, so colors stay balanced and a
/// fixed input always produces the same output.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct RoundPairings {
    pub boards: Vec<(ParticipantId, ParticipantId)>,
    pub bye: Option<ParticipantId>,
}
