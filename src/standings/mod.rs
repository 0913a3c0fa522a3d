//! Standings resolution: Buchholz tie-break and dense placement assignment.

pub mod resolver;

pub use resolver::{RankedParticipant, StandingInput, resolve};
