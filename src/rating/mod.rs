//! Skill rating updates.
//!
//! Pure Elo arithmetic; the lifecycle controller gathers each participant's
//! decided games at tournament completion, computes every new rating from
//! pre-tournament values, then applies the whole batch at once.

pub mod elo;

pub use elo::{expected_score, updated_rating};
