//! Elo rating arithmetic.
//!
//! Ratings move only at tournament completion. Every expectation is taken
//! against pre-tournament ratings, so the order in which players are
//! processed can never influence anyone else's new value.

use crate::tournament::models::Rating;

/// Probability that a player rated `own` scores against a player rated
/// `opponent`. For any pair, `expected_score(a, b) + expected_score(b, a)`
/// is exactly 1.
pub fn expected_score(own: Rating, opponent: Rating) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(opponent - own) / 400.0))
}

/// New rating after a tournament.
///
/// `games` holds one `(opponent_rating, actual)` entry per decided game,
/// with `actual` being 1.0 for a win, 0.5 for a draw and 0.0 for a loss.
/// Byes contribute no entry. The result is rounded to the nearest integer.
pub fn updated_rating(rating: Rating, games: &[(Rating, f64)], k: f64) -> Rating {
    let delta: f64 = games
        .iter()
        .map(|&(opponent, actual)| actual - expected_score(rating, opponent))
        .sum();
    (f64::from(rating) + k * delta).round() as Rating
}
