//! Swiss pairing for rounds after the first.
//!
//! The pool is ordered by score group (best first) with the seeding order
//! inside each group. Pairing walks that order: the top unpaired player
//! meets the nearest unpaired player they have not faced, which keeps score
//! groups together and floats the leftover of an odd group into the next
//! one. When a greedy choice strands someone, the search backtracks, so a
//! repeat-free round is found whenever one exists at all.

use std::collections::{BTreeMap, BTreeSet};

use super::{RoundPairings, first_round::with_colors};
use crate::tournament::models::{ParticipantId, Score};

/// Pair a later round.
///
/// `seeds` is the full field in seeding order (rating descending, arrival
/// order on ties); `scores` the current score of every participant;
/// `history` every pair already played, keyed both ways; `had_bye` everyone
/// already credited a bye.
///
/// Returns `None` when no repeat-free pairing of the field exists; the
/// caller reports that as a typed error and owns any fallback.
pub fn pair_round(
    seeds: &[ParticipantId],
    scores: &BTreeMap<ParticipantId, Score>,
    history: &BTreeMap<ParticipantId, BTreeSet<ParticipantId>>,
    had_bye: &BTreeSet<ParticipantId>,
) -> Option<RoundPairings> {
    let mut pool = seeds.to_vec();
    // Stable by descending score keeps seeding order within a group.
    pool.sort_by_key(|id| std::cmp::Reverse(scores.get(id).copied().unwrap_or(Score::ZERO)));

    let bye = if pool.len() % 2 == 1 {
        let chosen = choose_bye(&pool, had_bye)?;
        pool.retain(|&id| id != chosen);
        Some(chosen)
    } else {
        None
    };

    let mut boards = Vec::with_capacity(pool.len() / 2);
    if !pair_pool(&mut pool, history, &mut boards) {
        return None;
    }

    let boards = boards
        .into_iter()
        .enumerate()
        .map(|(i, (higher, lower))| with_colors(i, higher, lower))
        .collect();
    Some(RoundPairings { boards, bye })
}

/// The bye goes to the lowest-ranked player who has not had one yet,
/// falling back to the lowest-ranked overall once everyone has.
fn choose_bye(pool: &[ParticipantId], had_bye: &BTreeSet<ParticipantId>) -> Option<ParticipantId> {
    pool.iter()
        .rev()
        .copied()
        .find(|id| !had_bye.contains(id))
        .or_else(|| pool.last().copied())
}

/// Backtracking search for a perfect repeat-free matching of `pool`,
/// preserving its order preference. Pairs land in `boards` as
/// (higher-ranked, lower-ranked).
fn pair_pool(
    pool: &mut Vec<ParticipantId>,
    history: &BTreeMap<ParticipantId, BTreeSet<ParticipantId>>,
    boards: &mut Vec<(ParticipantId, ParticipantId)>,
) -> bool {
    if pool.is_empty() {
        return true;
    }
    let top = pool.remove(0);
    for i in 0..pool.len() {
        let candidate = pool[i];
        if played_before(history, top, candidate) {
            continue;
        }
        pool.remove(i);
        boards.push((top, candidate));
        if pair_pool(pool, history, boards) {
            return true;
        }
        boards.pop();
        pool.insert(i, candidate);
    }
    pool.insert(0, top);
    false
}

fn played_before(
    history: &BTreeMap<ParticipantId, BTreeSet<ParticipantId>>,
    a: ParticipantId,
    b: ParticipantId,
) -> bool {
    history.get(&a).is_some_and(|faced| faced.contains(&b))
}
