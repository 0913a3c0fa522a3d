//! Final placement resolution.
//!
//! Participants are grouped by exact score, groups ordered best first.
//! Inside a group the Buchholz statistic decides: the sum of the final
//! scores of every opponent the participant was paired against (a bye has
//! no opponent and contributes nothing). Remaining ties fall back to
//! pre-tournament rating, then to participant id, so the ordering is total
//! and deterministic. Placements are dense integers starting at 1.

use std::collections::BTreeMap;

use crate::tournament::models::{ParticipantId, Rating, Score};

/// What the resolver needs to know about one participant.
#[derive(Clone, Copy, Debug)]
pub struct StandingInput {
    pub id: ParticipantId,
    pub score: Score,
    pub rating: Rating,
}

/// One resolved placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankedParticipant {
    pub id: ParticipantId,
    pub score: Score,
    pub buchholz: Score,
    pub placement: u32,
}

/// Order participants into final placements.
///
/// `opponents` maps each participant to everyone they were paired against
/// across all rounds; participants missing from the map simply have an
/// empty Buchholz sum.
pub fn resolve(
    entries: &[StandingInput],
    opponents: &BTreeMap<ParticipantId, Vec<ParticipantId>>,
) -> Vec<RankedParticipant> {
    let final_scores: BTreeMap<ParticipantId, Score> =
        entries.iter().map(|e| (e.id, e.score)).collect();

    let buchholz_of = |id: ParticipantId| -> Score {
        opponents
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|opponent| final_scores.get(opponent).copied())
            .sum()
    };

    let mut groups: BTreeMap<Score, Vec<&StandingInput>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.score).or_default().push(entry);
    }

    let mut placements = Vec::with_capacity(entries.len());
    let mut next_placement = 1;
    for (score, group) in groups.into_iter().rev() {
        let mut ranked: Vec<(Score, &StandingInput)> = group
            .into_iter()
            .map(|entry| (buchholz_of(entry.id), entry))
            .collect();
        ranked.sort_by(|(buchholz_a, a), (buchholz_b, b)| {
            buchholz_b
                .cmp(buchholz_a)
                .then(b.rating.cmp(&a.rating))
                .then(a.id.cmp(&b.id))
        });
        for (buchholz, entry) in ranked {
            placements.push(RankedParticipant {
                id: entry.id,
                score,
                buchholz,
                placement: next_placement,
            });
            next_placement += 1;
        }
    }
    placements
}
