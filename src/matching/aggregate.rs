use std::cmp::Ordering;

use crate::matching::engine::MatchResult;

/// Ranking order: distance ascending, then kit number ascending
fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    a.distance
        .cmp(&b.distance)
        .then_with(|| a.profile.kit_number.cmp(&b.profile.kit_number))
}

/// Stable-sort matches by rank and keep the best `max_matches`.
///
/// Ranking an already ranked list returns it unchanged.
#[must_use]
pub fn rank_matches(mut matches: Vec<MatchResult>, max_matches: usize) -> Vec<MatchResult> {
    matches.sort_by(rank_order);
    matches.truncate(max_matches);
    matches
}

/// Merge ranked lists produced from disjoint candidate partitions.
///
/// Lists must be given in partition order. Each list only needs to hold its
/// partition's best `max_matches`; the result equals ranking all partitions'
/// matches at once.
#[must_use]
pub fn merge_ranked<I>(lists: I, max_matches: usize) -> Vec<MatchResult>
where
    I: IntoIterator<Item = Vec<MatchResult>>,
{
    let merged: Vec<MatchResult> = lists.into_iter().flatten().collect();
    rank_matches(merged, max_matches)
}
