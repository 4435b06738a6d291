//! Terminal consumers for candidate streams: distance merging, closest-N
//! truncation, and budget-limited accumulation.

use crate::evaluator::Candidate;
use crate::pos::BlockPos;
use itertools::Itertools;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Combine per-structure-kind candidate streams into one sequence globally
/// sorted by ascending squared distance from the search center. The sort is
/// stable, so candidates at equal distance keep their discovery order.
///
/// All input candidates are materialized before the first output; the
/// streams are bounded by the search radius, so this is fine.
pub fn merge_by_distance(
    center: BlockPos,
    streams: impl IntoIterator<Item = Vec<Candidate>>,
) -> Vec<Candidate> {
    streams
        .into_iter()
        .flatten()
        .sorted_by_key(|candidate| candidate.pos.to_block().dist_sq(center))
        .collect()
}

/// The first `limit` candidates of a sequence already sorted by ascending
/// distance, as block positions. Returns everything when fewer than `limit`
/// exist.
pub fn closest_n(sorted: &[Candidate], limit: usize) -> Vec<BlockPos> {
    sorted
        .iter()
        .take(limit)
        .map(|candidate| candidate.pos.to_block())
        .collect()
}

/// Consume candidates in the order delivered, summing matched item counts,
/// and stop at the candidate that brings the running total to `budget` or
/// beyond (that candidate is included; nothing after it is). The final total
/// may overshoot by the last candidate's count -- candidates are never
/// partially counted.
pub fn take_until_budget(
    candidates: impl IntoIterator<Item = Candidate>,
    budget: u64,
) -> Vec<Candidate> {
    let mut total = 0u64;
    let mut taken = Vec::new();
    for candidate in candidates {
        if total >= budget {
            break;
        }
        total += candidate.matched_items as u64;
        taken.push(candidate);
    }
    taken
}

/// Concurrent budget accumulator shared by parallel producers.
///
/// The stop condition is compare-then-append: a producer reserves its
/// candidate's count on the atomic running total and appends only when the
/// total before the reservation was still below the target. Two producers
/// crossing the threshold at the same moment can therefore both append --
/// the accepted set may exceed the budget by at most one candidate's count
/// per producer in flight at the crossing. This is a deliberate trade of
/// determinism for early termination, not a bug.
pub struct BudgetSink {
    target: u64,
    total: AtomicU64,
    hits: Mutex<Vec<Candidate>>,
}

impl BudgetSink {
    pub fn new(target: u64) -> BudgetSink {
        BudgetSink {
            target,
            total: AtomicU64::new(0),
            hits: Mutex::new(Vec::new()),
        }
    }

    /// True once the running total has reached the target. Producers should
    /// stop dispatching new work when this turns true; late in-flight offers
    /// are rejected by the compare-then-append guard.
    pub fn satisfied(&self) -> bool {
        self.total.load(Ordering::Relaxed) >= self.target
    }

    /// Offer a candidate. Returns true when the running total has reached
    /// the target after this offer.
    pub fn offer(&self, candidate: Candidate) -> bool {
        let count = candidate.matched_items as u64;
        let before = self.total.fetch_add(count, Ordering::Relaxed);
        if before < self.target {
            self.hits
                .lock()
                .expect("budget sink lock poisoned")
                .push(candidate);
        }
        before + count >= self.target
    }

    /// The accepted candidates, in acceptance order.
    pub fn into_hits(self) -> Vec<Candidate> {
        self.hits
            .into_inner()
            .expect("budget sink lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::ChunkPos;

    fn candidate(chunk_x: i32, count: u32) -> Candidate {
        Candidate {
            pos: ChunkPos::new(chunk_x, 0),
            matched_items: count,
        }
    }

    #[test]
    fn merge_sorts_two_streams_globally() {
        let center = BlockPos::ORIGIN;
        let a = vec![candidate(1, 1), candidate(5, 1), candidate(9, 1)];
        let b = vec![candidate(-2, 1), candidate(7, 1)];
        let merged = merge_by_distance(center, [a, b]);
        assert_eq!(merged.len(), 5);
        let dists: Vec<u64> = merged
            .iter()
            .map(|c| c.pos.to_block().dist_sq(center))
            .collect();
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn merge_ties_keep_discovery_order() {
        let center = BlockPos::ORIGIN;
        let a = vec![candidate(3, 10)];
        let b = vec![candidate(-3, 20)];
        let merged = merge_by_distance(center, [a, b]);
        assert_eq!(merged[0].matched_items, 10);
        assert_eq!(merged[1].matched_items, 20);
    }

    #[test]
    fn closest_n_truncates_and_converts() {
        let sorted = vec![candidate(1, 1), candidate(2, 1), candidate(3, 1)];
        let out = closest_n(&sorted, 2);
        assert_eq!(out, vec![BlockPos::new(16, 0), BlockPos::new(32, 0)]);
        // fewer candidates than the limit returns all of them
        assert_eq!(closest_n(&sorted, 10).len(), 3);
        assert!(closest_n(&sorted, 0).is_empty());
    }

    #[test]
    fn budget_stops_at_the_crossing_candidate() {
        let stream = vec![candidate(1, 2), candidate(2, 5), candidate(3, 1)];
        let taken = take_until_budget(stream, 6);
        // 2 < 6, 2 + 5 = 7 >= 6: the second candidate crosses and is kept
        assert_eq!(taken.len(), 2);
        let sum: u64 = taken.iter().map(|c| c.matched_items as u64).sum();
        assert!(sum >= 6);
        let before_last: u64 = taken[..taken.len() - 1]
            .iter()
            .map(|c| c.matched_items as u64)
            .sum();
        assert!(before_last < 6);
    }

    #[test]
    fn budget_takes_everything_when_never_reached() {
        let stream = vec![candidate(1, 1), candidate(2, 1)];
        assert_eq!(take_until_budget(stream, 100).len(), 2);
    }

    #[test]
    fn budget_zero_takes_nothing() {
        let stream = vec![candidate(1, 1)];
        assert!(take_until_budget(stream, 0).is_empty());
    }

    #[test]
    fn sink_rejects_offers_after_the_threshold() {
        let sink = BudgetSink::new(6);
        assert!(!sink.offer(candidate(1, 2)));
        assert!(sink.offer(candidate(2, 5)));
        assert!(sink.satisfied());
        // a late in-flight result is counted but not appended
        assert!(sink.offer(candidate(3, 4)));
        let hits = sink.into_hits();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].pos, ChunkPos::new(1, 0));
        assert_eq!(hits[1].pos, ChunkPos::new(2, 0));
    }

    #[test]
    fn sink_with_zero_target_is_immediately_satisfied() {
        let sink = BudgetSink::new(0);
        assert!(sink.satisfied());
        assert!(sink.offer(candidate(1, 3)));
        assert!(sink.into_hits().is_empty());
    }
}
