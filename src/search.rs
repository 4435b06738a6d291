//! The search pipeline: spiral enumeration, parallel region evaluation, and
//! the two terminal selection policies.
//!
//! One pipeline serves both execution modes: the degree of parallelism is a
//! parameter, and a degree of 1 is the sequential case. Region evaluation is
//! the only unit of work distributed across workers; each worker owns its
//! own [`WorkerRand`], constructed by rayon's `*_init` adapters and never
//! shared with another worker.

use crate::evaluator::{Candidate, RegionEvaluator};
use crate::item::ItemId;
use crate::pos::{BlockPos, RegionPos, CHUNK_SIZE};
use crate::rng::WorkerRand;
use crate::select::{self, BudgetSink};
use crate::spiral::SpiralIterator;
use crate::structure::{GenerationContext, StructureKind, StructureRegistry};
use log::*;
use rayon::prelude::*;

/// Sentinel for short-circuiting parallel iteration once a selector's stop
/// condition is satisfied. In-flight evaluations still complete; their late
/// results are discarded by the sink's compare-then-append guard.
struct BudgetReached;

/// Fluent configuration for one loot search.
///
/// A search is wired from a generation context, a capability registry, and
/// an item predicate, then consumed through one of the terminals:
/// [`candidates`], [`closest`] or [`until_items`].
///
/// [`candidates`]: LootSearch::candidates
/// [`closest`]: LootSearch::closest
/// [`until_items`]: LootSearch::until_items
pub struct LootSearch<'a, P> {
    ctx: &'a GenerationContext,
    registry: &'a StructureRegistry,
    predicate: P,
    center: BlockPos,
    radius: i32,
    kinds: Vec<StructureKind>,
    parallelism: usize,
}

impl<'a, P> LootSearch<'a, P>
where
    P: Fn(ItemId) -> bool + Sync,
{
    /// Start a search configuration centered on the origin with no kinds
    /// selected and a parallelism of 1.
    pub fn new(ctx: &'a GenerationContext, registry: &'a StructureRegistry, predicate: P) -> Self {
        LootSearch {
            ctx,
            registry,
            predicate,
            center: BlockPos::ORIGIN,
            radius: 0,
            kinds: Vec::new(),
            parallelism: 1,
        }
    }

    /// Block position to search around.
    pub fn center(mut self, center: BlockPos) -> Self {
        self.center = center;
        self
    }

    /// Search radius in blocks. Must be non-negative.
    pub fn radius(mut self, radius: i32) -> Self {
        debug_assert!(radius >= 0, "search radius must be non-negative");
        self.radius = radius;
        self
    }

    /// Add a structure kind to search for.
    pub fn structure(mut self, kind: StructureKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Add several structure kinds to search for.
    pub fn structures(mut self, kinds: impl IntoIterator<Item = StructureKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    /// Degree of parallelism: minimum 1, capped at available hardware
    /// concurrency. 1 means sequential evaluation.
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Evaluate every configured kind over the full radius and return all
    /// candidates, merged and sorted by ascending squared distance from the
    /// center.
    pub fn candidates(&self) -> Vec<Candidate> {
        let pool = self.thread_pool();
        pool.install(|| {
            let streams: Vec<Vec<Candidate>> = self
                .kinds
                .iter()
                .map(|&kind| self.kind_candidates(kind))
                .collect();
            select::merge_by_distance(self.center, streams)
        })
    }

    /// The `limit` closest matching positions, nearest first. Requires full
    /// evaluation: closest-N needs a total order by distance before
    /// truncation, so it is never raced against parallel workers.
    pub fn closest(&self, limit: usize) -> Vec<BlockPos> {
        select::closest_n(&self.candidates(), limit)
    }

    /// Accumulate candidates until the running matched-item total reaches
    /// `budget`, then stop dispatching work. Consumption order is the
    /// delivery order, which under parallel execution is not distance order;
    /// the returned set may overshoot the budget by the last accepted
    /// candidate's count (see [`BudgetSink`]).
    pub fn until_items(&self, budget: u64) -> Vec<BlockPos> {
        let sink = BudgetSink::new(budget);
        let pool = self.thread_pool();
        pool.install(|| {
            for &kind in &self.kinds {
                if sink.satisfied() {
                    break;
                }
                let Some((evaluator, regions)) = self.kind_pipeline(kind) else {
                    continue;
                };
                let _ = regions
                    .par_iter()
                    .try_for_each_init(WorkerRand::new, |rand, &region| {
                        if sink.satisfied() {
                            return Err(BudgetReached);
                        }
                        if let Some(candidate) = evaluator.evaluate(rand, region) {
                            if sink.offer(candidate) {
                                return Err(BudgetReached);
                            }
                        }
                        Ok(())
                    });
            }
        });
        sink.into_hits()
            .into_iter()
            .map(|candidate| candidate.pos.to_block())
            .collect()
    }

    /// All candidates for one kind, in spiral discovery order.
    fn kind_candidates(&self, kind: StructureKind) -> Vec<Candidate> {
        let Some((evaluator, regions)) = self.kind_pipeline(kind) else {
            return Vec::new();
        };
        regions
            .par_iter()
            .map_init(WorkerRand::new, |rand, &region| {
                evaluator.evaluate(rand, region)
            })
            .flatten()
            .collect()
    }

    /// Resolve hooks, run the evaluator pre-check, and enumerate the spiral
    /// for one kind. `None` when the kind's search degenerates to empty.
    fn kind_pipeline(
        &self,
        kind: StructureKind,
    ) -> Option<(RegionEvaluator<'_, P>, Vec<RegionPos>)> {
        let hooks = match self.registry.get(kind) {
            Some(hooks) => hooks,
            None => {
                debug!("{}: not registered, skipping search", kind.name());
                return None;
            }
        };
        debug_assert!(hooks.spacing > 0, "structure spacing must be positive");

        let evaluator = RegionEvaluator::new(kind, self.ctx, hooks, &self.predicate)?;

        let region_size = hooks.spacing as i32 * CHUNK_SIZE;
        let half_extent = (self.radius / region_size) as u32;
        let spiral = SpiralIterator::new(self.center.to_region(region_size), half_extent);
        debug!(
            "{}: searching {} regions of {} blocks around {:?}",
            kind.name(),
            spiral.len(),
            region_size,
            self.center
        );
        Some((evaluator, spiral.collect()))
    }

    fn thread_pool(&self) -> rayon::ThreadPool {
        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let threads = self.parallelism.clamp(1, hardware);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("worker pool must build with a fixed thread count")
    }
}
