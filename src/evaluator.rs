//! Per-region candidate evaluation against the generation oracle.
//!
//! Construction runs the once-per-search pre-check: a kind with no generator
//! factory, an unsupported version, or a predicate that can never match the
//! generator's declared loot items short-circuits the whole search for that
//! kind -- no region is ever visited and the placement hook is never called.
//!
//! Per region, four hard filters run in order: placement, spawn eligibility,
//! generation eligibility, then materialization plus loot counting. Failure
//! at any stage discards the region silently; there is no error path.

use crate::item::ItemId;
use crate::pos::{BlockPos, ChunkPos, RegionPos, CHUNK_SIZE};
use crate::rng::WorkerRand;
use crate::structure::{GenerationContext, GeneratorFactory, StructureHooks, StructureKind};
use log::*;
use serde::{Deserialize, Serialize};

/// A chunk position believed to contain matching loot, paired with the
/// matched item count. Always `matched_items > 0`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub pos: ChunkPos,
    pub matched_items: u32,
}

/// Evaluates spiral regions for one structure kind. Immutable once built and
/// shared read-only across workers; all mutable state is the per-worker
/// [`WorkerRand`] passed into [`evaluate`].
///
/// [`evaluate`]: RegionEvaluator::evaluate
pub struct RegionEvaluator<'a, P> {
    kind: StructureKind,
    ctx: &'a GenerationContext,
    hooks: &'a StructureHooks,
    factory: &'a GeneratorFactory,
    predicate: &'a P,
}

impl<'a, P> RegionEvaluator<'a, P>
where
    P: Fn(ItemId) -> bool,
{
    /// Build an evaluator, running the pre-check. Returns `None` when the
    /// search for this kind degenerates to an empty result: no generator
    /// factory, version unsupported, or the predicate provably matches none
    /// of the declared loot items.
    pub fn new(
        kind: StructureKind,
        ctx: &'a GenerationContext,
        hooks: &'a StructureHooks,
        predicate: &'a P,
    ) -> Option<Self> {
        let factory = match hooks.generator.as_ref() {
            Some(factory) => factory,
            None => {
                debug!("{}: no generator factory, skipping search", kind.name());
                return None;
            }
        };
        let probe = match factory(ctx.version) {
            Some(probe) => probe,
            None => {
                debug!(
                    "{}: generator unsupported at {:?}, skipping search",
                    kind.name(),
                    ctx.version
                );
                return None;
            }
        };
        if !probe.possible_loot_items().iter().any(|&item| predicate(item)) {
            debug!(
                "{}: predicate matches no declared loot item, skipping search",
                kind.name()
            );
            return None;
        }

        Some(RegionEvaluator {
            kind,
            ctx,
            hooks,
            factory,
            predicate,
        })
    }

    /// Evaluate one region. Yields a candidate only when every stage passes
    /// and the matched item count is positive.
    pub fn evaluate(&self, rand: &mut WorkerRand, region: RegionPos) -> Option<Candidate> {
        let pos = (self.hooks.place_in_region)(self.ctx.world_seed, region, rand)?;
        if !(self.hooks.can_spawn)(pos, self.ctx.biome_source()) {
            return None;
        }
        if !(self.hooks.can_generate)(pos, self.ctx) {
            return None;
        }

        // Fresh generator per region: instances carry leftover layout state
        // from previous runs and must not be reused.
        let mut generator = (self.factory)(self.ctx.version)?;
        if !generator.generate(self.ctx, pos, rand) {
            return None;
        }

        let count: u32 = (self.hooks.loot_at)(
            self.ctx.world_seed,
            pos,
            generator.as_mut(),
            rand,
            false,
        )
        .iter()
        .map(|chest| chest.count_matching(self.predicate))
        .sum();
        if count == 0 {
            return None;
        }

        trace!(
            "{}: candidate at {:?} with {} matching items",
            self.kind.name(),
            pos,
            count
        );
        Some(Candidate {
            pos,
            matched_items: count,
        })
    }

    /// Read-only inspection of a single position: runs every stage at the
    /// chunk containing `pos` and records each outcome instead of
    /// short-circuiting. Not part of the search pipeline; loot is rolled
    /// verbose.
    pub fn explain(&self, rand: &mut WorkerRand, pos: BlockPos) -> StageReport {
        let chunk = pos.to_chunk();
        let region_size = self.hooks.spacing as i32 * CHUNK_SIZE;
        let region = pos.to_region(region_size);

        let placement = (self.hooks.place_in_region)(self.ctx.world_seed, region, rand);
        let can_spawn = (self.hooks.can_spawn)(chunk, self.ctx.biome_source());
        let can_generate = (self.hooks.can_generate)(chunk, self.ctx);

        let mut generated = false;
        let mut matched_items = 0;
        if let Some(mut generator) = (self.factory)(self.ctx.version) {
            generated = generator.generate(self.ctx, chunk, rand);
            if generated {
                matched_items = (self.hooks.loot_at)(
                    self.ctx.world_seed,
                    chunk,
                    generator.as_mut(),
                    rand,
                    true,
                )
                .iter()
                .map(|chest| chest.count_matching(self.predicate))
                .sum();
            }
        }

        StageReport {
            chunk,
            placement,
            can_spawn,
            can_generate,
            generated,
            matched_items,
        }
    }
}

/// Per-stage outcome of [`RegionEvaluator::explain`] for one position.
#[derive(Clone, Copy, Debug)]
pub struct StageReport {
    /// The chunk that was inspected.
    pub chunk: ChunkPos,
    /// Where the kind places its candidate in the surrounding region, if
    /// anywhere.
    pub placement: Option<ChunkPos>,
    pub can_spawn: bool,
    pub can_generate: bool,
    pub generated: bool,
    pub matched_items: u32,
}

impl StageReport {
    /// True when the inspected chunk would have survived the whole pipeline.
    pub fn passed(&self) -> bool {
        self.placement == Some(self.chunk)
            && self.can_spawn
            && self.can_generate
            && self.generated
            && self.matched_items > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{any_of, items, ChestLoot, ItemStack};
    use crate::structure::{BiomeId, BiomeSource, Generator, StructureHooks, Version};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FlatBiomes;

    impl BiomeSource for FlatBiomes {
        fn biome_at(&self, _x: i32, _z: i32) -> BiomeId {
            BiomeId(0)
        }
    }

    struct FixedGenerator {
        declared: &'static [ItemId],
    }

    impl Generator for FixedGenerator {
        fn generate(&mut self, _: &GenerationContext, _: ChunkPos, _: &mut WorkerRand) -> bool {
            true
        }

        fn possible_loot_items(&self) -> &[ItemId] {
            self.declared
        }
    }

    fn context() -> GenerationContext {
        GenerationContext::new(1, Version::V1_16, Arc::new(FlatBiomes))
    }

    /// Hooks that place a candidate in every region (at the region's first
    /// chunk) and roll two golden apples plus one ingot per chest.
    fn apple_hooks(placements: Arc<AtomicUsize>) -> StructureHooks {
        StructureHooks {
            spacing: 2,
            place_in_region: Box::new(move |_, region, _| {
                placements.fetch_add(1, Ordering::Relaxed);
                Some(ChunkPos::new(region.x * 2, region.z * 2))
            }),
            can_spawn: Box::new(|_, _| true),
            can_generate: Box::new(|_, _| true),
            loot_at: Box::new(|_, _, _, _, _| {
                vec![ChestLoot::new(vec![
                    ItemStack::new(items::GOLDEN_APPLE, 2),
                    ItemStack::new(items::IRON_INGOT, 1),
                ])]
            }),
            generator: Some(Box::new(|_| {
                Some(Box::new(FixedGenerator {
                    declared: &[items::GOLDEN_APPLE, items::IRON_INGOT],
                }))
            })),
        }
    }

    #[test]
    fn yields_candidate_with_positive_count() {
        let ctx = context();
        let hooks = apple_hooks(Arc::new(AtomicUsize::new(0)));
        let predicate = any_of(&[items::GOLDEN_APPLE]);
        let evaluator =
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).unwrap();

        let mut rand = WorkerRand::new();
        let candidate = evaluator.evaluate(&mut rand, RegionPos::new(3, -1)).unwrap();
        assert_eq!(candidate.pos, ChunkPos::new(6, -2));
        assert_eq!(candidate.matched_items, 2);
    }

    #[test]
    fn zero_matched_count_discards_region() {
        // The predicate matches a declared item (so the pre-check passes)
        // but the rolled chests happen to be empty.
        let ctx = context();
        let mut hooks = apple_hooks(Arc::new(AtomicUsize::new(0)));
        hooks.loot_at = Box::new(|_, _, _, _, _| vec![ChestLoot::default()]);
        let predicate = any_of(&[items::GOLDEN_APPLE]);
        let evaluator =
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).unwrap();
        let mut rand = WorkerRand::new();
        assert!(evaluator.evaluate(&mut rand, RegionPos::new(0, 0)).is_none());
    }

    #[test]
    fn unsatisfiable_predicate_skips_search_without_placement() {
        let ctx = context();
        let placements = Arc::new(AtomicUsize::new(0));
        let hooks = apple_hooks(placements.clone());
        let predicate = any_of(&[items::HEART_OF_THE_SEA]);
        assert!(
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).is_none()
        );
        assert_eq!(placements.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn missing_factory_skips_search() {
        let ctx = context();
        let mut hooks = apple_hooks(Arc::new(AtomicUsize::new(0)));
        hooks.generator = None;
        let predicate = any_of(&[items::GOLDEN_APPLE]);
        assert!(
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).is_none()
        );
    }

    #[test]
    fn unsupported_version_skips_search() {
        let ctx = context();
        let mut hooks = apple_hooks(Arc::new(AtomicUsize::new(0)));
        hooks.generator = Some(Box::new(|version| {
            (version >= Version::V1_17).then(|| {
                Box::new(FixedGenerator {
                    declared: &[items::GOLDEN_APPLE],
                }) as Box<dyn Generator>
            })
        }));
        let predicate = any_of(&[items::GOLDEN_APPLE]);
        assert!(
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).is_none()
        );
    }

    #[test]
    fn failed_spawn_check_discards_region() {
        let ctx = context();
        let mut hooks = apple_hooks(Arc::new(AtomicUsize::new(0)));
        hooks.can_spawn = Box::new(|pos, _| pos.x >= 0);
        let predicate = any_of(&[items::GOLDEN_APPLE]);
        let evaluator =
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).unwrap();
        let mut rand = WorkerRand::new();
        assert!(evaluator.evaluate(&mut rand, RegionPos::new(-1, 0)).is_none());
        assert!(evaluator.evaluate(&mut rand, RegionPos::new(1, 0)).is_some());
    }

    #[test]
    fn explain_records_each_stage() {
        let ctx = context();
        let hooks = apple_hooks(Arc::new(AtomicUsize::new(0)));
        let predicate = any_of(&[items::GOLDEN_APPLE]);
        let evaluator =
            RegionEvaluator::new(StructureKind::DesertPyramid, &ctx, &hooks, &predicate).unwrap();

        let mut rand = WorkerRand::new();
        // chunk (0, 0) is where the hooks place region (0, 0)'s candidate
        let report = evaluator.explain(&mut rand, BlockPos::new(5, 5));
        assert_eq!(report.chunk, ChunkPos::new(0, 0));
        assert_eq!(report.placement, Some(ChunkPos::new(0, 0)));
        assert!(report.passed());

        // chunk (1, 1) is inside region (0, 0) but not its placement
        let report = evaluator.explain(&mut rand, BlockPos::new(17, 17));
        assert_eq!(report.placement, Some(ChunkPos::new(0, 0)));
        assert!(!report.passed());
    }
}
