//! Searches a procedurally generated world for structures whose loot
//! matches an item predicate, returning either the N closest matches or the
//! smallest set whose combined yield reaches an item budget.
//!
//! The world-generation mathematics (biomes, placement, layout, loot tables)
//! is supplied externally through the capability contracts in [`structure`];
//! this crate drives the search pipeline: spiral region enumeration,
//! four-stage candidate filtering, distance merging, and selection.

pub mod evaluator;
pub mod item;
pub mod pos;
pub mod rng;
pub mod search;
pub mod select;
pub mod spiral;
pub mod structure;

pub use evaluator::{Candidate, RegionEvaluator, StageReport};
pub use item::{any_of, is, ChestLoot, ItemId, ItemStack};
pub use pos::{BlockPos, ChunkPos, RegionPos};
pub use rng::WorkerRand;
pub use search::LootSearch;
pub use select::{closest_n, merge_by_distance, take_until_budget, BudgetSink};
pub use spiral::SpiralIterator;
pub use structure::{
    BiomeId, BiomeSource, GenerationContext, Generator, GeneratorFactory, StructureHooks,
    StructureKind, StructureRegistry, Version,
};
