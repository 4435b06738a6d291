//! Collaborator contracts for the external generation oracle.
//!
//! The core never inspects runtime types: every structure kind is a variant
//! of the closed [`StructureKind`] enum, and its behavior is a
//! [`StructureHooks`] capability record resolved through a
//! [`StructureRegistry`] keyed by kind. The record's hooks are supplied by
//! the world-generation subsystem; this crate only drives them.

use crate::item::{ChestLoot, ItemId};
use crate::pos::{ChunkPos, RegionPos};
use crate::rng::WorkerRand;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Game versions the oracle can be asked to generate for.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Version {
    V1_13,
    V1_14,
    V1_15,
    V1_16,
    V1_17,
    V1_18,
}

/// Closed set of loot-bearing structure kinds the pipeline can search for.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum StructureKind {
    BuriedTreasure,
    DesertPyramid,
    JungleTemple,
    Shipwreck,
    OceanRuin,
    EndCity,
}

impl StructureKind {
    /// Human-readable name for logging.
    pub fn name(self) -> &'static str {
        match self {
            StructureKind::BuriedTreasure => "buried_treasure",
            StructureKind::DesertPyramid => "desert_pyramid",
            StructureKind::JungleTemple => "jungle_temple",
            StructureKind::Shipwreck => "shipwreck",
            StructureKind::OceanRuin => "ocean_ruin",
            StructureKind::EndCity => "end_city",
        }
    }
}

/// Opaque biome identifier, interpreted only by the oracle's hooks.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BiomeId(pub u32);

/// Biome lookup for one dimension, supplied by the world-generation
/// subsystem. Shared read-only across workers.
pub trait BiomeSource: Send + Sync {
    fn biome_at(&self, block_x: i32, block_z: i32) -> BiomeId;
}

/// The seed, version and biome source a search generates against.
#[derive(Clone)]
pub struct GenerationContext {
    pub world_seed: i64,
    pub version: Version,
    biomes: Arc<dyn BiomeSource>,
}

impl GenerationContext {
    pub fn new(world_seed: i64, version: Version, biomes: Arc<dyn BiomeSource>) -> Self {
        GenerationContext {
            world_seed,
            version,
            biomes,
        }
    }

    pub fn biome_source(&self) -> &dyn BiomeSource {
        self.biomes.as_ref()
    }
}

/// A structure layout generator. Instances carry internal layout state, so
/// the evaluator constructs a fresh one per region rather than reusing them.
pub trait Generator {
    /// Run generation at a chunk position. Returns false if the structure
    /// cannot actually be laid out there.
    fn generate(&mut self, ctx: &GenerationContext, pos: ChunkPos, rand: &mut WorkerRand) -> bool;

    /// Every item identifier this generator's loot tables can ever produce.
    /// Used to prove a predicate unsatisfiable before any region is visited.
    fn possible_loot_items(&self) -> &[ItemId];
}

/// Creates a [`Generator`] for a version, or `None` when the kind is not
/// supported at that version.
pub type GeneratorFactory = Box<dyn Fn(Version) -> Option<Box<dyn Generator>> + Send + Sync>;

/// Region-local placement: the chunk (if any) where the kind places a
/// candidate inside the given region, for the given world seed.
pub type PlaceFn = Box<dyn Fn(i64, RegionPos, &mut WorkerRand) -> Option<ChunkPos> + Send + Sync>;

/// Spawn eligibility against the biome source.
pub type SpawnFn = Box<dyn Fn(ChunkPos, &dyn BiomeSource) -> bool + Send + Sync>;

/// Generation eligibility against the full context.
pub type GenerateFn = Box<dyn Fn(ChunkPos, &GenerationContext) -> bool + Send + Sync>;

/// Loot retrieval: the rolled container contents for a structure generated
/// at a chunk position. The final flag requests verbose rolls for
/// diagnostics.
pub type LootFn = Box<
    dyn Fn(i64, ChunkPos, &mut dyn Generator, &mut WorkerRand, bool) -> Vec<ChestLoot>
        + Send
        + Sync,
>;

/// Capability record for one structure kind.
pub struct StructureHooks {
    /// Placement spacing in chunks per region axis. Must be positive;
    /// region size in blocks is `spacing * 16`.
    pub spacing: u32,
    pub place_in_region: PlaceFn,
    pub can_spawn: SpawnFn,
    pub can_generate: GenerateFn,
    pub loot_at: LootFn,
    /// Absent when no generator exists for the kind at all; the search for
    /// the kind then degenerates to an empty result.
    pub generator: Option<GeneratorFactory>,
}

/// Capability lookup table keyed by structure kind.
#[derive(Default)]
pub struct StructureRegistry {
    hooks: FnvHashMap<StructureKind, StructureHooks>,
}

impl StructureRegistry {
    pub fn new() -> StructureRegistry {
        StructureRegistry {
            hooks: FnvHashMap::default(),
        }
    }

    pub fn register(&mut self, kind: StructureKind, hooks: StructureHooks) {
        self.hooks.insert(kind, hooks);
    }

    pub fn get(&self, kind: StructureKind) -> Option<&StructureHooks> {
        self.hooks.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = StructureKind> + '_ {
        self.hooks.keys().copied()
    }
}
