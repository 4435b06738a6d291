//! Per-worker pseudo-random scratch state.
//!
//! Every parallel worker owns exactly one `WorkerRand`, constructed by the
//! pipeline and passed `&mut` into each placement and generation call it
//! performs. The state is never recovered through thread-local or global
//! lookup and never shared between concurrently executing workers -- sharing
//! it would silently corrupt candidate results rather than crash.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

// Region-scrambling multipliers used by the placement oracle's seed mix.
const REGION_X_MULT: i64 = 341_873_128_712;
const REGION_Z_MULT: i64 = 132_897_987_541;

/// Mutable scratch PRNG handed to placement and generation hooks.
///
/// Hooks are expected to reseed before drawing (via [`set_seed`] or
/// [`set_region_seed`]); the state carried between calls is deliberately
/// unspecified.
///
/// [`set_seed`]: WorkerRand::set_seed
/// [`set_region_seed`]: WorkerRand::set_region_seed
pub struct WorkerRand {
    rng: SmallRng,
}

impl WorkerRand {
    pub fn new() -> WorkerRand {
        WorkerRand {
            rng: SmallRng::seed_from_u64(0),
        }
    }

    /// Reseed the generator.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Reseed for a structure region: combines the world seed, the region
    /// coordinates and a per-structure salt the way the placement oracle
    /// scrambles its region seeds.
    pub fn set_region_seed(&mut self, world_seed: i64, region_x: i32, region_z: i32, salt: i64) {
        let seed = (region_x as i64)
            .wrapping_mul(REGION_X_MULT)
            .wrapping_add((region_z as i64).wrapping_mul(REGION_Z_MULT))
            .wrapping_add(world_seed)
            .wrapping_add(salt);
        self.set_seed(seed as u64);
    }
}

impl Default for WorkerRand {
    fn default() -> Self {
        WorkerRand::new()
    }
}

impl RngCore for WorkerRand {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
