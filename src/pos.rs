use serde::{Deserialize, Serialize};

/// Side length of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// A position in block units.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos { x: 0, z: 0 };

    pub fn new(x: i32, z: i32) -> BlockPos {
        BlockPos { x, z }
    }

    /// The chunk containing this block (floor division by 16).
    pub fn to_chunk(self) -> ChunkPos {
        ChunkPos {
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }

    /// The region containing this block, for a region `size` given in blocks.
    pub fn to_region(self, size: i32) -> RegionPos {
        RegionPos {
            x: self.x.div_euclid(size),
            z: self.z.div_euclid(size),
        }
    }

    /// Squared Euclidean distance to another block position.
    pub fn dist_sq(self, other: BlockPos) -> u64 {
        let dx = (self.x as i64) - (other.x as i64);
        let dz = (self.z as i64) - (other.z as i64);
        (dx * dx + dz * dz) as u64
    }
}

/// A position in 16-block chunk units.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> ChunkPos {
        ChunkPos { x, z }
    }

    /// The corner block of this chunk.
    pub fn to_block(self) -> BlockPos {
        BlockPos {
            x: self.x << 4,
            z: self.z << 4,
        }
    }
}

/// A position in region units. A region covers `spacing * 16` blocks per
/// side; the size is carried by the search configuration rather than by
/// every value.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> RegionPos {
        RegionPos { x, z }
    }

    /// Chebyshev distance to another region position (ring index in a
    /// square spiral).
    pub fn chebyshev(self, other: RegionPos) -> u32 {
        let dx = (self.x - other.x).abs();
        let dz = (self.z - other.z).abs();
        dx.max(dz) as u32
    }
}
