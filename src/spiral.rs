//! Expanding-ring enumeration of region positions around a search center.
//!
//! Ring 0 is the center itself; ring k contains every position at Chebyshev
//! distance k, walked in a fixed edge order (top edge left to right, right
//! edge top to bottom, bottom edge right to left, left edge bottom to top) so
//! the output order is reproducible. The iterator is finite: it stops once
//! the ring index exceeds the configured half-extent.

use crate::pos::RegionPos;

/// Lazy spiral over the square of regions within `half_extent` rings of a
/// center. Construct a fresh iterator per search; it is not reusable after
/// exhaustion.
pub struct SpiralIterator {
    center: RegionPos,
    half_extent: u32,
    ring: u32,
    /// Index of the next position within the current ring (0..8*ring;
    /// ring 0 has exactly one position).
    index: u32,
}

impl SpiralIterator {
    pub fn new(center: RegionPos, half_extent: u32) -> SpiralIterator {
        SpiralIterator {
            center,
            half_extent,
            ring: 0,
            index: 0,
        }
    }

    /// Total number of positions in the whole spiral.
    fn total(&self) -> usize {
        let side = 2 * self.half_extent as usize + 1;
        side * side
    }

    /// Position `index` on ring `ring` (ring >= 1), following the fixed
    /// edge order. Each edge owns its leading corner so every position is
    /// produced exactly once.
    fn ring_position(&self, ring: u32, index: u32) -> RegionPos {
        let k = ring as i32;
        let i = index as i32;
        let edge = 2 * k; // positions per edge, corners assigned uniquely
        let (dx, dz) = if i < edge {
            // top edge: left to right
            (-k + i, -k)
        } else if i < 2 * edge {
            // right edge: top to bottom
            (k, -k + (i - edge))
        } else if i < 3 * edge {
            // bottom edge: right to left
            (k - (i - 2 * edge), k)
        } else {
            // left edge: bottom to top
            (-k, k - (i - 3 * edge))
        };
        RegionPos::new(self.center.x + dx, self.center.z + dz)
    }
}

impl Iterator for SpiralIterator {
    type Item = RegionPos;

    fn next(&mut self) -> Option<RegionPos> {
        if self.ring > self.half_extent {
            return None;
        }

        if self.ring == 0 {
            self.ring = 1;
            self.index = 0;
            return Some(self.center);
        }

        let pos = self.ring_position(self.ring, self.index);
        self.index += 1;
        if self.index == 8 * self.ring {
            self.ring += 1;
            self.index = 0;
        }
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.ring > self.half_extent {
            return (0, Some(0));
        }
        let total = self.total();
        let emitted = if self.ring == 0 {
            0
        } else {
            let inner = 2 * (self.ring as usize - 1) + 1;
            inner * inner + self.index as usize
        };
        let remaining = total - emitted;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpiralIterator {}
