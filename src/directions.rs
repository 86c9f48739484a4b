//! Evenly-spread direction sets for omni sampling
//!
//! An omni light probes its surroundings with `N` rays. For small `N` the
//! difference between a hand-placed spread and a random one is dramatic, so
//! counts up to eight use fixed platonic-solid-like layouts (down ray,
//! up/down pair, horizontal triad, tetrahedron, cube faces, cube corners).
//! Beyond the fixed layouts, remaining slots degrade gracefully to
//! quasi-random octahedral points.
//!
//! Direction sets are pure functions of the count, so [`DirectionSet`]
//! caches the last build and only recomputes when the count changes.
//!
//! Author: Moroya Sakamoto

use glam::{Vec2, Vec3};

use crate::sampling::{octahedral_decode, quasi_point};

const INV_SQRT_3: f32 = 0.577_350_26;

// Quasi fill slots are decorrelated from the jitter sequence by striding
// the sample index.
const FILL_STRIDE: u32 = 17;
const FILL_OFFSET: u32 = 33;

/// Build `n` roughly-evenly-distributed unit directions.
///
/// Layout policy by count:
/// - `0`: empty
/// - `1`: straight down
/// - `2`: up and down
/// - `3`: horizontal triad at 120 degrees
/// - `4..=5`: tetrahedron corners, the fifth slot repeating the all-ones
///   corner
/// - `6..=7`: the six cube-face axes, remainder quasi-filled
/// - `8..`: the eight cube-corner diagonals, remainder quasi-filled
pub fn distribute(n: usize) -> Vec<Vec3> {
    match n {
        0 => Vec::new(),
        1 => vec![Vec3::NEG_Y],
        2 => vec![Vec3::Y, Vec3::NEG_Y],
        3 => {
            // 120 degree fan in the horizontal plane.
            let h = 3.0f32.sqrt() * 0.5;
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(-0.5, 0.0, h),
                Vec3::new(-0.5, 0.0, -h),
            ]
        }
        4 | 5 => {
            let mut dirs = vec![
                Vec3::new(1.0, 1.0, 1.0) * INV_SQRT_3,
                Vec3::new(1.0, -1.0, -1.0) * INV_SQRT_3,
                Vec3::new(-1.0, 1.0, -1.0) * INV_SQRT_3,
                Vec3::new(-1.0, -1.0, 1.0) * INV_SQRT_3,
            ];
            if n == 5 {
                dirs.push(Vec3::new(1.0, 1.0, 1.0) * INV_SQRT_3);
            }
            dirs
        }
        6 | 7 => {
            let mut dirs = vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ];
            quasi_fill(&mut dirs, n);
            dirs
        }
        _ => {
            let mut dirs = Vec::with_capacity(n);
            for x in [1.0f32, -1.0] {
                for y in [1.0f32, -1.0] {
                    for z in [1.0f32, -1.0] {
                        dirs.push(Vec3::new(x, y, z) * INV_SQRT_3);
                    }
                }
            }
            quasi_fill(&mut dirs, n);
            dirs
        }
    }
}

/// Extend a fixed layout to `n` slots with strided quasi-random directions.
fn quasi_fill(dirs: &mut Vec<Vec3>, n: usize) {
    for slot in dirs.len()..n {
        let p = quasi_point(slot as u32 * FILL_STRIDE + FILL_OFFSET, 1.0);
        dirs.push(octahedral_decode(p * 2.0 - Vec2::ONE));
    }
}

/// Cached direction set, rebuilt only when the requested count changes.
#[derive(Debug, Clone, Default)]
pub struct DirectionSet {
    count: usize,
    dirs: Vec<Vec3>,
}

impl DirectionSet {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directions for `n` slots, rebuilding the cache if `n` changed.
    pub fn get(&mut self, n: usize) -> &[Vec3] {
        if n != self.count || self.dirs.len() != n {
            self.dirs = distribute(n);
            self.count = n;
        }
        &self.dirs
    }
}
