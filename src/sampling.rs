//! Quasi-random sampling and cone-constrained direction jitter
//!
//! Sample placement is the foundation of the whole bounce estimator: rays
//! that wander frame to frame produce flickering proxy lights, rays that
//! never move miss geometry forever. The jitter therefore mixes two source
//! sequences:
//!
//! - **Quasi-random**: an additive recurrence over the 2D golden ratio
//!   (plastic constant). Deterministic per sample index, so the same ray
//!   index probes the same direction every frame.
//! - **Seeded LCG**: cheap uniform noise for the remaining samples, giving
//!   the temporal filter fresh information to smooth.
//!
//! 2D points become sphere directions through an octahedral decode whose
//! center maps to `+Z`, so shrinking the 2D footprint shrinks the cone.
//!
//! Author: Moroya Sakamoto

use glam::{Quat, Vec2, Vec3};

/// Plastic constant, the 2D generalization of the golden ratio.
///
/// Root of `x^3 = x + 1`; its inverse powers form the irrational conjugate
/// pair driving the additive recurrence below.
const PLASTIC: f64 = 1.324_717_957_244_746;

/// First recurrence step: `1 / PLASTIC`.
const ALPHA_1: f64 = 1.0 / PLASTIC;
/// Second recurrence step: `1 / PLASTIC^2`.
const ALPHA_2: f64 = 1.0 / (PLASTIC * PLASTIC);

/// Low-discrepancy 2D point in `[0,1)^2` for a sample index.
///
/// Additive recurrence: `fract(0.5 + index * scale * (a1, a2))` with the
/// plastic-constant pair `(a1, a2)`. Deterministic: the same `index` and
/// `scale` always produce the same point, which keeps quasi-sampled rays
/// stable across frames.
#[inline]
pub fn quasi_point(index: u32, scale: f32) -> Vec2 {
    let t = index as f64 * scale as f64;
    Vec2::new(
        (0.5 + ALPHA_1 * t).fract() as f32,
        (0.5 + ALPHA_2 * t).fract() as f32,
    )
}

/// Decode a point in `[-1,1]^2` to a unit sphere direction.
///
/// Center `(0,0)` maps to `+Z`; the square's diamond `|x|+|y| <= 1` covers
/// the upper hemisphere and the folded corners cover the lower one. Offsets
/// scaled down around the center therefore decode into a cap around `+Z`.
#[inline]
pub fn octahedral_decode(p: Vec2) -> Vec3 {
    let z = 1.0 - p.x.abs() - p.y.abs();
    let v = if z >= 0.0 {
        Vec3::new(p.x, p.y, z)
    } else {
        // Lower hemisphere: fold the corner triangles back in.
        Vec3::new(
            (1.0 - p.y.abs()) * sign_not_zero(p.x),
            (1.0 - p.x.abs()) * sign_not_zero(p.y),
            z,
        )
    };
    v.normalize_or_zero()
}

/// Sign that treats zero as positive, used by the octahedral fold.
#[inline]
fn sign_not_zero(x: f32) -> f32 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Advance the LCG state (MMIX constants).
#[inline]
pub(crate) fn lcg_next(state: u64) -> u64 {
    state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

/// Map an LCG state to a float in `[0, 1]`.
#[inline]
pub(crate) fn lcg_float(state: u64) -> f32 {
    ((state >> 16) as u32 as f32) / (u32::MAX as f32)
}

/// Jitter `base` into `count` directions inside a cone.
///
/// Every output keeps the length of `base` and deviates from it by at most
/// roughly `cone_angle_deg`. The first `count * stable_fraction` samples come
/// from the quasi-random sequence and are identical every call; the rest are
/// drawn from the seeded LCG behind `rng` and differ frame to frame.
///
/// `count == 0` or a zero-length `base` returns an empty set, and the
/// caller falls back to a non-raycast estimate.
pub fn jitter_directions(
    base: Vec3,
    count: usize,
    cone_angle_deg: f32,
    stable_fraction: f32,
    rng: &mut u64,
) -> Vec<Vec3> {
    let length = base.length();
    if count == 0 || length <= f32::EPSILON {
        return Vec::new();
    }

    let dir = base / length;
    let frame = Quat::from_rotation_arc(Vec3::Z, dir);
    let spread = (cone_angle_deg / 180.0).clamp(0.0, 1.0);
    let stable = (count as f32 * stable_fraction.clamp(0.0, 1.0)).round() as usize;
    let stable_count = stable.min(count);

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let p = if i < stable_count {
            quasi_point(i as u32, 1.0)
        } else {
            *rng = lcg_next(*rng);
            let x = lcg_float(*rng);
            *rng = lcg_next(*rng);
            let y = lcg_float(*rng);
            Vec2::new(x, y)
        };

        // Center the unit-square point and shrink it to the cone footprint.
        let offset = (p * 2.0 - Vec2::ONE) * spread;
        out.push(frame * (octahedral_decode(offset) * length));
    }

    out
}
