//! Ray-based bounce sample estimation
//!
//! A sample ray that hits geometry becomes a [`LightSample`]: the proxy
//! light sits at the hit (pulled back by `placement_fraction`), its reach
//! shrinks with hit distance, and its energy favors close, head-on hits:
//!
//! - `energy = sqrt(1 - done) * |dot(hit_normal, ray_dir)|` where `done` is
//!   the hit distance over the full ray length
//! - `radius = (total - 0.5 * hit_distance) * 1.25`
//!
//! Multi-ray estimates energy-weight their per-ray results into one record,
//! diluting energy by the number of rays so misses darken the estimate.
//! With `oversample == 0` the angled path synthesizes a fixed mid-ray dummy
//! record without touching the oracle at all, trading fidelity for a frame
//! with zero raycasts.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::oracle::RayCaster;
use crate::sampling::jitter_directions;
use crate::types::LightSample;

/// Radius gain applied on top of the remaining-distance estimate.
const RADIUS_SCALE: f32 = 1.25;

/// Assumed hit fraction for the castless dummy estimate.
const DUMMY_DONE: f32 = 0.5;

/// Knobs shared by every estimation call.
#[derive(Debug, Clone, Copy)]
pub struct EstimateOptions {
    /// Where along `from -> hit` the proxy light sits. `1.0` places it at
    /// the hit point, values above pull it slightly past the surface.
    pub placement_fraction: f32,
    /// Fraction of jittered rays drawn from the stable quasi sequence.
    pub stable_fraction: f32,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            placement_fraction: 1.0,
            stable_fraction: 0.75,
        }
    }
}

/// Estimate a bounce sample from a single segment cast.
///
/// Returns `None` on a miss or a zero-length segment. A zero-length
/// segment never reaches the oracle.
pub fn estimate_single(
    caster: &mut RayCaster<'_>,
    from: Vec3,
    to: Vec3,
    opts: &EstimateOptions,
) -> Option<LightSample> {
    let span = to - from;
    let total = span.length();
    if total <= f32::EPSILON {
        return None;
    }
    let dir = span / total;

    let hit = caster.cast(from, to)?;
    let done_dist = (hit.position - from).length();
    let done = (done_dist / total).clamp(0.0, 1.0);

    Some(LightSample {
        energy: (1.0 - done).sqrt() * hit.normal.dot(dir).abs(),
        position: from.lerp(to, done * opts.placement_fraction),
        normal: hit.normal,
        radius: (total - 0.5 * done_dist) * RADIUS_SCALE,
        color: None,
    })
}

/// Synthesize a sample as if the ray hit head-on at its midpoint.
///
/// Issues no raycast. Used when oversampling is configured to zero, so the
/// whole system can run without an oracle at reduced fidelity.
pub fn estimate_dummy(from: Vec3, to: Vec3, opts: &EstimateOptions) -> LightSample {
    let span = to - from;
    let total = span.length();
    let done_dist = total * DUMMY_DONE;

    LightSample {
        // No normal information: assume a head-on surface.
        energy: (1.0 - DUMMY_DONE).sqrt(),
        position: from.lerp(to, DUMMY_DONE * opts.placement_fraction),
        normal: -span.normalize_or_zero(),
        radius: (total - 0.5 * done_dist) * RADIUS_SCALE,
        color: None,
    }
}

/// Energy-weighted average of single estimates along several directions.
///
/// Position, normal and radius are weighted by each ray's energy; the final
/// energy is the energy sum divided by the direction count, so misses and
/// grazing hits dilute the result. Returns `None` when no ray contributed
/// energy.
pub fn estimate_average(
    caster: &mut RayCaster<'_>,
    from: Vec3,
    directions: &[Vec3],
    opts: &EstimateOptions,
) -> Option<LightSample> {
    if directions.is_empty() {
        return None;
    }

    let mut total_energy = 0.0f32;
    let mut position = Vec3::ZERO;
    let mut normal = Vec3::ZERO;
    let mut radius = 0.0f32;

    for dir in directions {
        if let Some(s) = estimate_single(caster, from, from + *dir, opts) {
            total_energy += s.energy;
            position += s.position * s.energy;
            normal += s.normal * s.energy;
            radius += s.radius * s.energy;
        }
    }

    if total_energy <= 0.0 {
        return None;
    }

    Some(LightSample {
        energy: total_energy / directions.len() as f32,
        position: position / total_energy,
        normal: (normal / total_energy).normalize_or_zero(),
        radius: radius / total_energy,
        color: None,
    })
}

/// Oversampled estimate of the segment `from -> to` inside a cone.
///
/// `oversample > 0` jitters the segment into that many rays and averages
/// them; `oversample == 0` returns the castless dummy estimate.
pub fn estimate_angled(
    caster: &mut RayCaster<'_>,
    from: Vec3,
    to: Vec3,
    oversample: usize,
    cone_angle_deg: f32,
    opts: &EstimateOptions,
    rng: &mut u64,
) -> Option<LightSample> {
    if oversample == 0 {
        return Some(estimate_dummy(from, to, opts));
    }
    let dirs = jitter_directions(to - from, oversample, cone_angle_deg, opts.stable_fraction, rng);
    estimate_average(caster, from, &dirs, opts)
}
