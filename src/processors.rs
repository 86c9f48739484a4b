//! Per-light sample generation
//!
//! One processor per light kind turns a real light into raw table records:
//!
//! - **Spot**: a fully-stable fan of directions inside the cone, scaled by
//!   range, one oversampled estimate per direction.
//! - **Omni**: the distributor's spread scaled by range, same estimation.
//! - **Directional**: all suns share one camera-anchored batch. Rays start
//!   at the camera (a sun has no position), and every hit accumulates the
//!   energy of each sun that faces the surface and passes an occlusion
//!   scan toward it. With batching disabled, each sun degrades to a single
//!   cheap VDL record along its own axis.
//!
//! Directions that produce no estimate zero their slot instead of removing
//! it, so the temporal filter fades lights out rather than popping them.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::config::{VplConfig, GLOBAL_ENERGY_SCALE};
use crate::directions::DirectionSet;
use crate::estimator::{estimate_angled, estimate_dummy, estimate_single, EstimateOptions};
use crate::oracle::RayCaster;
use crate::sampling::jitter_directions;
use crate::table::TargetTable;
use crate::types::{CameraView, LightKey, LightKind, LightSample, SourceLight};

/// Offset of the occlusion scan start above the hit, avoiding self-hits.
const SCAN_SURFACE_OFFSET: f32 = 0.05;

/// Total spread budget for omni sampling; per-direction cone is
/// `sqrt(14400 / count)` degrees so coverage stays roughly constant.
const OMNI_SPREAD: f32 = 14400.0;

#[inline]
fn estimate_opts(config: &VplConfig) -> EstimateOptions {
    EstimateOptions {
        placement_fraction: config.placement_fraction,
        stable_fraction: config.percent_stable,
    }
}

/// Per-sample energy gain for one light split over `count` directions.
#[inline]
fn sample_gain(light: &SourceLight, config: &VplConfig, count: usize) -> f32 {
    light.energy * light.indirect_energy * config.bounce_gain * GLOBAL_ENERGY_SCALE
        / count as f32
}

// ============================================================================
// Spot
// ============================================================================

/// Estimate bounce samples for one spot light.
pub fn process_spot(
    caster: &mut RayCaster<'_>,
    light: &SourceLight,
    config: &VplConfig,
    targets: &mut TargetTable,
    rng: &mut u64,
) {
    let key = LightKey::Source(light.id);
    let count = config.vpls_per_spot;
    if count == 0 {
        targets.truncate(key, 0);
        return;
    }

    if !light.visible {
        zero_all(targets, key, count, light.position);
        return;
    }

    // The primary fan is fully stable: spot sample positions must not
    // shimmer even with percent_stable turned down.
    let primary = jitter_directions(
        light.forward * light.range,
        count,
        light.spot_angle_deg,
        1.0,
        rng,
    );
    if primary.is_empty() {
        zero_all(targets, key, count, light.position);
        return;
    }

    let opts = estimate_opts(config);
    let cone = light.spot_angle_deg * (1.0 / count as f32).sqrt();
    let gain = sample_gain(light, config, count);

    for (index, dir) in primary.iter().enumerate() {
        let estimate = estimate_angled(
            caster,
            light.position,
            light.position + *dir,
            config.oversample,
            cone,
            &opts,
            rng,
        );
        match estimate {
            Some(mut s) => {
                s.energy *= gain;
                targets.set(key, index, s);
            }
            None => targets.zero(key, index, light.position),
        }
    }
    targets.truncate(key, count);
}

// ============================================================================
// Omni
// ============================================================================

/// Estimate bounce samples for one omni light.
pub fn process_omni(
    caster: &mut RayCaster<'_>,
    light: &SourceLight,
    config: &VplConfig,
    directions: &mut DirectionSet,
    targets: &mut TargetTable,
    rng: &mut u64,
) {
    let key = LightKey::Source(light.id);
    let count = config.vpls_per_omni;
    if count == 0 {
        targets.truncate(key, 0);
        return;
    }

    if !light.visible {
        zero_all(targets, key, count, light.position);
        return;
    }

    let opts = estimate_opts(config);
    let cone = (OMNI_SPREAD / count as f32).sqrt();
    let gain = sample_gain(light, config, count);
    let dirs = directions.get(count);

    for (index, dir) in dirs.iter().enumerate() {
        let estimate = estimate_angled(
            caster,
            light.position,
            light.position + *dir * light.range,
            config.oversample,
            cone,
            &opts,
            rng,
        );
        match estimate {
            Some(mut s) => {
                s.energy *= gain;
                targets.set(key, index, s);
            }
            None => targets.zero(key, index, light.position),
        }
    }
    targets.truncate(key, count);
}

// ============================================================================
// Directional batch
// ============================================================================

/// Estimate shared bounce samples for every directional light.
///
/// Writes averaged records under [`LightKey::DirectionalSet`]; records
/// carry an explicit color because several suns of different colors may
/// blend into one slot. With `oversample_dir == 0` the batch degrades to
/// castless dummy estimates and skips occlusion scans entirely.
pub fn process_directional_batch(
    caster: &mut RayCaster<'_>,
    lights: &[SourceLight],
    camera: &CameraView,
    config: &VplConfig,
    directions: &mut DirectionSet,
    targets: &mut TargetTable,
    rng: &mut u64,
) {
    let key = LightKey::DirectionalSet;
    let suns: Vec<&SourceLight> = lights
        .iter()
        .filter(|l| l.kind == LightKind::Directional)
        .collect();
    if suns.is_empty() {
        targets.remove(key);
        return;
    }

    // Shared base directions: optional always-present view sample, then
    // the distributor spread.
    let mut base: Vec<Vec3> = Vec::with_capacity(config.directional_vpls + 1);
    if config.directional_look_sample {
        base.push(camera.forward.normalize_or_zero());
    }
    base.extend_from_slice(directions.get(config.directional_vpls));
    if base.is_empty() {
        targets.remove(key);
        return;
    }

    let visible: Vec<&SourceLight> = suns.iter().copied().filter(|l| l.visible).collect();
    if visible.is_empty() {
        for index in 0..base.len() {
            targets.zero(key, index, camera.position);
        }
        targets.truncate(key, base.len());
        return;
    }

    let opts = estimate_opts(config);
    let cone = (OMNI_SPREAD / config.oversample_dir.max(1) as f32).sqrt();
    let divisor = base.len() as f32;

    for (index, dir) in base.iter().enumerate() {
        let scaled = *dir * config.directional_proximity;
        let fallback = camera.position + scaled * 0.5;

        let estimates: Vec<LightSample> = if config.oversample_dir == 0 {
            vec![estimate_dummy(camera.position, camera.position + scaled, &opts)]
        } else {
            jitter_directions(
                scaled,
                config.oversample_dir,
                cone,
                config.percent_stable,
                rng,
            )
            .iter()
            .filter_map(|ray| {
                estimate_single(caster, camera.position, camera.position + *ray, &opts)
            })
            .collect()
        };

        let mut total = 0.0f32;
        let mut position = Vec3::ZERO;
        let mut normal = Vec3::ZERO;
        let mut radius = 0.0f32;
        let mut color = Vec3::ZERO;

        for s in &estimates {
            for sun in &visible {
                let toward = -sun.forward.normalize_or_zero();
                if s.normal.dot(toward) <= 0.0 {
                    continue;
                }
                if config.oversample_dir > 0 && !scan_clear(caster, s.position, toward, config) {
                    continue;
                }
                let e = s.energy
                    * sun.energy
                    * sun.indirect_energy
                    * config.bounce_gain
                    * GLOBAL_ENERGY_SCALE
                    / divisor;
                total += e;
                position += s.position * e;
                normal += s.normal * e;
                radius += s.radius * e;
                color += sun.color * e;
            }
        }

        if total > 0.0 {
            targets.set(
                key,
                index,
                LightSample {
                    energy: total / config.oversample_dir.max(1) as f32,
                    position: position / total,
                    normal: (normal / total).normalize_or_zero(),
                    radius: radius / total,
                    color: Some(color / total),
                },
            );
        } else {
            targets.zero(key, index, fallback);
        }
    }
    targets.truncate(key, base.len());
}

/// True when nothing blocks the short scan from `origin` toward a sun.
fn scan_clear(caster: &mut RayCaster<'_>, origin: Vec3, toward: Vec3, config: &VplConfig) -> bool {
    let from = origin + toward * SCAN_SURFACE_OFFSET;
    let to = origin + toward * config.dir_scan_length;
    caster.cast(from, to).is_none()
}

// ============================================================================
// Directional trivial fallback
// ============================================================================

/// One cheap VDL per directional light, no raycasts.
///
/// Used when both batching and the look-direction sample are disabled. The
/// record's position field carries the sun's emit direction; the VDL pool
/// consumes it as an aim vector.
pub fn process_directional_trivial(
    lights: &[SourceLight],
    config: &VplConfig,
    vdl_targets: &mut TargetTable,
) {
    for light in lights.iter().filter(|l| l.kind == LightKind::Directional) {
        let key = LightKey::Source(light.id);
        if !light.visible {
            vdl_targets.zero(key, 0, light.forward);
            vdl_targets.truncate(key, 1);
            continue;
        }
        let energy = light.energy
            * light.indirect_energy
            * config.bounce_gain
            * GLOBAL_ENERGY_SCALE;
        vdl_targets.set(
            key,
            0,
            LightSample {
                energy,
                position: light.forward,
                normal: -light.forward.normalize_or_zero(),
                radius: 0.0,
                color: None,
            },
        );
        vdl_targets.truncate(key, 1);
    }
}

fn zero_all(targets: &mut TargetTable, key: LightKey, count: usize, fallback: Vec3) {
    for index in 0..count {
        targets.zero(key, index, fallback);
    }
    targets.truncate(key, count);
}
