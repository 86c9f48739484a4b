//! Three-stage temporal smoothing of raw sample tables
//!
//! Raw per-frame estimates are noisy even with quasi-random sampling, and a
//! single exponential smoother either lags badly or still flickers. The
//! cascade runs three smoothing stages in reverse order each step:
//!
//! ```text
//! stage3 = lerp(stage3, raw,    alpha)
//! stage2 = lerp(stage2, stage3, alpha)
//! stage1 = lerp(stage1, stage2, alpha)
//! ```
//!
//! Stage 1 is the externally consumed value. New slots are seeded with the
//! raw value in all stages so a light popping on has no warm-up transient,
//! and slots whose key or index disappeared from the raw table are pruned.
//! An invalidation flag drops all history wholesale on the next update.
//!
//! Author: Moroya Sakamoto

use crate::table::TargetTable;
use crate::types::{LightKey, LightSample};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Blend every smoothed field toward the target; color is carried through
/// unblended since it is either absent or already an averaged value.
fn lerp_sample(prev: &LightSample, target: &LightSample, alpha: f32) -> LightSample {
    LightSample {
        energy: lerp(prev.energy, target.energy, alpha),
        position: prev.position.lerp(target.position, alpha),
        normal: prev.normal.lerp(target.normal, alpha),
        radius: lerp(prev.radius, target.radius, alpha),
        color: target.color,
    }
}

/// Cascaded exponential smoothing over a [`TargetTable`].
#[derive(Debug, Clone, Default)]
pub struct FilterCascade {
    stage1: TargetTable,
    stage2: TargetTable,
    stage3: TargetTable,
    stale: bool,
}

impl FilterCascade {
    /// Create an empty cascade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all history on the next [`update`](Self::update).
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Whether history is pending invalidation.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Clear all stages immediately.
    pub fn reset(&mut self) {
        self.stage1.clear();
        self.stage2.clear();
        self.stage3.clear();
        self.stale = false;
    }

    /// Advance every stage one step toward `raw`.
    ///
    /// `alpha` is the smoothing rate in `(0,1]`: `1` copies raw through
    /// instantly, smaller values react slower. Keys and indices absent from
    /// `raw` are pruned from all stages first.
    pub fn update(&mut self, raw: &TargetTable, alpha: f32) {
        if self.stale {
            self.reset();
        }
        self.prune_to(raw);

        for (key, slots) in raw.iter() {
            for (index, target) in slots.iter().enumerate() {
                let s3 = match self.stage3.slot(key, index) {
                    Some(prev) => lerp_sample(prev, target, alpha),
                    None => *target,
                };
                self.stage3.set(key, index, s3);

                let s2 = match self.stage2.slot(key, index) {
                    Some(prev) => lerp_sample(prev, &s3, alpha),
                    None => *target,
                };
                self.stage2.set(key, index, s2);

                let s1 = match self.stage1.slot(key, index) {
                    Some(prev) => lerp_sample(prev, &s2, alpha),
                    None => *target,
                };
                self.stage1.set(key, index, s1);
            }
        }
    }

    /// The smoothed table consumers read (stage 1).
    pub fn current(&self) -> &TargetTable {
        &self.stage1
    }

    /// Drop stage entries whose key or index no longer exists in `raw`.
    fn prune_to(&mut self, raw: &TargetTable) {
        let lens: Vec<(LightKey, usize)> =
            raw.iter().map(|(k, slots)| (k, slots.len())).collect();
        for stage in [&mut self.stage1, &mut self.stage2, &mut self.stage3] {
            stage.retain(|k| raw.get(*k).is_some());
            for (key, len) in &lens {
                stage.truncate(*key, *len);
            }
        }
    }
}
