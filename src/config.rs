//! Runtime configuration, quality presets and preset files
//!
//! All tuning knobs live in one plain [`VplConfig`] struct. The struct is
//! serde-backed so presets can be saved and loaded as JSON; missing fields
//! fall back to defaults, which keeps old preset files loadable as options
//! are added.
//!
//! Live reconfiguration goes through the owning system, which defers the
//! swap to the start of the next step via its staleness flag.
//!
//! Author: Moroya Sakamoto

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed global multiplier applied to every bounce energy estimate.
pub const GLOBAL_ENERGY_SCALE: f32 = 2.0;

/// Filtered records below this energy are treated as inactive.
pub const VPL_ENERGY_FLOOR: f32 = 1e-3;

/// Errors from preset file IO.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying file IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preset file is not valid JSON for this config layout.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tuning parameters for the bounce-lighting system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VplConfig {
    /// Cap on active proxy point lights (the VPL pool capacity).
    pub max_vpls: usize,
    /// Cap on active proxy directional lights (the VDL pool capacity).
    pub max_directionals: usize,
    /// Global bounce energy scale in `[0,1]`.
    pub bounce_gain: f32,
    /// Fraction of jittered rays drawn from the stable quasi sequence.
    pub percent_stable: f32,
    /// Rays per spot/omni estimate. `0` switches to castless dummy
    /// estimates.
    pub oversample: usize,
    /// Rays per directional batch sample.
    pub oversample_dir: usize,
    /// Temporal smoothing rate in `(0,1]`; `1` disables smoothing.
    pub temporal_filter: f32,
    /// Proxy placement blend along the ray in `[0,1.1]`.
    pub placement_fraction: f32,
    /// Sample directions per spot light.
    pub vpls_per_spot: usize,
    /// Sample directions per omni light.
    pub vpls_per_omni: usize,
    /// Shared sample directions for the directional batch.
    pub directional_vpls: usize,
    /// Length of directional sample rays cast from the camera.
    pub directional_proximity: f32,
    /// Length of the occlusion scan toward a directional light.
    pub dir_scan_length: f32,
    /// Ambient term gain in `[0,1]`.
    pub ambient_gain: f32,
    /// Capture ray segments for the debug overlay.
    pub show_raycasts: bool,
    /// Run the camera-anchored batch estimator for directional lights.
    /// When this and `directional_look_sample` are both off, directionals
    /// fall back to one cheap VDL along their own axis.
    pub directional_batch: bool,
    /// Prefix the camera's view direction as an always-present batch
    /// sample.
    pub directional_look_sample: bool,
    /// Fold over-budget records into an energy-conserving overflow bucket
    /// instead of discarding them.
    pub merge_overflow: bool,
    /// Alternate spot/omni proxy kinds in the VPL pool to balance per-mesh
    /// light limits.
    pub alternate_kinds: bool,
}

impl Default for VplConfig {
    fn default() -> Self {
        Self {
            max_vpls: 8,
            max_directionals: 4,
            bounce_gain: 0.5,
            percent_stable: 0.75,
            oversample: 1,
            oversample_dir: 2,
            temporal_filter: 0.3,
            placement_fraction: 1.0,
            vpls_per_spot: 2,
            vpls_per_omni: 4,
            directional_vpls: 4,
            directional_proximity: 20.0,
            dir_scan_length: 5.0,
            ambient_gain: 0.3,
            show_raycasts: false,
            directional_batch: true,
            directional_look_sample: false,
            merge_overflow: true,
            alternate_kinds: true,
        }
    }
}

impl VplConfig {
    /// Copy with every field clamped to its documented range.
    ///
    /// The system sanitizes configs on the way in, so out-of-range values
    /// from preset files degrade to the nearest legal value instead of
    /// producing NaN energies downstream.
    pub fn sanitized(&self) -> Self {
        let mut c = *self;
        c.bounce_gain = c.bounce_gain.clamp(0.0, 1.0);
        c.percent_stable = c.percent_stable.clamp(0.0, 1.0);
        c.ambient_gain = c.ambient_gain.clamp(0.0, 1.0);
        c.temporal_filter = c.temporal_filter.clamp(1e-4, 1.0);
        c.placement_fraction = c.placement_fraction.clamp(0.0, 1.1);
        c.directional_proximity = c.directional_proximity.max(0.0);
        c.dir_scan_length = c.dir_scan_length.max(0.0);
        c
    }

    /// Upper bound on oracle queries per step for a given light mix.
    ///
    /// The step is synchronous and blocks on every cast, so hosts size
    /// their physics budget from this ceiling. The directional term counts
    /// one occlusion scan per primary ray per directional light, which
    /// over-counts whenever a primary ray misses.
    pub fn ray_budget(
        &self,
        spot_count: usize,
        omni_count: usize,
        directional_count: usize,
    ) -> usize {
        let mut total = spot_count * self.vpls_per_spot * self.oversample
            + omni_count * self.vpls_per_omni * self.oversample;
        if directional_count > 0 && (self.directional_batch || self.directional_look_sample) {
            let dirs = self.directional_vpls + usize::from(self.directional_look_sample);
            total += dirs * self.oversample_dir * (1 + directional_count);
        }
        total
    }
}

/// Named quality tiers mapping to full configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPreset {
    /// Castless dummy estimates, trivial directionals. Runs without an
    /// oracle budget at all.
    Low,
    /// The default balance.
    Medium,
    /// More samples per light and more pool slots.
    High,
    /// Maximum sampling, look-direction batching enabled.
    Ultra,
}

impl QualityPreset {
    /// The full config this tier stands for.
    pub fn config(self) -> VplConfig {
        let base = VplConfig::default();
        match self {
            QualityPreset::Low => VplConfig {
                max_vpls: 4,
                max_directionals: 2,
                oversample: 0,
                oversample_dir: 1,
                vpls_per_spot: 1,
                vpls_per_omni: 2,
                directional_vpls: 2,
                temporal_filter: 0.2,
                directional_batch: false,
                ..base
            },
            QualityPreset::Medium => base,
            QualityPreset::High => VplConfig {
                max_vpls: 16,
                oversample: 2,
                vpls_per_spot: 3,
                vpls_per_omni: 6,
                directional_vpls: 6,
                temporal_filter: 0.35,
                ..base
            },
            QualityPreset::Ultra => VplConfig {
                max_vpls: 32,
                max_directionals: 8,
                oversample: 3,
                oversample_dir: 4,
                vpls_per_spot: 4,
                vpls_per_omni: 8,
                directional_vpls: 8,
                directional_look_sample: true,
                temporal_filter: 0.4,
                ..base
            },
        }
    }
}

/// Save a config as pretty-printed JSON.
pub fn save_config(config: &VplConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, config)?;
    Ok(())
}

/// Load a config from a JSON preset file.
///
/// Fields absent from the file keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<VplConfig, ConfigError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}
