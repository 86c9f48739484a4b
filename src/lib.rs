//! # ALICE-VPL
//!
//! **A.L.I.C.E. - Approximate Lighting via Indirect Candidate Estimation**
//!
//! Real-time bounce-light approximation that turns a handful of raycasts
//! per frame into a budgeted pool of virtual proxy lights (VPLs) plus an
//! ambient term, instead of tracing full global illumination.
//!
//! ## Features
//!
//! - **Sampling**: quasi-random (plastic constant) jitter with a stable /
//!   random mix, platonic-solid direction spreads for omni lights
//! - **Estimation**: single and oversampled multi-ray bounce estimates,
//!   castless dummy mode for zero-raycast operation
//! - **Per-kind processors**: spot cones, omni spreads, camera-anchored
//!   batching for directional suns with occlusion scans
//! - **Filtering**: three-stage temporal smoothing per light and slot
//! - **Budgeting**: energy-ranked selection with an energy-conserving
//!   overflow bucket, capped proxy pools that hide instead of free
//! - **Integration**: engine-agnostic traits for raycasts, render
//!   resources and the ambient environment; JSON quality presets
//!
//! ## Example
//!
//! ```rust
//! use alice_vpl::prelude::*;
//!
//! // Eight well-spread sample directions for an omni light
//! let dirs = distribute(8);
//! assert_eq!(dirs.len(), 8);
//!
//! // The quasi sequence is deterministic per index
//! assert_eq!(quasi_point(7, 1.0), quasi_point(7, 1.0));
//!
//! // A full session wraps everything in a VplSystem driven once per
//! // fixed step; see the `system` module for the loop.
//! let config = QualityPreset::Medium.config();
//! assert!(config.ray_budget(1, 2, 1) > 0);
//! ```
//!
//! ## Author
//!
//! Moroya Sakamoto

#![warn(missing_docs)]

pub mod ambient;
pub mod budget;
pub mod config;
pub mod directions;
pub mod estimator;
pub mod filter;
pub mod oracle;
pub mod pool;
pub mod processors;
pub mod sampling;
pub mod system;
pub mod table;
pub mod types;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::ambient::{aggregate_ambient, EnvironmentSink};
    pub use crate::budget::{select_vdls, select_vpls};
    pub use crate::config::{
        load_config, save_config, ConfigError, QualityPreset, VplConfig, GLOBAL_ENERGY_SCALE,
        VPL_ENERGY_FLOOR,
    };
    pub use crate::directions::{distribute, DirectionSet};
    pub use crate::estimator::{
        estimate_angled, estimate_average, estimate_dummy, estimate_single, EstimateOptions,
    };
    pub use crate::filter::FilterCascade;
    pub use crate::oracle::{RayCaster, RayHit, RayLog, RaySegment, RaycastOracle};
    pub use crate::pool::{
        InstanceHandle, LightHandle, LightParam, ProxyKind, ProxyPlacement, ProxyPool,
        RenderBackend,
    };
    pub use crate::sampling::{jitter_directions, octahedral_decode, quasi_point};
    pub use crate::system::VplSystem;
    pub use crate::table::TargetTable;
    pub use crate::types::{
        AmbientLight, CameraView, FrameStats, LightKey, LightKind, LightSample, SelectedVpl,
        SourceId, SourceLight,
    };
    pub use glam::{Quat, Vec3};
}

// Re-exports for convenience
pub use ambient::EnvironmentSink;
pub use config::{QualityPreset, VplConfig};
pub use oracle::{RayHit, RaycastOracle};
pub use pool::{InstanceHandle, LightHandle, LightParam, ProxyKind, RenderBackend};
pub use system::VplSystem;
pub use types::{CameraView, FrameStats, LightKind, SourceId, SourceLight};
