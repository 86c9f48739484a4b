//! Core value types for the bounce-lighting pipeline
//!
//! Everything here is a small plain-data struct or closed enum: the host's
//! description of its real lights ([`SourceLight`]), the per-ray estimate
//! record ([`LightSample`]), the table key ([`LightKey`]), and the final
//! outputs handed to the render backend ([`SelectedVpl`], [`AmbientLight`]).
//!
//! Sample records use fixed named fields rather than keyed maps so the
//! temporal filter can iterate fields statically.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

// ============================================================================
// Source lights
// ============================================================================

/// Host-assigned stable identifier for a real light.
///
/// Ids survive across frames; the system prunes table and filter state for
/// ids that disappear from the submitted light list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Closed set of real-light kinds the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Cone-constrained emitter; samples jitter inside the cone.
    Spot,
    /// Point emitter; samples use the omni direction distributor.
    Omni,
    /// Infinitely-distant emitter; sampled from the camera, not the light.
    Directional,
}

/// A real light as described by the host each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceLight {
    /// Stable identity, used as the table key.
    pub id: SourceId,
    /// Which processor handles this light.
    pub kind: LightKind,
    /// World-space origin (unused for `Directional`).
    pub position: Vec3,
    /// Direction the light emits along. For spots this is the cone axis,
    /// for directionals the travel direction of the light.
    pub forward: Vec3,
    /// Host-side brightness.
    pub energy: f32,
    /// Per-light multiplier on bounced energy.
    pub indirect_energy: f32,
    /// Reach of the light; scales sample ray length (unused for
    /// `Directional`).
    pub range: f32,
    /// Full cone angle in degrees (spots only).
    pub spot_angle_deg: f32,
    /// Linear RGB tint carried through to the proxy lights.
    pub color: Vec3,
    /// Invisible lights keep their table slots but contribute zero energy.
    pub visible: bool,
}

impl Default for SourceLight {
    fn default() -> Self {
        Self {
            id: SourceId(0),
            kind: LightKind::Omni,
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            energy: 1.0,
            indirect_energy: 1.0,
            range: 10.0,
            spot_angle_deg: 45.0,
            color: Vec3::ONE,
            visible: true,
        }
    }
}

impl SourceLight {
    /// Spot light at `position` aiming along `forward`.
    pub fn spot(id: u64, position: Vec3, forward: Vec3, angle_deg: f32, range: f32) -> Self {
        Self {
            id: SourceId(id),
            kind: LightKind::Spot,
            position,
            forward,
            spot_angle_deg: angle_deg,
            range,
            ..Self::default()
        }
    }

    /// Omni light at `position` reaching `range` units.
    pub fn omni(id: u64, position: Vec3, range: f32) -> Self {
        Self {
            id: SourceId(id),
            kind: LightKind::Omni,
            position,
            range,
            ..Self::default()
        }
    }

    /// Directional light emitting along `forward`.
    pub fn directional(id: u64, forward: Vec3) -> Self {
        Self {
            id: SourceId(id),
            kind: LightKind::Directional,
            forward,
            ..Self::default()
        }
    }
}

/// Camera pose for the frame, required by the directional batch processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// World-space eye position; directional sample rays start here.
    pub position: Vec3,
    /// View direction, optionally injected as an always-present sample.
    pub forward: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
        }
    }
}

// ============================================================================
// Table keys and sample records
// ============================================================================

/// Key addressing a slot group in the target table.
///
/// Directional lights share one global budget and are accumulated under a
/// single bucket key instead of per-light entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightKey {
    /// Samples estimated for one real light.
    Source(SourceId),
    /// The shared accumulation bucket for all directional lights.
    DirectionalSet,
}

/// One estimated bounce sample.
///
/// `color` is absent for samples that inherit their source light's color at
/// selection time; the directional batch sets it explicitly because several
/// lights of different colors blend into one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Bounce energy, already modulated by the source light's gain factors.
    pub energy: f32,
    /// World-space placement for the proxy light.
    pub position: Vec3,
    /// Surface normal at the estimated bounce point.
    pub normal: Vec3,
    /// Proxy light range.
    pub radius: f32,
    /// Explicit tint, if the estimate blended multiple sources.
    pub color: Option<Vec3>,
}

impl LightSample {
    /// A zero-energy record that keeps a table slot alive.
    ///
    /// Written when a direction produced no valid estimate, so the temporal
    /// filter fades the slot out instead of seeing it vanish.
    pub fn extinguished(position: Vec3) -> Self {
        Self {
            energy: 0.0,
            position,
            normal: Vec3::Y,
            radius: 0.0,
            color: None,
        }
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// A filtered, budget-selected sample ready to drive a proxy point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedVpl {
    /// World-space placement.
    pub position: Vec3,
    /// Orientation for the proxy (spot proxies aim along the normal).
    pub normal: Vec3,
    /// Proxy light range.
    pub radius: f32,
    /// Final energy after filtering and any overflow merging.
    pub energy: f32,
    /// Resolved tint (source light color, or white when unknown).
    pub color: Vec3,
}

/// Flat ambient term derived from the active VPL set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Proximity-weighted average VPL color.
    pub color: Vec3,
    /// Proximity-weighted energy near the camera.
    pub energy: f32,
}

impl AmbientLight {
    /// The no-contribution ambient value.
    pub const OFF: Self = Self {
        color: Vec3::ZERO,
        energy: 0.0,
    };
}

/// Per-frame counters for diagnostics overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Rays issued to the oracle this frame.
    pub rays_cast: u32,
    /// Real lights that ran a processor this frame.
    pub lights_processed: usize,
    /// Proxy point lights active after selection.
    pub active_vpls: usize,
    /// Proxy directional lights active after selection.
    pub active_vdls: usize,
    /// Raw sample records currently held in the target table.
    pub table_entries: usize,
    /// Ambient energy pushed to the environment sink.
    pub ambient_energy: f32,
}
