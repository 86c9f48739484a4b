//! Ambient term derived from the active VPL set
//!
//! Proxy lights only reach so far; a scene lit by a handful of VPLs still
//! reads as pitch black outside their radii. The aggregator folds every
//! VPL the camera currently sits inside into one flat ambient color and
//! energy, which the host feeds to its environment (sky/world) settings
//! through [`EnvironmentSink`].
//!
//! Weighting is `energy * sqrt(1 - distance/radius)`: full weight at the
//! VPL's center, zero at its edge.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::types::{AmbientLight, SelectedVpl};

/// Environment/ambient collaborator implemented by the host.
///
/// How the pair maps onto the engine (ambient source mode, sky blend) is
/// the host's business; the pipeline only produces the values.
pub trait EnvironmentSink {
    /// Apply the frame's ambient color and energy.
    fn set_ambient(&mut self, color: Vec3, energy: f32);
}

/// Blend the VPLs surrounding the camera into one ambient term.
///
/// A VPL contributes only while the camera is strictly inside its radius.
/// Returns [`AmbientLight::OFF`] when nothing contributes, guarding the
/// division by total weight.
pub fn aggregate_ambient(vpls: &[SelectedVpl], camera_position: Vec3, gain: f32) -> AmbientLight {
    let mut total = 0.0f32;
    let mut color = Vec3::ZERO;

    for vpl in vpls {
        if vpl.radius <= 0.0 {
            continue;
        }
        let distance = (vpl.position - camera_position).length();
        if distance >= vpl.radius {
            continue;
        }
        let weight = vpl.energy * (1.0 - distance / vpl.radius).sqrt();
        total += weight;
        color += vpl.color * weight;
    }

    if total <= 0.0 {
        return AmbientLight::OFF;
    }

    AmbientLight {
        color: color / total,
        energy: total * gain,
    }
}
