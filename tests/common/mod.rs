//! Common test helpers for ALICE-VPL integration tests
//!
//! Author: Moroya Sakamoto

use std::collections::HashMap;

use alice_vpl::prelude::*;

// ============================================================================
// Scene oracles
// ============================================================================

/// Infinite horizontal floor facing up. `height` is public so tests can
/// move the floor between steps and watch the temporal filter chase it.
pub struct FloorOracle {
    pub height: f32,
}

impl FloorOracle {
    pub fn at(height: f32) -> Self {
        Self { height }
    }
}

impl RaycastOracle for FloorOracle {
    fn query(&mut self, from: Vec3, to: Vec3) -> Option<RayHit> {
        let dy = to.y - from.y;
        if dy.abs() < f32::EPSILON {
            return None;
        }
        let t = (self.height - from.y) / dy;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(RayHit {
            position: from.lerp(to, t),
            normal: Vec3::Y,
        })
    }
}

/// Empty scene; every ray misses.
#[allow(dead_code)]
pub struct EmptyOracle;

impl RaycastOracle for EmptyOracle {
    fn query(&mut self, _from: Vec3, _to: Vec3) -> Option<RayHit> {
        None
    }
}

// ============================================================================
// Recording render backend
// ============================================================================

/// Backend modeling just enough renderer state to assert against: live
/// handles, instance/light pairing, visibility, transforms, colors and
/// scalar parameters.
#[derive(Default)]
pub struct RecordingBackend {
    next: u64,
    pub live_instances: Vec<u64>,
    pub live_lights: Vec<u64>,
    pub light_kinds: HashMap<u64, ProxyKind>,
    pub bases: HashMap<u64, u64>,
    pub visible: HashMap<u64, bool>,
    pub transforms: HashMap<u64, (Vec3, Quat)>,
    pub colors: HashMap<u64, Vec3>,
    pub params: HashMap<(u64, LightParam), f32>,
    pub freed_instances: usize,
    pub freed_lights: usize,
}

impl RecordingBackend {
    fn alloc(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    /// Number of currently visible instances.
    pub fn visible_count(&self) -> usize {
        self.visible.values().filter(|v| **v).count()
    }

    /// Allocation order of live light kinds.
    #[allow(dead_code)]
    pub fn kind_sequence(&self) -> Vec<ProxyKind> {
        self.live_lights
            .iter()
            .filter_map(|h| self.light_kinds.get(h).copied())
            .collect()
    }

    /// A scalar parameter of every light whose instance is visible.
    pub fn visible_params(&self, param: LightParam) -> Vec<f32> {
        self.live_instances
            .iter()
            .filter(|i| self.visible.get(*i) == Some(&true))
            .filter_map(|i| self.bases.get(i))
            .filter_map(|l| self.params.get(&(*l, param)).copied())
            .collect()
    }

    /// Energy parameters of lights whose instance is currently visible.
    pub fn visible_energies(&self) -> Vec<f32> {
        self.visible_params(LightParam::Energy)
    }

    /// Positions of currently visible instances.
    #[allow(dead_code)]
    pub fn visible_positions(&self) -> Vec<Vec3> {
        self.live_instances
            .iter()
            .filter(|i| self.visible.get(*i) == Some(&true))
            .filter_map(|i| self.transforms.get(i).map(|(p, _)| *p))
            .collect()
    }

    /// Aim directions (rotated `-Z`) of currently visible instances.
    #[allow(dead_code)]
    pub fn visible_aims(&self) -> Vec<Vec3> {
        self.live_instances
            .iter()
            .filter(|i| self.visible.get(*i) == Some(&true))
            .filter_map(|i| self.transforms.get(i).map(|(_, r)| *r * Vec3::NEG_Z))
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_instance(&mut self) -> InstanceHandle {
        let h = self.alloc();
        self.live_instances.push(h);
        InstanceHandle(h)
    }

    fn create_light(&mut self, kind: ProxyKind) -> LightHandle {
        let h = self.alloc();
        self.live_lights.push(h);
        self.light_kinds.insert(h, kind);
        LightHandle(h)
    }

    fn set_base(&mut self, instance: InstanceHandle, light: LightHandle) {
        self.bases.insert(instance.0, light.0);
    }

    fn set_transform(&mut self, instance: InstanceHandle, position: Vec3, rotation: Quat) {
        self.transforms.insert(instance.0, (position, rotation));
    }

    fn set_visible(&mut self, instance: InstanceHandle, visible: bool) {
        self.visible.insert(instance.0, visible);
    }

    fn set_color(&mut self, light: LightHandle, color: Vec3) {
        self.colors.insert(light.0, color);
    }

    fn set_param(&mut self, light: LightHandle, param: LightParam, value: f32) {
        self.params.insert((light.0, param), value);
    }

    fn free_instance(&mut self, instance: InstanceHandle) {
        self.live_instances.retain(|h| *h != instance.0);
        self.visible.remove(&instance.0);
        self.bases.remove(&instance.0);
        self.freed_instances += 1;
    }

    fn free_light(&mut self, light: LightHandle) {
        self.live_lights.retain(|h| *h != light.0);
        self.freed_lights += 1;
    }
}

// ============================================================================
// Recording environment sink
// ============================================================================

/// Environment sink recording every ambient write.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingEnv {
    pub writes: Vec<(Vec3, f32)>,
}

impl RecordingEnv {
    #[allow(dead_code)]
    pub fn last(&self) -> Option<(Vec3, f32)> {
        self.writes.last().copied()
    }
}

impl EnvironmentSink for RecordingEnv {
    fn set_ambient(&mut self, color: Vec3, energy: f32) {
        self.writes.push((color, energy));
    }
}

// ============================================================================
// Light builders
// ============================================================================

/// Omni light hovering in the scene.
pub fn omni_light(id: u64, position: Vec3, range: f32) -> SourceLight {
    SourceLight::omni(id, position, range)
}

/// Spot light aimed along `forward`, with a narrow 30 degree cone.
#[allow(dead_code)]
pub fn spot_light(id: u64, position: Vec3, forward: Vec3) -> SourceLight {
    SourceLight::spot(id, position, forward, 30.0, 4.0)
}

/// Directional light emitting along `forward`.
pub fn sun_light(id: u64, forward: Vec3) -> SourceLight {
    SourceLight::directional(id, forward)
}

/// Config with all randomness and smoothing removed, so every step is
/// exactly reproducible and raw estimates pass straight through.
pub fn deterministic_config() -> VplConfig {
    VplConfig {
        percent_stable: 1.0,
        temporal_filter: 1.0,
        oversample: 1,
        oversample_dir: 1,
        ..VplConfig::default()
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert two f32 values are close within tolerance.
#[allow(dead_code)]
pub fn assert_close(a: f32, b: f32, tol: f32, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        (a - b).abs(),
        tol
    );
}
