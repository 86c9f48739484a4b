//! Proxy light pools over an abstract render backend
//!
//! The renderer side of the pipeline is a handle API: the host implements
//! [`RenderBackend`] against its engine (visual instances plus light
//! resources), and [`ProxyPool`] owns a fixed-capacity array of handle
//! pairs per proxy class.
//!
//! Pools avoid churn aggressively: per-frame deactivation hides handles
//! instead of freeing them, and resizing allocates or releases only the
//! delta. The VPL pool can alternate spot and omni proxy kinds, since some
//! renderers cap how many lights of one kind may touch a mesh; a spot with
//! a 180 degree cone is close enough to an omni for bounce light.
//!
//! Author: Moroya Sakamoto

use glam::{Quat, Vec3};

// ============================================================================
// Backend interface
// ============================================================================

/// Opaque handle to a host-side visual instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub u64);

/// Opaque handle to a host-side light resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle(pub u64);

/// Proxy light kinds the pool can allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// Cone light; pooled with a 180 degree angle as an omni stand-in.
    Spot,
    /// Point light.
    Omni,
    /// Sun-style light, used by the VDL pool.
    Directional,
}

/// Scalar light parameters settable through the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightParam {
    /// Brightness.
    Energy,
    /// Influence distance.
    Range,
    /// Specular contribution. Proxies force this to zero, bounce light has
    /// no meaningful highlight.
    Specular,
    /// Cone angle in degrees (spot kind only).
    SpotAngle,
}

/// Rendering resource collaborator implemented by the host.
///
/// The pipeline only ever writes through this interface; it never reads
/// renderer state back.
pub trait RenderBackend {
    /// Allocate a visual instance.
    fn create_instance(&mut self) -> InstanceHandle;
    /// Allocate a light resource of the given kind.
    fn create_light(&mut self, kind: ProxyKind) -> LightHandle;
    /// Attach a light resource to an instance.
    fn set_base(&mut self, instance: InstanceHandle, light: LightHandle);
    /// Place and orient an instance in world space.
    fn set_transform(&mut self, instance: InstanceHandle, position: Vec3, rotation: Quat);
    /// Show or hide an instance.
    fn set_visible(&mut self, instance: InstanceHandle, visible: bool);
    /// Set a light's color.
    fn set_color(&mut self, light: LightHandle, color: Vec3);
    /// Set a scalar light parameter.
    fn set_param(&mut self, light: LightHandle, param: LightParam, value: f32);
    /// Release a visual instance.
    fn free_instance(&mut self, instance: InstanceHandle);
    /// Release a light resource.
    fn free_light(&mut self, light: LightHandle);
}

// ============================================================================
// Pool
// ============================================================================

/// Where a configured proxy goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProxyPlacement {
    /// Point proxy at a position, aimed along a surface normal.
    Point {
        /// World-space position.
        position: Vec3,
        /// Aim direction for spot-kind proxies.
        normal: Vec3,
    },
    /// Directional proxy emitting along a world direction.
    Direction(Vec3),
}

#[derive(Debug, Clone, Copy)]
struct ProxySlot {
    instance: InstanceHandle,
    light: LightHandle,
    kind: ProxyKind,
}

/// Which proxy class a pool serves; decides the allocated light kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolClass {
    Vpl { alternate: bool },
    Vdl,
}

/// Fixed-capacity pool of instance/light handle pairs.
#[derive(Debug)]
pub struct ProxyPool {
    class: PoolClass,
    max: usize,
    slots: Vec<ProxySlot>,
}

impl ProxyPool {
    /// Pool for point-like bounce proxies, optionally alternating
    /// spot/omni kinds.
    pub fn vpl(max: usize, alternate: bool) -> Self {
        Self {
            class: PoolClass::Vpl { alternate },
            max,
            slots: Vec::new(),
        }
    }

    /// Pool for directional proxies.
    pub fn vdl(max: usize) -> Self {
        Self {
            class: PoolClass::Vdl,
            max,
            slots: Vec::new(),
        }
    }

    /// Currently allocated slot count.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slot is allocated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Configured capacity; resize requests clamp to this.
    pub fn capacity(&self) -> usize {
        self.max
    }

    /// Light kind allocated for a slot, if it exists.
    pub fn kind_of(&self, index: usize) -> Option<ProxyKind> {
        self.slots.get(index).map(|s| s.kind)
    }

    /// Change capacity, releasing slots beyond the new maximum.
    pub fn set_capacity(&mut self, backend: &mut dyn RenderBackend, max: usize) {
        self.max = max;
        if self.slots.len() > max {
            self.shrink_to(backend, max);
        }
    }

    /// Grow or shrink to `n` slots, clamped to capacity.
    ///
    /// Only the delta is allocated or released. New slots start hidden with
    /// zero specular; new spot slots get a 180 degree cone.
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, n: usize) {
        let n = n.min(self.max);
        if n < self.slots.len() {
            self.shrink_to(backend, n);
            return;
        }
        for index in self.slots.len()..n {
            let kind = self.kind_for(index);
            let instance = backend.create_instance();
            let light = backend.create_light(kind);
            backend.set_base(instance, light);
            backend.set_visible(instance, false);
            backend.set_param(light, LightParam::Specular, 0.0);
            if kind == ProxyKind::Spot {
                backend.set_param(light, LightParam::SpotAngle, 180.0);
            }
            self.slots.push(ProxySlot {
                instance,
                light,
                kind,
            });
        }
    }

    /// Point a slot at a placement and make it visible.
    ///
    /// Indices beyond the allocated range are ignored; the budget selector
    /// already capped the list, so this only happens on host misuse.
    pub fn configure(
        &mut self,
        backend: &mut dyn RenderBackend,
        index: usize,
        placement: ProxyPlacement,
        color: Vec3,
        energy: f32,
        radius: f32,
    ) {
        let Some(slot) = self.slots.get(index) else {
            return;
        };

        let (position, rotation) = match placement {
            ProxyPlacement::Point { position, normal } => {
                (position, aim_rotation(normal))
            }
            ProxyPlacement::Direction(dir) => (Vec3::ZERO, aim_rotation(dir)),
        };

        backend.set_transform(slot.instance, position, rotation);
        backend.set_color(slot.light, color);
        backend.set_param(slot.light, LightParam::Energy, energy);
        if slot.kind != ProxyKind::Directional {
            backend.set_param(slot.light, LightParam::Range, radius);
        }
        backend.set_visible(slot.instance, true);
    }

    /// Hide every slot at or beyond `count` without releasing it.
    ///
    /// Called once per frame after the active count is known, bridging this
    /// frame's usage and last frame's.
    pub fn deactivate_from(&mut self, backend: &mut dyn RenderBackend, count: usize) {
        for slot in self.slots.iter().skip(count) {
            backend.set_visible(slot.instance, false);
        }
    }

    /// Release every handle and empty the pool.
    pub fn release_all(&mut self, backend: &mut dyn RenderBackend) {
        self.shrink_to(backend, 0);
    }

    fn shrink_to(&mut self, backend: &mut dyn RenderBackend, n: usize) {
        while self.slots.len() > n {
            if let Some(slot) = self.slots.pop() {
                backend.free_instance(slot.instance);
                backend.free_light(slot.light);
            }
        }
    }

    fn kind_for(&self, index: usize) -> ProxyKind {
        match self.class {
            PoolClass::Vpl { alternate: true } => {
                if index % 2 == 0 {
                    ProxyKind::Spot
                } else {
                    ProxyKind::Omni
                }
            }
            PoolClass::Vpl { alternate: false } => ProxyKind::Omni,
            PoolClass::Vdl => ProxyKind::Directional,
        }
    }
}

/// Rotation aiming the light's forward (`-Z`) axis along `dir`.
fn aim_rotation(dir: Vec3) -> Quat {
    let dir = dir.normalize_or_zero();
    if dir == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::NEG_Z, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockBackend {
        next: u64,
        created_lights: Vec<ProxyKind>,
        created_instances: usize,
        visible: HashMap<u64, bool>,
        transforms: HashMap<u64, (Vec3, Quat)>,
        colors: HashMap<u64, Vec3>,
        params: HashMap<(u64, LightParam), f32>,
        freed_instances: usize,
        freed_lights: usize,
    }

    impl MockBackend {
        fn alloc(&mut self) -> u64 {
            self.next += 1;
            self.next
        }
    }

    impl RenderBackend for MockBackend {
        fn create_instance(&mut self) -> InstanceHandle {
            self.created_instances += 1;
            InstanceHandle(self.alloc())
        }
        fn create_light(&mut self, kind: ProxyKind) -> LightHandle {
            self.created_lights.push(kind);
            LightHandle(self.alloc())
        }
        fn set_base(&mut self, _instance: InstanceHandle, _light: LightHandle) {}
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
        fn free_instance(&mut self, _instance: InstanceHandle) {
            self.freed_instances += 1;
        }
        fn free_light(&mut self, _light: LightHandle) {
            self.freed_lights += 1;
        }
    }

    #[test]
    fn test_resize_alternates_kinds() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(8, true);
        pool.resize(&mut backend, 4);

        assert_eq!(pool.len(), 4);
        assert_eq!(
            backend.created_lights,
            vec![ProxyKind::Spot, ProxyKind::Omni, ProxyKind::Spot, ProxyKind::Omni]
        );
    }

    #[test]
    fn test_resize_without_alternation_is_all_omni() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(8, false);
        pool.resize(&mut backend, 3);
        assert!(backend.created_lights.iter().all(|k| *k == ProxyKind::Omni));
    }

    #[test]
    fn test_new_slots_start_hidden_with_zero_specular() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(8, true);
        pool.resize(&mut backend, 2);

        for slot in &pool.slots {
            assert_eq!(backend.visible.get(&slot.instance.0), Some(&false));
            assert_eq!(
                backend.params.get(&(slot.light.0, LightParam::Specular)),
                Some(&0.0)
            );
        }
        // Slot 0 is spot-kind and approximates an omni via a full cone.
        let spot = pool.slots[0].light.0;
        assert_eq!(backend.params.get(&(spot, LightParam::SpotAngle)), Some(&180.0));
    }

    #[test]
    fn test_resize_clamps_to_capacity() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(3, true);
        pool.resize(&mut backend, 10);
        assert_eq!(pool.len(), 3, "requests beyond capacity clamp silently");
    }

    #[test]
    fn test_resize_touches_only_the_delta() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(16, true);
        pool.resize(&mut backend, 4);
        assert_eq!(backend.created_instances, 4);

        pool.resize(&mut backend, 6);
        assert_eq!(backend.created_instances, 6, "growth must only allocate the delta");
        assert_eq!(backend.freed_instances, 0);

        pool.resize(&mut backend, 2);
        assert_eq!(backend.freed_instances, 4);
        assert_eq!(backend.freed_lights, 4);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_configure_point_sets_everything() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(4, false);
        pool.resize(&mut backend, 1);

        pool.configure(
            &mut backend,
            0,
            ProxyPlacement::Point {
                position: Vec3::new(1.0, 2.0, 3.0),
                normal: Vec3::Y,
            },
            Vec3::new(1.0, 0.5, 0.0),
            2.5,
            7.0,
        );

        let slot = pool.slots[0];
        assert_eq!(backend.visible.get(&slot.instance.0), Some(&true));
        let (pos, rot) = backend.transforms[&slot.instance.0];
        assert_eq!(pos, Vec3::new(1.0, 2.0, 3.0));
        assert!((rot * Vec3::NEG_Z - Vec3::Y).length() < 1e-5, "aimed along the normal");
        assert_eq!(backend.colors.get(&slot.light.0), Some(&Vec3::new(1.0, 0.5, 0.0)));
        assert_eq!(backend.params.get(&(slot.light.0, LightParam::Energy)), Some(&2.5));
        assert_eq!(backend.params.get(&(slot.light.0, LightParam::Range)), Some(&7.0));
    }

    #[test]
    fn test_configure_direction_aims_and_skips_range() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vdl(4);
        pool.resize(&mut backend, 1);

        let dir = Vec3::new(0.0, -1.0, 0.0);
        pool.configure(
            &mut backend,
            0,
            ProxyPlacement::Direction(dir),
            Vec3::ONE,
            1.0,
            99.0,
        );

        let slot = pool.slots[0];
        let (_, rot) = backend.transforms[&slot.instance.0];
        assert!((rot * Vec3::NEG_Z - dir).length() < 1e-5);
        assert!(
            !backend.params.contains_key(&(slot.light.0, LightParam::Range)),
            "range is meaningless for a directional proxy"
        );
    }

    #[test]
    fn test_configure_out_of_range_is_ignored() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(2, false);
        pool.resize(&mut backend, 1);
        pool.configure(
            &mut backend,
            5,
            ProxyPlacement::Direction(Vec3::X),
            Vec3::ONE,
            1.0,
            1.0,
        );
        assert_eq!(backend.transforms.len(), 0);
    }

    #[test]
    fn test_deactivate_from_hides_tail_only() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(8, false);
        pool.resize(&mut backend, 4);
        for i in 0..4 {
            pool.configure(
                &mut backend,
                i,
                ProxyPlacement::Point {
                    position: Vec3::X,
                    normal: Vec3::Y,
                },
                Vec3::ONE,
                1.0,
                1.0,
            );
        }

        pool.deactivate_from(&mut backend, 2);
        assert_eq!(backend.visible.get(&pool.slots[0].instance.0), Some(&true));
        assert_eq!(backend.visible.get(&pool.slots[1].instance.0), Some(&true));
        assert_eq!(backend.visible.get(&pool.slots[2].instance.0), Some(&false));
        assert_eq!(backend.visible.get(&pool.slots[3].instance.0), Some(&false));
        assert_eq!(pool.len(), 4, "deactivation must not release slots");
    }

    #[test]
    fn test_release_all_frees_everything() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vdl(4);
        pool.resize(&mut backend, 3);
        pool.release_all(&mut backend);
        assert_eq!(pool.len(), 0);
        assert_eq!(backend.freed_instances, 3);
        assert_eq!(backend.freed_lights, 3);
    }

    #[test]
    fn test_set_capacity_shrinks_excess() {
        let mut backend = MockBackend::default();
        let mut pool = ProxyPool::vpl(8, false);
        pool.resize(&mut backend, 6);
        pool.set_capacity(&mut backend, 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.capacity(), 2);
    }
}
