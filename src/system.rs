//! The owning bounce-lighting context and its per-step pipeline
//!
//! [`VplSystem`] holds every piece of session state: the light snapshot,
//! raw and filtered sample tables, direction caches, both proxy pools, the
//! ray log and the rng. One [`step`](VplSystem::step) call runs the full
//! pipeline synchronously:
//!
//! ```text
//! processors -> raw tables -> temporal filter -> budget selector
//!            -> proxy pools (render backend) + ambient (environment sink)
//! ```
//!
//! Reconfiguration and external invalidation are deferred through a
//! staleness flag consumed at the start of the next step, so no step ever
//! observes half-updated filter history.
//!
//! # Usage
//!
//! ```no_run
//! use alice_vpl::{CameraView, SourceLight, VplConfig, VplSystem};
//! # struct Phys; impl alice_vpl::RaycastOracle for Phys {
//! #     fn query(&mut self, _: glam::Vec3, _: glam::Vec3) -> Option<alice_vpl::RayHit> { None }
//! # }
//! # struct Gfx; impl alice_vpl::RenderBackend for Gfx {
//! #     fn create_instance(&mut self) -> alice_vpl::InstanceHandle { alice_vpl::InstanceHandle(0) }
//! #     fn create_light(&mut self, _: alice_vpl::ProxyKind) -> alice_vpl::LightHandle { alice_vpl::LightHandle(0) }
//! #     fn set_base(&mut self, _: alice_vpl::InstanceHandle, _: alice_vpl::LightHandle) {}
//! #     fn set_transform(&mut self, _: alice_vpl::InstanceHandle, _: glam::Vec3, _: glam::Quat) {}
//! #     fn set_visible(&mut self, _: alice_vpl::InstanceHandle, _: bool) {}
//! #     fn set_color(&mut self, _: alice_vpl::LightHandle, _: glam::Vec3) {}
//! #     fn set_param(&mut self, _: alice_vpl::LightHandle, _: alice_vpl::LightParam, _: f32) {}
//! #     fn free_instance(&mut self, _: alice_vpl::InstanceHandle) {}
//! #     fn free_light(&mut self, _: alice_vpl::LightHandle) {}
//! # }
//! # let (mut phys, mut gfx) = (Phys, Gfx);
//! let mut system = VplSystem::new(VplConfig::default(), &mut gfx);
//! system.set_lights(&[SourceLight::default()]);
//! loop {
//!     let stats = system.step(&mut phys, &mut gfx, &CameraView::default(), None);
//!     let _ = stats.active_vpls;
//!     # break;
//! }
//! system.teardown(&mut gfx);
//! ```
//!
//! Author: Moroya Sakamoto

use std::collections::HashSet;

use glam::Vec3;

use crate::ambient::{aggregate_ambient, EnvironmentSink};
use crate::budget::{select_vdls, select_vpls};
use crate::config::VplConfig;
use crate::directions::DirectionSet;
use crate::filter::FilterCascade;
use crate::oracle::{RayCaster, RayLog, RaycastOracle};
use crate::pool::{ProxyPlacement, ProxyPool, RenderBackend};
use crate::processors::{
    process_directional_batch, process_directional_trivial, process_omni, process_spot,
};
use crate::table::TargetTable;
use crate::types::{CameraView, FrameStats, LightKey, LightKind, SourceId, SourceLight};

/// Default rng seed; any fixed odd constant works for the LCG.
const DEFAULT_SEED: u64 = 0x9E3779B97F4A7C15;

/// Owning context for the whole bounce-lighting session.
pub struct VplSystem {
    config: VplConfig,
    pending_config: Option<VplConfig>,
    lights: Vec<SourceLight>,
    targets: TargetTable,
    vdl_targets: TargetTable,
    filter: FilterCascade,
    vdl_filter: FilterCascade,
    omni_directions: DirectionSet,
    batch_directions: DirectionSet,
    vpl_pool: ProxyPool,
    vdl_pool: ProxyPool,
    ray_log: RayLog,
    stats: FrameStats,
    rng: u64,
    stale: bool,
}

impl VplSystem {
    /// Create a system and allocate both pools at configured capacity.
    pub fn new(config: VplConfig, backend: &mut dyn RenderBackend) -> Self {
        let config = config.sanitized();
        let mut vpl_pool = ProxyPool::vpl(config.max_vpls, config.alternate_kinds);
        let mut vdl_pool = ProxyPool::vdl(config.max_directionals);
        vpl_pool.resize(backend, config.max_vpls);
        vdl_pool.resize(backend, config.max_directionals);

        Self {
            ray_log: RayLog::new(config.show_raycasts),
            config,
            pending_config: None,
            lights: Vec::new(),
            targets: TargetTable::new(),
            vdl_targets: TargetTable::new(),
            filter: FilterCascade::new(),
            vdl_filter: FilterCascade::new(),
            omni_directions: DirectionSet::new(),
            batch_directions: DirectionSet::new(),
            vpl_pool,
            vdl_pool,
            stats: FrameStats::default(),
            rng: DEFAULT_SEED,
            stale: false,
        }
    }

    /// Replace the light snapshot, pruning state for removed ids.
    pub fn set_lights(&mut self, lights: &[SourceLight]) {
        self.lights = lights.to_vec();
        let ids: HashSet<SourceId> = self.lights.iter().map(|l| l.id).collect();
        let keep = |key: &LightKey| match key {
            LightKey::Source(id) => ids.contains(id),
            LightKey::DirectionalSet => true,
        };
        self.targets.retain(keep);
        self.vdl_targets.retain(keep);
    }

    /// Queue a config swap for the start of the next step.
    pub fn reconfigure(&mut self, config: VplConfig) {
        self.pending_config = Some(config.sanitized());
        self.stale = true;
    }

    /// Invalidate all sample history (scene changed under the tables).
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Reseed the random half of the sample jitter.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = seed;
    }

    /// Run one full pipeline step.
    ///
    /// Synchronous: all raycasts for the frame complete inside this call,
    /// bounded by [`estimated_rays_per_frame`](Self::estimated_rays_per_frame).
    /// Pool and ambient side effects are applied before returning.
    pub fn step(
        &mut self,
        oracle: &mut dyn RaycastOracle,
        backend: &mut dyn RenderBackend,
        camera: &CameraView,
        env: Option<&mut dyn EnvironmentSink>,
    ) -> FrameStats {
        if self.stale {
            self.consume_stale(backend);
        }
        self.ray_log.clear();

        // Processors. Spots and omnis write per-light records, all suns
        // share either the batch bucket or the trivial VDL table.
        {
            let mut caster = RayCaster::new(oracle, &mut self.ray_log);
            for light in &self.lights {
                match light.kind {
                    LightKind::Spot => process_spot(
                        &mut caster,
                        light,
                        &self.config,
                        &mut self.targets,
                        &mut self.rng,
                    ),
                    LightKind::Omni => process_omni(
                        &mut caster,
                        light,
                        &self.config,
                        &mut self.omni_directions,
                        &mut self.targets,
                        &mut self.rng,
                    ),
                    LightKind::Directional => {}
                }
            }

            if self.config.directional_batch || self.config.directional_look_sample {
                process_directional_batch(
                    &mut caster,
                    &self.lights,
                    camera,
                    &self.config,
                    &mut self.batch_directions,
                    &mut self.targets,
                    &mut self.rng,
                );
                self.vdl_targets.clear();
            } else {
                process_directional_trivial(&self.lights, &self.config, &mut self.vdl_targets);
                self.targets.remove(LightKey::DirectionalSet);
            }
        }

        self.filter.update(&self.targets, self.config.temporal_filter);
        self.vdl_filter
            .update(&self.vdl_targets, self.config.temporal_filter);

        let lights = &self.lights;
        let color_for = |key: LightKey| -> Option<Vec3> {
            match key {
                LightKey::Source(id) => lights.iter().find(|l| l.id == id).map(|l| l.color),
                LightKey::DirectionalSet => None,
            }
        };

        let selected = select_vpls(
            self.filter.current(),
            &color_for,
            self.config.max_vpls,
            self.config.merge_overflow,
        );
        for (index, vpl) in selected.iter().enumerate() {
            self.vpl_pool.configure(
                backend,
                index,
                ProxyPlacement::Point {
                    position: vpl.position,
                    normal: vpl.normal,
                },
                vpl.color,
                vpl.energy,
                vpl.radius,
            );
        }
        self.vpl_pool.deactivate_from(backend, selected.len());

        let vdls = select_vdls(
            self.vdl_filter.current(),
            &color_for,
            self.config.max_directionals,
        );
        for (index, vdl) in vdls.iter().enumerate() {
            // VDL records carry their emit direction in the position field.
            self.vdl_pool.configure(
                backend,
                index,
                ProxyPlacement::Direction(vdl.position),
                vdl.color,
                vdl.energy,
                vdl.radius,
            );
        }
        self.vdl_pool.deactivate_from(backend, vdls.len());

        let ambient = aggregate_ambient(&selected, camera.position, self.config.ambient_gain);
        if let Some(sink) = env {
            sink.set_ambient(ambient.color, ambient.energy);
        }

        self.stats = FrameStats {
            rays_cast: self.ray_log.casts(),
            lights_processed: self.lights.len(),
            active_vpls: selected.len(),
            active_vdls: vdls.len(),
            table_entries: self.targets.sample_count() + self.vdl_targets.sample_count(),
            ambient_energy: ambient.energy,
        };
        self.stats
    }

    /// Release every pool handle and drop all sample state.
    pub fn teardown(&mut self, backend: &mut dyn RenderBackend) {
        self.vpl_pool.release_all(backend);
        self.vdl_pool.release_all(backend);
        self.targets.clear();
        self.vdl_targets.clear();
        self.filter.reset();
        self.vdl_filter.reset();
    }

    /// Upper bound on oracle queries the next step may issue.
    pub fn estimated_rays_per_frame(&self) -> usize {
        let spots = self.count_kind(LightKind::Spot);
        let omnis = self.count_kind(LightKind::Omni);
        let suns = self.count_kind(LightKind::Directional);
        self.config.ray_budget(spots, omnis, suns)
    }

    /// Counters from the most recent step.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Ray segments recorded during the most recent step.
    pub fn ray_log(&self) -> &RayLog {
        &self.ray_log
    }

    /// The active (sanitized) configuration.
    pub fn config(&self) -> &VplConfig {
        &self.config
    }

    /// The current light snapshot.
    pub fn lights(&self) -> &[SourceLight] {
        &self.lights
    }

    fn count_kind(&self, kind: LightKind) -> usize {
        self.lights.iter().filter(|l| l.kind == kind).count()
    }

    /// Apply a deferred config swap and drop all history.
    fn consume_stale(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(config) = self.pending_config.take() {
            self.config = config;
        }
        self.targets.clear();
        self.vdl_targets.clear();
        self.filter.reset();
        self.vdl_filter.reset();
        self.ray_log.set_enabled(self.config.show_raycasts);

        self.vpl_pool.set_capacity(backend, self.config.max_vpls);
        self.vpl_pool.resize(backend, self.config.max_vpls);
        self.vdl_pool.set_capacity(backend, self.config.max_directionals);
        self.vdl_pool.resize(backend, self.config.max_directionals);
        self.stale = false;
    }
}
