//! Raycast oracle trait and the logging cast adapter
//!
//! The pipeline never talks to a physics engine directly. The host hands in
//! a [`RaycastOracle`] (typically backed by the engine's collision world)
//! and every sample ray goes through [`RayCaster`], which counts casts and
//! optionally records segments for a debug overlay.
//!
//! Results are consumed immediately by the estimator; nothing here retains
//! a hit beyond the current estimation step.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

/// Intersection report for a single segment query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space intersection point.
    pub position: Vec3,
    /// Surface normal at the intersection.
    pub normal: Vec3,
}

/// Collision-query collaborator implemented by the host engine.
///
/// Queries are segment casts: `from` to `to`, first hit wins. Takes `&mut
/// self` because engine-side query objects are often stateful.
pub trait RaycastOracle {
    /// Cast a segment and return the first intersection, if any.
    fn query(&mut self, from: Vec3, to: Vec3) -> Option<RayHit>;
}

/// One recorded debug segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    /// Segment start.
    pub from: Vec3,
    /// Segment end: the hit point for hits, the original target for misses.
    pub to: Vec3,
}

/// Per-frame record of issued rays.
///
/// The cast counter always runs; segment capture only happens while the
/// debug overlay is enabled, since per-ray allocation is pure overhead
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct RayLog {
    enabled: bool,
    casts: u32,
    hits: Vec<RaySegment>,
    misses: Vec<RaySegment>,
}

impl RayLog {
    /// Create a log, capturing segments only if `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Toggle segment capture for subsequent casts.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether segment capture is active.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Rays issued since the last [`clear`](Self::clear).
    pub fn casts(&self) -> u32 {
        self.casts
    }

    /// Segments that intersected geometry.
    pub fn hits(&self) -> &[RaySegment] {
        &self.hits
    }

    /// Segments that reached their target unobstructed.
    pub fn misses(&self) -> &[RaySegment] {
        &self.misses
    }

    /// Reset counters and captured segments for a new frame.
    pub fn clear(&mut self) {
        self.casts = 0;
        self.hits.clear();
        self.misses.clear();
    }

    fn record(&mut self, from: Vec3, to: Vec3, hit: Option<&RayHit>) {
        self.casts += 1;
        if !self.enabled {
            return;
        }
        match hit {
            Some(h) => self.hits.push(RaySegment {
                from,
                to: h.position,
            }),
            None => self.misses.push(RaySegment { from, to }),
        }
    }
}

/// Borrowed pair of oracle and log used for the duration of one update.
pub struct RayCaster<'a> {
    oracle: &'a mut dyn RaycastOracle,
    log: &'a mut RayLog,
}

impl<'a> RayCaster<'a> {
    /// Bundle an oracle with the frame's ray log.
    pub fn new(oracle: &'a mut dyn RaycastOracle, log: &'a mut RayLog) -> Self {
        Self { oracle, log }
    }

    /// Cast a segment, recording it in the log.
    pub fn cast(&mut self, from: Vec3, to: Vec3) -> Option<RayHit> {
        let hit = self.oracle.query(from, to);
        self.log.record(from, to, hit.as_ref());
        hit
    }
}
