//! Budget selection of filtered samples into the final proxy list
//!
//! The pool has a hard slot cap, but dropping the dimmest samples outright
//! loses energy and makes the scene pump as records cross the cut line.
//! Instead, everything past the cap is merged into one energy-weighted
//! "overflow bucket" record occupying the last slot, so aggregate energy is
//! conserved while the emitted light count never exceeds the budget.
//!
//! Sorting is total and deterministic: energy descending, then key, then
//! slot index, so equal-energy records keep a stable pool assignment across
//! frames.
//!
//! Author: Moroya Sakamoto

use glam::Vec3;

use crate::config::VPL_ENERGY_FLOOR;
use crate::table::TargetTable;
use crate::types::{LightKey, SelectedVpl};

struct Candidate {
    key: LightKey,
    index: usize,
    vpl: SelectedVpl,
}

/// Flatten, rank and cap the filtered table into at most `max_vpls` proxies.
///
/// `color_for` resolves the owning light's color for records without an
/// explicit one; unknown keys fall back to white. With `merge_overflow`
/// set, over-budget records fold into the energy-conserving bucket;
/// otherwise they are discarded.
pub fn select_vpls<F>(
    table: &TargetTable,
    color_for: F,
    max_vpls: usize,
    merge_overflow: bool,
) -> Vec<SelectedVpl>
where
    F: Fn(LightKey) -> Option<Vec3>,
{
    if max_vpls == 0 {
        return Vec::new();
    }

    let mut candidates = collect(table, color_for);
    sort_ranked(&mut candidates);

    if candidates.len() > max_vpls {
        if merge_overflow {
            let keep = max_vpls - 1;
            if let Some(bucket) = merge_bucket(&candidates[keep..]) {
                candidates.truncate(keep);
                return candidates
                    .into_iter()
                    .map(|c| c.vpl)
                    .chain(std::iter::once(bucket))
                    .collect();
            }
        }
        candidates.truncate(max_vpls);
    }

    candidates.into_iter().map(|c| c.vpl).collect()
}

/// Rank directional records and cap them to `max_directionals`.
///
/// VDL records store their emit direction in the position field; there is
/// no overflow bucket since averaging directions of distinct suns is
/// meaningless.
pub fn select_vdls<F>(
    table: &TargetTable,
    color_for: F,
    max_directionals: usize,
) -> Vec<SelectedVpl>
where
    F: Fn(LightKey) -> Option<Vec3>,
{
    let mut candidates = collect(table, color_for);
    sort_ranked(&mut candidates);
    candidates.truncate(max_directionals);
    candidates.into_iter().map(|c| c.vpl).collect()
}

fn collect<F>(table: &TargetTable, color_for: F) -> Vec<Candidate>
where
    F: Fn(LightKey) -> Option<Vec3>,
{
    table
        .flatten()
        .filter(|(_, _, s)| s.energy > VPL_ENERGY_FLOOR)
        .map(|(key, index, s)| Candidate {
            key,
            index,
            vpl: SelectedVpl {
                position: s.position,
                normal: s.normal,
                radius: s.radius,
                energy: s.energy,
                color: s.color.or_else(|| color_for(key)).unwrap_or(Vec3::ONE),
            },
        })
        .collect()
}

fn sort_ranked(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.vpl
            .energy
            .total_cmp(&a.vpl.energy)
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| a.index.cmp(&b.index))
    });
}

/// Energy-weighted merge of the over-budget tail into one record.
///
/// Total energy is the sum, all other fields are energy-weighted averages.
/// The averaged normal is re-normalized since a weighted sum of unit
/// vectors is not unit length. Returns `None` for a zero-energy tail.
fn merge_bucket(overflow: &[Candidate]) -> Option<SelectedVpl> {
    let total: f32 = overflow.iter().map(|c| c.vpl.energy).sum();
    if total <= 0.0 {
        return None;
    }

    let mut position = Vec3::ZERO;
    let mut normal = Vec3::ZERO;
    let mut radius = 0.0f32;
    let mut color = Vec3::ZERO;
    for c in overflow {
        let w = c.vpl.energy;
        position += c.vpl.position * w;
        normal += c.vpl.normal * w;
        radius += c.vpl.radius * w;
        color += c.vpl.color * w;
    }

    Some(SelectedVpl {
        position: position / total,
        normal: (normal / total).normalize_or_zero(),
        radius: radius / total,
        energy: total,
        color: color / total,
    })
}
