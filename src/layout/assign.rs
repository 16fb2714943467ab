//! Stability-biased minimum-cost slot assignment.
//!
//! Members of a cluster are matched to honeycomb slots by solving a square
//! minimum-cost assignment over a cost matrix that blends geometric fit
//! (distance to an ideal offset in the pin's own angular direction, angular
//! mismatch away from the center, a soft radius cap) with stability terms
//! (a strong bias toward the pin's cached previous slot, penalties for
//! taking another pin's slot or crowding dense regions). Two repair passes
//! follow the matching: hole-fill pulls sparse outliers into surrounded
//! empty slots, must-fill guarantees the innermost slots are occupied.
//!
//! This module is pure: no dependency on the rendering surface, no state
//! beyond the cache handed in read-only. Ties break deterministically by
//! pin key ordering.

use crate::core::config::AssignmentWeights;
use crate::core::geo::{angle_diff, Point};
use crate::layout::honeycomb::SlotSet;
use crate::prelude::HashMap;

/// Last-assigned slot of a pin, persisted across passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedSlot {
    pub dx: f64,
    pub dy: f64,
    pub idx: usize,
}

/// One cluster member as seen by the solver
#[derive(Debug, Clone)]
pub struct MemberInput<'a> {
    /// Pin key, the deterministic tie-breaker
    pub key: &'a str,
    /// Screen offset of the projected point from the cluster centroid
    pub offset: Point,
}

/// Assigns each member a slot index into `slots.slots`.
///
/// `first_slot` is 0 normally and 1 when slot 0 is reserved for the
/// overflow node. The caller guarantees at least `members.len()` available
/// slots, so the matching is always feasible.
pub fn assign_slots(
    members: &[MemberInput<'_>],
    slots: &SlotSet,
    first_slot: usize,
    cache: &HashMap<String, CachedSlot>,
    weights: &AssignmentWeights,
) -> Vec<usize> {
    let n = members.len();
    if n == 0 {
        return Vec::new();
    }
    let available = slots.len() - first_slot;
    debug_assert!(available >= n);

    // Slots cached by members of this cluster, keyed by global slot index.
    // "Occupied this pass" means claimed by a different pin's cache entry.
    let mut cached_by: HashMap<usize, usize> = HashMap::default();
    for (i, member) in members.iter().enumerate() {
        if let Some(cached) = cache.get(member.key) {
            cached_by.entry(cached.idx).or_insert(i);
        }
    }

    let size = available;
    let mut cost = vec![vec![0.0f64; size]; size];
    for (i, member) in members.iter().enumerate() {
        let dist = member.offset.length();
        let member_angle = member.offset.angle();
        let ideal = if dist > f64::EPSILON {
            member
                .offset
                .multiply(dist.min(weights.radius_soft_cap) / dist)
        } else {
            Point::new(0.0, 0.0)
        };
        let cached = cache.get(member.key);

        for (local, slot) in slots.slots[first_slot..].iter().enumerate() {
            let mut c = (slot.dx - ideal.x).powi(2) + (slot.dy - ideal.y).powi(2);

            if slot.radius > weights.near_center_radius && dist > f64::EPSILON {
                c += angle_diff(slot.angle, member_angle) * weights.angle_mismatch;
            }
            if slot.radius > weights.radius_soft_cap {
                c += (slot.radius - weights.radius_soft_cap) * weights.radius_overflow;
            }

            match cached_by.get(&slot.idx) {
                Some(&owner) if owner != i => c += weights.occupied,
                _ => {}
            }
            let crowded = slots.neighbors[slot.idx]
                .iter()
                .filter(|&&adj| {
                    cached_by
                        .get(&adj)
                        .map(|&owner| owner != i)
                        .unwrap_or(false)
                })
                .count();
            c += crowded as f64 * weights.crowding;

            if let Some(cached) = cached {
                if cached.idx == slot.idx {
                    c -= weights.cache_reuse_bonus;
                } else {
                    c += weights.cache_abandon;
                }
            }

            cost[i][local] = c;
        }
    }
    // Rows past the member count are padding: zero cost everywhere keeps
    // the matrix square and the matching always feasible.

    let matched = hungarian(&cost);

    let mut occupant: Vec<Option<usize>> = vec![None; available];
    for (i, &local) in matched.iter().enumerate().take(n) {
        occupant[local] = Some(i);
    }

    hole_fill(members, slots, first_slot, cache, &mut occupant);
    must_fill(members, slots, first_slot, n, &mut occupant);

    let mut slot_of = vec![0usize; n];
    for (local, owner) in occupant.iter().enumerate() {
        if let Some(i) = owner {
            slot_of[*i] = first_slot + local;
        }
    }
    slot_of
}

/// Classic O(n³) primal-dual assignment on a square cost matrix.
/// Returns the matched column per row. Deterministic: scans columns in
/// ascending order and keeps the first minimum.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    // p[j]: 1-based row currently matched to column j; column 0 is the sentinel.
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut matched = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            matched[p[j] - 1] = j - 1;
        }
    }
    matched
}

/// Pulls the best sparse neighbor into an empty slot surrounded by at least
/// four occupied ones. Pins anchored by their cached slot are moved last.
fn hole_fill(
    members: &[MemberInput<'_>],
    slots: &SlotSet,
    first_slot: usize,
    cache: &HashMap<String, CachedSlot>,
    occupant: &mut [Option<usize>],
) {
    let local_of = |global: usize| global.checked_sub(first_slot);

    for hole in 0..occupant.len() {
        if occupant[hole].is_some() {
            continue;
        }
        let hole_global = first_slot + hole;
        let occupied_neighbors: Vec<usize> = slots.neighbors[hole_global]
            .iter()
            .filter_map(|&adj| local_of(adj))
            .filter(|&local| local < occupant.len() && occupant[local].is_some())
            .collect();
        if occupied_neighbors.len() < 4 {
            continue;
        }

        // Candidates sit farther out than the hole and are ranked: cache
        // anchors last, then by how sparse their own neighborhood is, then
        // by pin key.
        let mut best: Option<(bool, usize, &str, usize)> = None;
        for &local in &occupied_neighbors {
            let global = first_slot + local;
            if slots.slots[global].radius <= slots.slots[hole_global].radius {
                continue;
            }
            let member = match occupant[local] {
                Some(i) => i,
                None => continue,
            };
            let key = members[member].key;
            let anchored = cache
                .get(key)
                .map(|cached| cached.idx == global)
                .unwrap_or(false);
            let connectivity = slots.neighbors[global]
                .iter()
                .filter_map(|&adj| local_of(adj))
                .filter(|&l| l < occupant.len() && occupant[l].is_some())
                .count();
            let candidate = (anchored, connectivity, key, local);
            let better = match &best {
                None => true,
                Some(current) => {
                    (candidate.0, candidate.1, candidate.2) < (current.0, current.1, current.2)
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        if let Some((_, _, _, from)) = best {
            occupant[hole] = occupant[from].take();
        }
    }
}

/// Forces the innermost `visible` slots to be occupied by displacing a
/// farther-out occupant into each remaining gap. Guarantees no ring slot
/// stays empty while a member sits on a ring farther out.
fn must_fill(
    members: &[MemberInput<'_>],
    slots: &SlotSet,
    first_slot: usize,
    visible: usize,
    occupant: &mut [Option<usize>],
) {
    for inner in 0..visible.min(occupant.len()) {
        if occupant[inner].is_some() {
            continue;
        }
        let inner_radius = slots.slots[first_slot + inner].radius;
        // Farthest-out occupant wins; ties break by pin key.
        let mut source: Option<(f64, &str, usize)> = None;
        for local in (inner + 1)..occupant.len() {
            let member = match occupant[local] {
                Some(i) => i,
                None => continue,
            };
            let radius = slots.slots[first_slot + local].radius;
            if radius <= inner_radius {
                continue;
            }
            let key = members[member].key;
            let better = match &source {
                None => true,
                Some((best_radius, best_key, _)) => {
                    radius > *best_radius || (radius == *best_radius && key < *best_key)
                }
            };
            if better {
                source = Some((radius, key, local));
            }
        }
        if let Some((_, _, from)) = source {
            occupant[inner] = occupant[from].take();
        }
    }
}
