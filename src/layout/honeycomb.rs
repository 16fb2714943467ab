//! Honeycomb slot generation.
//!
//! For a cluster, candidate marker positions are slot 0 at the centroid and
//! concentric hexagonal rings around it: ring `r` holds `6·r` slots at radius
//! `r · spacing`. Slot ordering is a pure function of the requested count, so
//! slot indices are stable across passes for a fixed cluster size and cached
//! assignments stay meaningful.

use std::f64::consts::TAU;

/// A candidate offset position relative to a cluster centroid
#[derive(Debug, Clone)]
pub struct Slot {
    pub dx: f64,
    pub dy: f64,
    pub idx: usize,
    pub radius: f64,
    pub angle: f64,
    /// Number of adjacent slots at honeycomb spacing
    pub neighbor_count: usize,
}

/// The ordered slot list of one cluster, with precomputed adjacency
#[derive(Debug, Clone)]
pub struct SlotSet {
    pub slots: Vec<Slot>,
    /// Adjacent slot indices per slot
    pub neighbors: Vec<Vec<usize>>,
}

impl SlotSet {
    /// Generates at least `desired` slots at the given hex spacing
    pub fn generate(desired: usize, spacing: f64) -> Self {
        let desired = desired.max(1);
        let mut slots = vec![Slot {
            dx: 0.0,
            dy: 0.0,
            idx: 0,
            radius: 0.0,
            angle: 0.0,
            neighbor_count: 0,
        }];

        let mut ring = 1usize;
        while slots.len() < desired {
            let count = 6 * ring;
            let radius = ring as f64 * spacing;
            for k in 0..count {
                let angle = k as f64 * TAU / count as f64;
                slots.push(Slot {
                    dx: radius * angle.cos(),
                    dy: radius * angle.sin(),
                    idx: slots.len(),
                    radius,
                    angle,
                    neighbor_count: 0,
                });
            }
            ring += 1;
        }

        // Adjacency: slots one hex step apart. The cutoff absorbs the slight
        // chord-vs-radius mismatch of the polar ring layout.
        let cutoff_sq = (spacing * 1.1) * (spacing * 1.1);
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                let dx = slots[i].dx - slots[j].dx;
                let dy = slots[i].dy - slots[j].dy;
                if dx * dx + dy * dy <= cutoff_sq {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        for (slot, adjacent) in slots.iter_mut().zip(&neighbors) {
            slot.neighbor_count = adjacent.len();
        }

        Self { slots, neighbors }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_zero_is_the_centroid() {
        let set = SlotSet::generate(7, 40.0);
        assert_eq!(set.slots[0].dx, 0.0);
        assert_eq!(set.slots[0].dy, 0.0);
        assert_eq!(set.slots[0].radius, 0.0);
    }

    #[test]
    fn test_ring_sizes() {
        // 1 center + 6 on ring one + 12 on ring two.
        let set = SlotSet::generate(8, 40.0);
        assert_eq!(set.len(), 19);
        assert_eq!(set.slots[1].radius, 40.0);
        assert_eq!(set.slots[7].radius, 80.0);
    }

    #[test]
    fn test_radii_are_monotonic_in_index() {
        let set = SlotSet::generate(30, 40.0);
        for pair in set.slots.windows(2) {
            assert!(pair[0].radius <= pair[1].radius);
        }
    }

    #[test]
    fn test_center_has_six_neighbors() {
        let set = SlotSet::generate(7, 40.0);
        assert_eq!(set.slots[0].neighbor_count, 6);
        assert!(set.neighbors[0].iter().all(|&j| set.slots[j].radius == 40.0));
    }

    #[test]
    fn test_indices_are_stable_for_fixed_size() {
        let a = SlotSet::generate(12, 40.0);
        let b = SlotSet::generate(12, 40.0);
        for (sa, sb) in a.slots.iter().zip(&b.slots) {
            assert_eq!(sa.idx, sb.idx);
            assert_eq!(sa.dx, sb.dx);
            assert_eq!(sa.dy, sb.dy);
        }
    }

    #[test]
    fn test_no_two_slots_coincide() {
        let set = SlotSet::generate(25, 40.0);
        for i in 0..set.len() {
            for j in (i + 1)..set.len() {
                let dx = set.slots[i].dx - set.slots[j].dx;
                let dy = set.slots[i].dy - set.slots[j].dy;
                assert!(dx * dx + dy * dy > 1.0);
            }
        }
    }
}
