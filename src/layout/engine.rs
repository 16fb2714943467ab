//! The per-frame layout pass driver.
//!
//! [`LayoutContext`] owns the only state that survives across passes: the
//! slot-assignment cache that keeps pins from shuffling between re-layouts,
//! and a small last-good frame cache used as a fallback when a pass fails.
//! Both are single-writer (the pass itself) and scoped to one map view
//! instance, so fresh-state unit testing needs no global teardown.
//!
//! A pass is synchronous and runs to completion before the next paint.
//! Bursts of viewport events coalesce through the `scheduled` flag; during
//! active interaction the pass is suspended entirely and the renderer keeps
//! showing the previous frame.

use crate::core::bounds::Bounds;
use crate::core::config::LayoutConfig;
use crate::core::constants;
use crate::core::geo::Point;
use crate::layout::assign::{assign_slots, CachedSlot, MemberInput};
use crate::layout::cluster::{self, UnionFind};
use crate::layout::honeycomb::SlotSet;
use crate::layout::label;
use crate::layout::node::{NodeCategory, Pin, PinKind, ProjectedPoint, VisualNode};
use crate::prelude::HashMap;
use crate::projector::GeoProjector;
use crate::surface::MapSurface;
use lru::LruCache;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Output of one layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutFrame {
    pub nodes: Vec<VisualNode>,
    pub labels: Vec<crate::layout::node::LabelBox>,
}

/// Per-cluster placement produced inside the merge loop
struct ClusterPlacement {
    /// `(point_idx, slot_idx, x, y)` per visible member
    members: Vec<(usize, usize, f64, f64)>,
    /// Overflow node position when the cluster exceeds the honeycomb cap
    overflow: Option<(f64, f64)>,
    cluster_size: usize,
    centroid: Point,
}

/// Owns the cross-pass mutable state of one map view's layout engine
pub struct LayoutContext {
    config: LayoutConfig,
    slot_cache: HashMap<String, CachedSlot>,
    last_good: LruCache<u64, LayoutFrame>,
    current: LayoutFrame,
    scheduled: bool,
    interacting: bool,
}

impl LayoutContext {
    pub fn new(config: LayoutConfig) -> Self {
        let capacity = NonZeroUsize::new(constants::LAST_GOOD_CAPACITY)
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            slot_cache: HashMap::default(),
            last_good: LruCache::new(capacity),
            current: LayoutFrame::default(),
            scheduled: false,
            interacting: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The most recently served frame
    pub fn current_frame(&self) -> &LayoutFrame {
        &self.current
    }

    /// Requests a layout pass on the next redraw. Repeated calls before the
    /// pass runs coalesce into a single request.
    pub fn schedule_layout(&mut self, surface: &dyn MapSurface) {
        if !self.scheduled {
            self.scheduled = true;
            surface.request_redraw();
        }
    }

    /// True when a pass has been scheduled and not yet run
    pub fn needs_layout(&self) -> bool {
        self.scheduled
    }

    /// Suspends layout recomputation while the user pans or zooms
    pub fn begin_interaction(&mut self) {
        self.interacting = true;
    }

    /// Resumes recomputation and schedules a fresh pass
    pub fn end_interaction(&mut self, surface: &dyn MapSurface) {
        self.interacting = false;
        self.schedule_layout(surface);
    }

    /// Runs one layout pass and returns the frame to render.
    ///
    /// `pins` and `pending_pins` are concatenated for the pass; node
    /// `pin_idx` values index into that combined order. During interaction
    /// the previous frame is returned unchanged. Any panic inside the pass
    /// is caught and answered with the last good frame for the same data
    /// signature, so the screen never goes blank.
    pub fn compute_layout(
        &mut self,
        surface: &dyn MapSurface,
        pins: &[Pin],
        pending_pins: &[Pin],
        selected: Option<&str>,
    ) -> LayoutFrame {
        self.scheduled = false;
        if self.interacting {
            return self.current.clone();
        }

        let signature = self.data_signature(surface, pins, pending_pins, selected);
        let config = &self.config;
        let slot_cache = &self.slot_cache;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            run_pass(surface, pins, pending_pins, selected, config, slot_cache)
        }));

        match outcome {
            Ok((frame, cache_updates)) => {
                for (key, cached) in cache_updates {
                    self.slot_cache.insert(key, cached);
                }
                self.last_good.put(signature, frame.clone());
                self.current = frame.clone();
                frame
            }
            Err(_) => {
                log::error!("layout pass failed; serving last good frame");
                let frame = self
                    .last_good
                    .get(&signature)
                    .cloned()
                    .unwrap_or_default();
                self.current = frame.clone();
                frame
            }
        }
    }

    fn data_signature(
        &self,
        surface: &dyn MapSurface,
        pins: &[Pin],
        pending_pins: &[Pin],
        selected: Option<&str>,
    ) -> u64 {
        let mut hasher = crate::prelude::FxHasher::default();
        for pin in pins.iter().chain(pending_pins) {
            pin.id.hash(&mut hasher);
            pin.lat.to_bits().hash(&mut hasher);
            pin.lng.to_bits().hash(&mut hasher);
        }
        let center = surface.center();
        center.lat.to_bits().hash(&mut hasher);
        center.lng.to_bits().hash(&mut hasher);
        surface.zoom().to_bits().hash(&mut hasher);
        let size = surface.container_size();
        size.x.to_bits().hash(&mut hasher);
        size.y.to_bits().hash(&mut hasher);
        selected.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// One complete pass: project, cluster, assign, merge until stable, label.
fn run_pass(
    surface: &dyn MapSurface,
    pins: &[Pin],
    pending_pins: &[Pin],
    selected: Option<&str>,
    config: &LayoutConfig,
    slot_cache: &HashMap<String, CachedSlot>,
) -> (LayoutFrame, Vec<(String, CachedSlot)>) {
    let all: Vec<Pin> = pins.iter().chain(pending_pins).cloned().collect();
    let points = GeoProjector::project_pins(surface, &all, &config.visibility);
    if points.is_empty() {
        return (LayoutFrame::default(), Vec::new());
    }

    let threshold = config.collision_threshold();
    let mut uf = UnionFind::new(points.len());
    cluster::union_colliding(&points, threshold, &mut uf);

    let mut iterations = 0usize;
    let placements = loop {
        iterations += 1;
        let clusters = cluster::components(&mut uf, points.len());
        let placements = place_clusters(&clusters, &points, &all, config, slot_cache);

        let mut placed: Vec<(usize, f64, f64)> = Vec::new();
        for (ord, placement) in placements.iter().enumerate() {
            if let Some((x, y)) = placement.overflow {
                placed.push((ord, x, y));
            }
            for &(_, _, x, y) in &placement.members {
                placed.push((ord, x, y));
            }
        }

        let pairs = cluster::colliding_cluster_pairs(&placed, threshold);
        if pairs.is_empty() {
            log::debug!(
                "layout pass settled after {} iteration(s): {} points, {} clusters",
                iterations,
                points.len(),
                clusters.len()
            );
            break placements;
        }
        if iterations >= config.merge_iteration_cap {
            log::warn!(
                "cluster merge cap ({}) reached with {} residual collision(s); accepting layout",
                config.merge_iteration_cap,
                pairs.len()
            );
            break placements;
        }
        for (a, b) in pairs {
            uf.union(clusters[a][0], clusters[b][0]);
        }
    };

    let mut nodes = Vec::new();
    let mut cache_updates = Vec::new();
    for placement in &placements {
        if let Some((x, y)) = placement.overflow {
            let anchor = placement
                .members
                .first()
                .map(|&(point_idx, _, _, _)| all[points[point_idx].pin_idx].id.as_str())
                .unwrap_or("empty");
            let alpha = placement
                .members
                .iter()
                .map(|&(point_idx, _, _, _)| points[point_idx].alpha)
                .fold(0.0f64, f64::max);
            nodes.push(VisualNode {
                key: format!("plus-{}", anchor),
                x,
                y,
                pin_idx: None,
                is_plus: true,
                cluster_size: placement.cluster_size,
                label_text: None,
                category: NodeCategory::Overflow,
                is_selected: false,
                alpha,
            });
        }
        for &(point_idx, slot_idx, x, y) in &placement.members {
            let point = &points[point_idx];
            let pin = &all[point.pin_idx];
            nodes.push(VisualNode {
                key: pin.id.clone(),
                x,
                y,
                pin_idx: Some(point.pin_idx),
                is_plus: false,
                cluster_size: placement.cluster_size,
                label_text: pin.label_text(),
                category: match pin.kind {
                    PinKind::Approved => NodeCategory::Approved,
                    PinKind::Pending => NodeCategory::Pending,
                },
                is_selected: selected == Some(pin.id.as_str()),
                alpha: point.alpha,
            });
            cache_updates.push((
                pin.id.clone(),
                CachedSlot {
                    dx: x - placement.centroid.x,
                    dy: y - placement.centroid.y,
                    idx: slot_idx,
                },
            ));
        }
    }

    let size = surface.container_size();
    let viewport = Bounds::from_coords(0.0, 0.0, size.x, size.y);
    let labels = label::place_labels(&nodes, &viewport, config);
    log::debug!("placed {} node(s), {} label(s)", nodes.len(), labels.len());

    (LayoutFrame { nodes, labels }, cache_updates)
}

/// Places each cluster's members into honeycomb slots
fn place_clusters(
    clusters: &[Vec<usize>],
    points: &[ProjectedPoint],
    pins: &[Pin],
    config: &LayoutConfig,
    slot_cache: &HashMap<String, CachedSlot>,
) -> Vec<ClusterPlacement> {
    clusters
        .iter()
        .map(|members| place_one_cluster(members, points, pins, config, slot_cache))
        .collect()
}

fn place_one_cluster(
    members: &[usize],
    points: &[ProjectedPoint],
    pins: &[Pin],
    config: &LayoutConfig,
    slot_cache: &HashMap<String, CachedSlot>,
) -> ClusterPlacement {
    let cluster_size = members.len();
    let centroid = {
        let mut x = 0.0;
        let mut y = 0.0;
        for &i in members {
            x += points[i].x;
            y += points[i].y;
        }
        Point::new(x / cluster_size as f64, y / cluster_size as f64)
    };

    // Deterministic member ordering: insertion order, then pin id.
    let mut ordered: Vec<usize> = members.to_vec();
    ordered.sort_by(|&a, &b| {
        let pa = &pins[points[a].pin_idx];
        let pb = &pins[points[b].pin_idx];
        pa.order.cmp(&pb.order).then_with(|| pa.id.cmp(&pb.id))
    });

    let overflow = cluster_size > config.honeycomb_max;
    let visible: Vec<usize> = if overflow {
        ordered[..config.honeycomb_max].to_vec()
    } else {
        ordered
    };

    // Singleton fast path: the cluster center is always slot 0.
    if cluster_size == 1 {
        let point = &points[members[0]];
        return ClusterPlacement {
            members: vec![(members[0], 0, point.x, point.y)],
            overflow: None,
            cluster_size,
            centroid,
        };
    }

    let first_slot = usize::from(overflow);
    let desired = visible.len() + config.slot_margin + first_slot;
    let slots = SlotSet::generate(desired, config.hex_spacing());

    let inputs: Vec<MemberInput<'_>> = visible
        .iter()
        .map(|&i| MemberInput {
            key: pins[points[i].pin_idx].id.as_str(),
            offset: Point::new(points[i].x - centroid.x, points[i].y - centroid.y),
        })
        .collect();

    let assigned = assign_slots(&inputs, &slots, first_slot, slot_cache, &config.weights);

    let placed_members = visible
        .iter()
        .zip(&assigned)
        .map(|(&point_idx, &slot_idx)| {
            let slot = &slots.slots[slot_idx];
            (
                point_idx,
                slot_idx,
                centroid.x + slot.dx,
                centroid.y + slot.dy,
            )
        })
        .collect();

    ClusterPlacement {
        members: placed_members,
        overflow: overflow.then_some((centroid.x, centroid.y)),
        cluster_size,
        centroid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::surface::MercatorSurface;

    fn surface() -> MercatorSurface {
        MercatorSurface::new(LatLng::new(0.0, 0.0), 5.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_empty_input_yields_empty_frame() {
        let mut ctx = LayoutContext::default();
        let frame = ctx.compute_layout(&surface(), &[], &[], None);
        assert!(frame.nodes.is_empty());
        assert!(frame.labels.is_empty());
    }

    #[test]
    fn test_schedule_coalesces() {
        let mut ctx = LayoutContext::default();
        let surface = surface();
        ctx.schedule_layout(&surface);
        ctx.schedule_layout(&surface);
        ctx.schedule_layout(&surface);
        assert!(ctx.needs_layout());
        assert_eq!(surface.redraw_requests(), 1);

        ctx.compute_layout(&surface, &[], &[], None);
        assert!(!ctx.needs_layout());
    }

    #[test]
    fn test_interaction_serves_stale_frame() {
        let mut ctx = LayoutContext::default();
        let surface = surface();
        let pins = vec![Pin::new("a", 0.0, 0.0).with_nickname("ada")];

        let before = ctx.compute_layout(&surface, &pins, &[], None);
        assert_eq!(before.nodes.len(), 1);

        ctx.begin_interaction();
        // New data arrives mid-interaction; the old frame is served.
        let more = vec![
            Pin::new("a", 0.0, 0.0).with_nickname("ada"),
            Pin::new("b", 20.0, 20.0).with_nickname("kim"),
        ];
        let stale = ctx.compute_layout(&surface, &more, &[], None);
        assert_eq!(stale, before);

        ctx.end_interaction(&surface);
        let fresh = ctx.compute_layout(&surface, &more, &[], None);
        assert_eq!(fresh.nodes.len(), 2);
    }

    #[test]
    fn test_selected_pin_is_flagged() {
        let mut ctx = LayoutContext::default();
        let pins = vec![
            Pin::new("a", 0.0, 0.0).with_nickname("ada"),
            Pin::new("b", 30.0, 30.0).with_nickname("kim"),
        ];
        let frame = ctx.compute_layout(&surface(), &pins, &[], Some("b"));
        let selected: Vec<_> = frame.nodes.iter().filter(|n| n.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].key, "b");
    }

    #[test]
    fn test_pending_pins_keep_their_category() {
        let mut ctx = LayoutContext::default();
        let approved = vec![Pin::new("a", 0.0, 0.0)];
        let pending = vec![Pin::new("p", 40.0, 40.0).with_kind(PinKind::Pending)];
        let frame = ctx.compute_layout(&surface(), &approved, &pending, None);
        let categories: Vec<_> = frame.nodes.iter().map(|n| n.category).collect();
        assert!(categories.contains(&NodeCategory::Approved));
        assert!(categories.contains(&NodeCategory::Pending));
    }
}
