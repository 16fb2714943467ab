//! Greedy label placement with collision avoidance.
//!
//! Every visible, non-overflow pin gets two label candidates, anchored to
//! the right and to the left of its marker. Candidates are sorted by
//! priority (cluster size, then insertion order; the right side is tried
//! first) and accepted greedily against a spatial hash already seeded with
//! every icon footprint. Boxes entirely outside the viewport are dropped
//! without a collision test. At most one label survives per pin.

use crate::core::bounds::Bounds;
use crate::core::config::LayoutConfig;
use crate::layout::node::{LabelBox, LabelSide, VisualNode};
use crate::prelude::{HashMap, HashSet};
use crate::spatial::grid::ScreenGrid;
use once_cell::sync::Lazy;

/// Approximate advance widths relative to the font size, for characters
/// that deviate noticeably from the average glyph.
static CHAR_WIDTH_FACTORS: Lazy<HashMap<char, f64>> = Lazy::new(|| {
    let mut widths = HashMap::default();
    for c in "iIjl.,:;'|!".chars() {
        widths.insert(c, 0.30);
    }
    for c in "ftr()[]-\"".chars() {
        widths.insert(c, 0.42);
    }
    for c in "mwMW".chars() {
        widths.insert(c, 0.85);
    }
    widths.insert(' ', 0.33);
    widths
});

const AVERAGE_CHAR_FACTOR: f64 = 0.58;

/// Estimates the rendered width of a label string
pub fn measure_text(text: &str, font_size: f64) -> f64 {
    text.chars()
        .map(|c| {
            CHAR_WIDTH_FACTORS
                .get(&c)
                .copied()
                .unwrap_or(AVERAGE_CHAR_FACTOR)
        })
        .sum::<f64>()
        * font_size
}

struct Candidate<'a> {
    node: &'a VisualNode,
    side: LabelSide,
    priority: u32,
}

/// Places labels for the given nodes, seeding the collision hash with every
/// icon footprint first. Returns the accepted boxes.
pub fn place_labels(
    nodes: &[VisualNode],
    viewport: &Bounds,
    config: &LayoutConfig,
) -> Vec<LabelBox> {
    let mut grid = ScreenGrid::new(config.collision_threshold());
    for node in nodes {
        grid.insert(
            Bounds::from_center_and_size(
                crate::core::geo::Point::new(node.x, node.y),
                config.pin_diameter,
                config.pin_diameter,
            ),
            node.key.clone(),
        );
    }

    let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(nodes.len() * 2);
    for (seq, node) in nodes.iter().enumerate() {
        if node.is_plus || node.label_text.is_none() {
            continue;
        }
        let base = (node.cluster_size as u32).saturating_mul(1000) + seq as u32;
        // The right side is enumerated first so it wins when both fit.
        candidates.push(Candidate {
            node,
            side: LabelSide::Right,
            priority: base * 2,
        });
        candidates.push(Candidate {
            node,
            side: LabelSide::Left,
            priority: base * 2 + 1,
        });
    }
    candidates.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.node.key.cmp(&b.node.key))
    });

    let half_pin = config.pin_diameter / 2.0;
    let mut labeled: HashSet<&str> = HashSet::default();
    let mut accepted = Vec::new();

    for candidate in &candidates {
        let node = candidate.node;
        if labeled.contains(node.key.as_str()) {
            continue;
        }
        let text = match &node.label_text {
            Some(text) => text,
            None => continue,
        };

        let width = measure_text(text, config.label.font_size) + 2.0 * config.label.padding;
        let height = config.label.height;
        let anchor_x = match candidate.side {
            LabelSide::Right => node.x + half_pin + config.label.gap,
            LabelSide::Left => node.x - half_pin - config.label.gap - width,
        };
        let bounds = Bounds::from_coords(
            anchor_x,
            node.y - height / 2.0,
            anchor_x + width,
            node.y + height / 2.0,
        );

        // Entirely off-screen boxes are dropped untested.
        if !bounds.intersects(viewport) {
            continue;
        }
        if grid.collides(&bounds, &node.key) {
            continue;
        }

        grid.insert(bounds, node.key.clone());
        labeled.insert(node.key.as_str());
        accepted.push(LabelBox {
            pin_key: node.key.clone(),
            side: candidate.side,
            anchor_x,
            anchor_y: node.y,
            width,
            height,
            priority: candidate.priority,
        });
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::node::NodeCategory;

    fn node(key: &str, x: f64, y: f64, label: &str) -> VisualNode {
        VisualNode {
            key: key.to_string(),
            x,
            y,
            pin_idx: Some(0),
            is_plus: false,
            cluster_size: 1,
            label_text: Some(label.to_string()),
            category: NodeCategory::Approved,
            is_selected: false,
            alpha: 1.0,
        }
    }

    fn viewport() -> Bounds {
        Bounds::from_coords(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_lone_pin_gets_a_right_label() {
        let nodes = vec![node("a", 400.0, 300.0, "ada")];
        let labels = place_labels(&nodes, &viewport(), &LayoutConfig::default());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].side, LabelSide::Right);
        assert_eq!(labels[0].pin_key, "a");
    }

    #[test]
    fn test_at_most_one_label_per_pin() {
        let nodes = vec![node("a", 400.0, 300.0, "ada"), node("b", 400.0, 500.0, "kim")];
        let labels = place_labels(&nodes, &viewport(), &LayoutConfig::default());
        let mut keys: Vec<_> = labels.iter().map(|l| l.pin_key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), labels.len());
    }

    #[test]
    fn test_blocked_right_side_falls_back_to_left() {
        // Neighbor icon directly to the right of "a" blocks the right box.
        let mut blocker = node("b", 450.0, 300.0, "");
        blocker.label_text = None;
        let nodes = vec![node("a", 400.0, 300.0, "ada"), blocker];
        let labels = place_labels(&nodes, &viewport(), &LayoutConfig::default());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].side, LabelSide::Left);
    }

    #[test]
    fn test_offscreen_labels_are_dropped() {
        // Far outside the viewport on both sides.
        let nodes = vec![node("a", 2000.0, 300.0, "ada")];
        let labels = place_labels(&nodes, &viewport(), &LayoutConfig::default());
        assert!(labels.is_empty());
    }

    #[test]
    fn test_overlapping_labels_reject_the_later_one() {
        // Two pins stacked closely: the second pin's label would overlap the
        // first pin's accepted box on the right; it falls back to the left.
        let nodes = vec![
            node("a", 400.0, 300.0, "adelaide"),
            node("b", 400.0, 318.0, "kimberley"),
        ];
        let labels = place_labels(&nodes, &viewport(), &LayoutConfig::default());
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].side, LabelSide::Right);
        assert_eq!(labels[1].side, LabelSide::Left);
    }

    #[test]
    fn test_overflow_nodes_get_no_label() {
        let mut plus = node("plus", 100.0, 100.0, "+5");
        plus.is_plus = true;
        let labels = place_labels(&[plus], &viewport(), &LayoutConfig::default());
        assert!(labels.is_empty());
    }

    #[test]
    fn test_measure_text_scales_with_length() {
        let short = measure_text("ab", 13.0);
        let long = measure_text("abcdef", 13.0);
        assert!(long > short);
        assert!(measure_text("iii", 13.0) < measure_text("mmm", 13.0));
    }
}
