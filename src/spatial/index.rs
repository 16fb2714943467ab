//! R-tree index over placed visual nodes.
//!
//! Built once per frame from the layout output and queried to resolve
//! click/tap positions to the node under the pointer (selection and
//! cluster-expand gestures).

use crate::core::geo::Point;
use crate::layout::node::VisualNode;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// One indexed node footprint
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub key: String,
    pub center: Point,
    pub half_extent: f64,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [
                self.center.x - self.half_extent,
                self.center.y - self.half_extent,
            ],
            [
                self.center.x + self.half_extent,
                self.center.y + self.half_extent,
            ],
        )
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.center.x - point[0];
        let dy = self.center.y - point[1];
        dx * dx + dy * dy
    }
}

/// Hit-test index over one frame's nodes
pub struct NodeIndex {
    rtree: RTree<NodeEntry>,
}

impl NodeIndex {
    /// Builds the index from a frame's nodes using the icon radius
    pub fn build(nodes: &[VisualNode], pin_diameter: f64) -> Self {
        let entries: Vec<NodeEntry> = nodes
            .iter()
            .map(|node| NodeEntry {
                key: node.key.clone(),
                center: Point::new(node.x, node.y),
                half_extent: pin_diameter / 2.0,
            })
            .collect();
        Self {
            rtree: RTree::bulk_load(entries),
        }
    }

    /// Returns the key of the closest node whose icon covers the point
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&str> {
        let nearest = self.rtree.nearest_neighbor(&[x, y])?;
        let radius = nearest.half_extent;
        if nearest.distance_2(&[x, y]) <= radius * radius {
            Some(nearest.key.as_str())
        } else {
            None
        }
    }

    /// All node keys whose footprints intersect the given rectangle
    pub fn query_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&str> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.key.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::node::NodeCategory;

    fn node(key: &str, x: f64, y: f64) -> VisualNode {
        VisualNode {
            key: key.to_string(),
            x,
            y,
            pin_idx: None,
            is_plus: false,
            cluster_size: 1,
            label_text: None,
            category: NodeCategory::Approved,
            is_selected: false,
            alpha: 1.0,
        }
    }

    #[test]
    fn test_hit_inside_icon() {
        let nodes = vec![node("a", 100.0, 100.0), node("b", 300.0, 300.0)];
        let index = NodeIndex::build(&nodes, 34.0);
        assert_eq!(index.hit_test(105.0, 98.0), Some("a"));
        assert_eq!(index.hit_test(300.0, 300.0), Some("b"));
    }

    #[test]
    fn test_miss_outside_icon() {
        let nodes = vec![node("a", 100.0, 100.0)];
        let index = NodeIndex::build(&nodes, 34.0);
        assert_eq!(index.hit_test(200.0, 200.0), None);
    }

    #[test]
    fn test_query_rect() {
        let nodes = vec![node("a", 10.0, 10.0), node("b", 500.0, 500.0)];
        let index = NodeIndex::build(&nodes, 34.0);
        let mut hits = index.query_rect(0.0, 0.0, 100.0, 100.0);
        hits.sort();
        assert_eq!(hits, vec!["a"]);
    }

    #[test]
    fn test_empty_index() {
        let index = NodeIndex::build(&[], 34.0);
        assert!(index.is_empty());
        assert_eq!(index.hit_test(0.0, 0.0), None);
    }
}
