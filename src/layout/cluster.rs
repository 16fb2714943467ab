//! Grid-accelerated union-find clustering of projected points.
//!
//! Two points belong to the same cluster when their screen distance falls
//! below the collision threshold (`pin_diameter + collision_padding`).
//! Bucketing points into a uniform grid with that cell size means only the
//! 3×3 surrounding cells need a distance test. Membership is deterministic
//! for a fixed point set and visitation order.

use crate::layout::node::ProjectedPoint;
use crate::prelude::{HashMap, HashSet};

/// Union-find with union by rank and path compression
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
    }
}

/// Buckets point indices by grid cell
fn bucket_points(points: &[ProjectedPoint], cell_size: f64) -> HashMap<(i32, i32), Vec<usize>> {
    let mut grid: HashMap<(i32, i32), Vec<usize>> = HashMap::default();
    grid.reserve((points.len() / 4).max(16));
    for (i, p) in points.iter().enumerate() {
        let cx = (p.x / cell_size).floor() as i32;
        let cy = (p.y / cell_size).floor() as i32;
        grid.entry((cx, cy)).or_default().push(i);
    }
    grid
}

/// Unions every pair of points within the collision threshold
pub fn union_colliding(points: &[ProjectedPoint], threshold: f64, uf: &mut UnionFind) {
    let cell_size = threshold.max(1.0);
    let grid = bucket_points(points, cell_size);
    let threshold_sq = threshold * threshold;

    for (i, p) in points.iter().enumerate() {
        let cx = (p.x / cell_size).floor() as i32;
        let cy = (p.y / cell_size).floor() as i32;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in bucket {
                    if j <= i {
                        continue;
                    }
                    let q = &points[j];
                    let ddx = p.x - q.x;
                    let ddy = p.y - q.y;
                    if ddx * ddx + ddy * ddy <= threshold_sq {
                        uf.union(i, j);
                    }
                }
            }
        }
    }
}

/// Extracts clusters as member-index lists, ordered by first appearance of
/// their root and with members in ascending index order.
pub fn components(uf: &mut UnionFind, count: usize) -> Vec<Vec<usize>> {
    let mut position: HashMap<usize, usize> = HashMap::default();
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for i in 0..count {
        let root = uf.find(i);
        match position.get(&root) {
            Some(&pos) => clusters[pos].push(i),
            None => {
                position.insert(root, clusters.len());
                clusters.push(vec![i]);
            }
        }
    }
    clusters
}

/// Finds pairs of distinct clusters whose placed icons still collide.
///
/// `placed` carries `(cluster_ordinal, x, y)` per node. Returned pairs are
/// deduplicated and ordered by first detection.
pub fn colliding_cluster_pairs(placed: &[(usize, f64, f64)], threshold: f64) -> Vec<(usize, usize)> {
    let cell_size = threshold.max(1.0);
    let threshold_sq = threshold * threshold;

    let mut grid: HashMap<(i32, i32), Vec<usize>> = HashMap::default();
    for (i, &(_, x, y)) in placed.iter().enumerate() {
        let cx = (x / cell_size).floor() as i32;
        let cy = (y / cell_size).floor() as i32;
        grid.entry((cx, cy)).or_default().push(i);
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::default();
    let mut pairs = Vec::new();
    for (i, &(ci, x, y)) in placed.iter().enumerate() {
        let cx = (x / cell_size).floor() as i32;
        let cy = (y / cell_size).floor() as i32;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in bucket {
                    if j <= i {
                        continue;
                    }
                    let (cj, qx, qy) = placed[j];
                    if ci == cj {
                        continue;
                    }
                    let ddx = x - qx;
                    let ddy = y - qy;
                    if ddx * ddx + ddy * ddy < threshold_sq {
                        let key = (ci.min(cj), ci.max(cj));
                        if seen.insert(key) {
                            pairs.push(key);
                        }
                    }
                }
            }
        }
    }
    pairs
}
