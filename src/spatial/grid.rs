//! Grid-bucketed spatial hash of screen rectangles.
//!
//! Used by the label placer for O(1)-amortized collision checks against
//! already-placed icon footprints and label boxes, and by the engine's
//! inter-cluster collision scan. Each entry carries an owner key so boxes
//! belonging to the same marker never conflict with each other.

use crate::core::bounds::Bounds;
use crate::prelude::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    bounds: Bounds,
    owner: String,
}

/// Spatial hash over axis-aligned screen rectangles
#[derive(Debug)]
pub struct ScreenGrid {
    cell_size: f64,
    cells: HashMap<(i32, i32), Vec<usize>>,
    entries: Vec<Entry>,
}

impl ScreenGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::default(),
            entries: Vec::new(),
        }
    }

    fn cell_range(&self, bounds: &Bounds) -> (i32, i32, i32, i32) {
        (
            (bounds.min.x / self.cell_size).floor() as i32,
            (bounds.min.y / self.cell_size).floor() as i32,
            (bounds.max.x / self.cell_size).floor() as i32,
            (bounds.max.y / self.cell_size).floor() as i32,
        )
    }

    /// Inserts a rectangle under the given owner key
    pub fn insert(&mut self, bounds: Bounds, owner: impl Into<String>) {
        let idx = self.entries.len();
        let (x0, y0, x1, y1) = self.cell_range(&bounds);
        self.entries.push(Entry {
            bounds,
            owner: owner.into(),
        });
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(idx);
            }
        }
    }

    /// Returns true if the rectangle intersects any stored rectangle with a
    /// different owner.
    pub fn collides(&self, bounds: &Bounds, owner: &str) -> bool {
        let (x0, y0, x1, y1) = self.cell_range(bounds);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    for &idx in bucket {
                        let entry = &self.entries[idx];
                        if entry.owner != owner && entry.bounds.intersects(bounds) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
    }
}
