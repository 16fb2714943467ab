//! Engine-wide named magic numbers.
//! Keeping them in a single place makes it easier to tweak engine-wide tuning.

/// Rendered pin icon diameter in CSS pixels.
pub const PIN_DIAMETER: f64 = 34.0;

/// Extra spacing between icon footprints before they count as colliding.
pub const COLLISION_PADDING: f64 = 6.0;

/// Maximum individually rendered members per cluster; the rest collapse
/// into a single "+N" overflow node.
pub const HONEYCOMB_MAX: usize = 25;

/// Extra candidate slots generated above the visible member count.
pub const SLOT_MARGIN: usize = 4;

/// Maximum iterations of the cluster-merge loop before residual overlap
/// is accepted. Empirically tuned; see `LayoutConfig`.
pub const MERGE_ITERATION_CAP: usize = 8;

/// Degrees from the globe horizon over which visibility fades to zero.
pub const VISIBILITY_FADE_DEGREES: f64 = 18.0;

/// Visibility alpha below which a point is excluded outright.
pub const VISIBILITY_HARD_CUTOFF: f64 = 0.12;

/// Visibility alpha below which a point near the horizon is dropped
/// before clustering, preventing label flicker at the edge.
pub const VISIBILITY_EDGE_DROP: f64 = 0.30;

/// Camera ease duration bounds in milliseconds.
pub const CAMERA_MIN_DURATION_MS: f64 = 450.0;
pub const CAMERA_MAX_DURATION_MS: f64 = 1400.0;

/// Added ease duration per zoom level of distance.
pub const CAMERA_MS_PER_ZOOM_LEVEL: f64 = 320.0;

/// Capacity of the last-good layout fallback cache.
pub const LAST_GOOD_CAPACITY: usize = 8;
