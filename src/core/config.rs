//! Configuration for layout behavior and tuning
//!
//! The cost weights and iteration caps below are empirically tuned values,
//! not derived quantities. They are exposed as named fields so callers can
//! override individual knobs without forking the engine.

use crate::core::constants;

/// Top-level configuration for one layout engine instance
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Rendered pin icon diameter in pixels
    pub pin_diameter: f64,
    /// Extra spacing between icon footprints before they collide
    pub collision_padding: f64,
    /// Maximum individually rendered members per cluster
    pub honeycomb_max: usize,
    /// Candidate slots generated above the visible member count
    pub slot_margin: usize,
    /// Iteration cap for the inter-cluster merge loop
    pub merge_iteration_cap: usize,
    pub visibility: VisibilityConfig,
    pub weights: AssignmentWeights,
    pub label: LabelConfig,
    pub camera: CameraConfig,
}

impl LayoutConfig {
    /// Screen distance below which two icons are considered colliding
    pub fn collision_threshold(&self) -> f64 {
        self.pin_diameter + self.collision_padding
    }

    /// Center-to-center spacing of adjacent honeycomb slots
    pub fn hex_spacing(&self) -> f64 {
        self.pin_diameter + self.collision_padding
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pin_diameter: constants::PIN_DIAMETER,
            collision_padding: constants::COLLISION_PADDING,
            honeycomb_max: constants::HONEYCOMB_MAX,
            slot_margin: constants::SLOT_MARGIN,
            merge_iteration_cap: constants::MERGE_ITERATION_CAP,
            visibility: VisibilityConfig::default(),
            weights: AssignmentWeights::default(),
            label: LabelConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

/// Spherical-visibility fade parameters for globe projections
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityConfig {
    /// Degrees from the horizon over which visibility fades to zero
    pub fade_degrees: f64,
    /// Alpha below which a point is excluded outright
    pub hard_cutoff: f64,
    /// Alpha below which a near-horizon point is dropped before clustering
    pub edge_drop: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            fade_degrees: constants::VISIBILITY_FADE_DEGREES,
            hard_cutoff: constants::VISIBILITY_HARD_CUTOFF,
            edge_drop: constants::VISIBILITY_EDGE_DROP,
        }
    }
}

/// Cost-function weights for the slot assignment solver.
///
/// All magnitudes are empirical. The stability terms dominate the distance
/// terms so that pins keep their slots when unrelated pins enter or leave
/// a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentWeights {
    /// Slots within this radius of the centroid skip the angular penalty
    pub near_center_radius: f64,
    /// Per-radian penalty for slots away from the pin's own angle
    pub angle_mismatch: f64,
    /// Radius beyond which the overflow penalty applies
    pub radius_soft_cap: f64,
    /// Per-pixel penalty past the soft cap
    pub radius_overflow: f64,
    /// Penalty for taking a slot another pin occupied last pass
    pub occupied: f64,
    /// Per-neighbor penalty for moving into an already dense region
    pub crowding: f64,
    /// Subtracted when a pin is offered its own cached slot
    pub cache_reuse_bonus: f64,
    /// Added to every other slot once a pin has a cached slot
    pub cache_abandon: f64,
}

impl Default for AssignmentWeights {
    fn default() -> Self {
        Self {
            near_center_radius: 60.0,
            angle_mismatch: 900.0,
            radius_soft_cap: 120.0,
            radius_overflow: 45.0,
            occupied: 6_000.0,
            crowding: 350.0,
            cache_reuse_bonus: 10_000.0,
            cache_abandon: 1_200.0,
        }
    }
}

/// Label sizing and placement parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LabelConfig {
    /// Horizontal gap between the icon edge and the label box
    pub gap: f64,
    /// Label box height in pixels
    pub height: f64,
    /// Font size used by the width estimator
    pub font_size: f64,
    /// Padding added around the measured text
    pub padding: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            gap: 6.0,
            height: 18.0,
            font_size: 13.0,
            padding: 4.0,
        }
    }
}

/// Camera easing parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Minimum ease duration in milliseconds
    pub min_duration_ms: f64,
    /// Maximum ease duration in milliseconds
    pub max_duration_ms: f64,
    /// Added duration per zoom level of travel
    pub ms_per_zoom_level: f64,
    /// Center delta (degrees) below which a request is a no-op
    pub center_epsilon: f64,
    /// Zoom delta below which a request is a no-op
    pub zoom_epsilon: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: constants::CAMERA_MIN_DURATION_MS,
            max_duration_ms: constants::CAMERA_MAX_DURATION_MS,
            ms_per_zoom_level: constants::CAMERA_MS_PER_ZOOM_LEVEL,
            center_epsilon: 1e-6,
            zoom_epsilon: 1e-3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = LayoutConfig::default();
        assert_eq!(config.collision_threshold(), 40.0);
        assert_eq!(config.hex_spacing(), 40.0);
        assert_eq!(config.merge_iteration_cap, 8);
    }

    #[test]
    fn test_weights_are_overridable() {
        let mut config = LayoutConfig::default();
        config.weights.cache_reuse_bonus = 0.0;
        assert_ne!(config.weights, AssignmentWeights::default());
    }
}
