//! Projects pins into screen space and applies the spherical visibility fade.
//!
//! Degenerate projections (non-finite coordinates from antimeridian or pole
//! artifacts) are filtered out here, before clustering, and are never
//! propagated as errors. In globe mode, points facing away from the camera
//! or sitting too close to the horizon are excluded entirely, so no layout
//! work is spent on markers about to be occluded and labels do not flicker
//! at the horizon.

use crate::core::config::VisibilityConfig;
use crate::core::geo::{dot3, LatLng};
use crate::layout::node::Pin;
use crate::surface::{MapSurface, ProjectionKind};

pub use crate::layout::node::ProjectedPoint;

/// Stateless projection helper for one layout pass
pub struct GeoProjector;

impl GeoProjector {
    /// Projects every pin, dropping non-finite and occluded points.
    /// `pin_idx` refers into the supplied slice.
    pub fn project_pins(
        surface: &dyn MapSurface,
        pins: &[Pin],
        visibility: &VisibilityConfig,
    ) -> Vec<ProjectedPoint> {
        let globe = surface.projection() == ProjectionKind::Globe;
        let look_at = surface.center().to_unit_vector();

        let mut points = Vec::with_capacity(pins.len());
        for (pin_idx, pin) in pins.iter().enumerate() {
            let lat_lng = LatLng::new(pin.lat, pin.lng);
            let px = surface.project(&lat_lng);
            if !px.is_finite() {
                continue;
            }

            let alpha = if globe {
                Self::visibility_alpha(&lat_lng, &look_at, visibility)
            } else {
                1.0
            };
            if alpha < visibility.hard_cutoff || alpha < visibility.edge_drop {
                continue;
            }

            points.push(ProjectedPoint {
                pin_idx,
                x: px.x,
                y: px.y,
                alpha,
            });
        }
        points
    }

    /// Visibility weight of a point on the sphere relative to the camera
    /// look-at center: `clamp01(dot / cos(90° − fade_degrees))` while the
    /// point faces the viewer, 0 on the far hemisphere.
    pub fn visibility_alpha(
        lat_lng: &LatLng,
        look_at: &[f64; 3],
        visibility: &VisibilityConfig,
    ) -> f64 {
        let dot = dot3(&lat_lng.to_unit_vector(), look_at);
        if dot <= 0.0 {
            return 0.0;
        }
        let fade_band = (90.0 - visibility.fade_degrees).to_radians().cos();
        if fade_band <= 0.0 {
            return 1.0;
        }
        (dot / fade_band).clamp(0.0, 1.0)
    }
}
