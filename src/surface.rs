//! The seam between the layout engine and the host map rendering surface.
//!
//! Everything the engine needs from the basemap is expressed through the
//! [`MapSurface`] trait: coordinate projection, camera state, projection
//! mode, container size, and camera mutation. The engine never talks to a
//! concrete renderer. `MercatorSurface` and `GlobeSurface` are reference
//! implementations used by tests and headless callers.

use crate::core::geo::{dot3, LatLng, Point};
use std::cell::Cell;
use std::f64::consts::PI;

/// Projection mode reported by the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Flat (mercator-like) projection; every point is fully visible
    Flat,
    /// Spherical (globe) projection; far-hemisphere points are occluded
    Globe,
}

/// Padding applied around the viewport when focusing the camera
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgePadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl EdgePadding {
    pub const ZERO: EdgePadding = EdgePadding {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn uniform(amount: f64) -> Self {
        Self {
            top: amount,
            right: amount,
            bottom: amount,
            left: amount,
        }
    }

    pub fn lerp(&self, other: &EdgePadding, t: f64) -> EdgePadding {
        EdgePadding {
            top: self.top + (other.top - self.top) * t,
            right: self.right + (other.right - self.right) * t,
            bottom: self.bottom + (other.bottom - self.bottom) * t,
            left: self.left + (other.left - self.left) * t,
        }
    }
}

/// Snapshot of the live camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub center: LatLng,
    pub zoom: f64,
    pub padding: EdgePadding,
}

impl CameraState {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            padding: EdgePadding::ZERO,
        }
    }

    /// Captures the current camera of a surface
    pub fn of(surface: &dyn MapSurface) -> Self {
        Self::new(surface.center(), surface.zoom())
    }
}

/// Contract between the layout engine and the host map surface.
///
/// Projected coordinates are container-relative CSS pixels. A surface may
/// return non-finite coordinates for degenerate projections (antimeridian or
/// pole artifacts); the engine filters those out rather than treating them
/// as errors.
pub trait MapSurface {
    /// Projects a geographic coordinate to container-relative screen pixels
    fn project(&self, lat_lng: &LatLng) -> Point;

    /// Converts screen pixels back to a geographic coordinate
    fn unproject(&self, point: &Point) -> LatLng;

    fn zoom(&self) -> f64;

    fn center(&self) -> LatLng;

    fn projection(&self) -> ProjectionKind;

    /// Viewport size in CSS pixels
    fn container_size(&self) -> Point;

    /// Moves the camera immediately, without host-side animation
    fn jump_to(&mut self, center: LatLng, zoom: f64);

    /// Host-native animated move. The camera controller drives its own
    /// interpolation through `jump_to`, so the default forwards there.
    fn ease_to(&mut self, center: LatLng, zoom: f64, _duration_ms: f64) {
        self.jump_to(center, zoom);
    }

    /// Asks the host for a redraw on the next frame
    fn request_redraw(&self);
}

/// Reference flat surface using the standard Web Mercator projection
/// (EPSG:3857), with the pixel origin at the viewport center.
#[derive(Debug, Clone)]
pub struct MercatorSurface {
    center: LatLng,
    zoom: f64,
    size: Point,
    redraw_requests: Cell<u32>,
}

impl MercatorSurface {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            redraw_requests: Cell::new(0),
        }
    }

    /// Number of redraws requested since construction
    pub fn redraw_requests(&self) -> u32 {
        self.redraw_requests.get()
    }

    /// Projects to world pixel coordinates at the current zoom level
    fn project_world(&self, lat_lng: &LatLng) -> Point {
        const EARTH_RADIUS: f64 = 6378137.0;
        let scale = 256.0 * 2_f64.powf(self.zoom);

        let lat = LatLng::clamp_lat(lat_lng.lat);
        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;

        let pixel_x = (x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;
        let pixel_y = (-y + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;

        Point::new(pixel_x, pixel_y)
    }

    fn unproject_world(&self, pixel: &Point) -> LatLng {
        const EARTH_RADIUS: f64 = 6378137.0;
        let scale = 256.0 * 2_f64.powf(self.zoom);

        let x = (pixel.x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * (2.0 * PI * EARTH_RADIUS);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }
}

impl MapSurface for MercatorSurface {
    fn project(&self, lat_lng: &LatLng) -> Point {
        let world = self.project_world(lat_lng);
        let origin = self.project_world(&self.center);
        Point::new(
            world.x - origin.x + self.size.x / 2.0,
            world.y - origin.y + self.size.y / 2.0,
        )
    }

    fn unproject(&self, point: &Point) -> LatLng {
        let origin = self.project_world(&self.center);
        let world = Point::new(
            point.x + origin.x - self.size.x / 2.0,
            point.y + origin.y - self.size.y / 2.0,
        );
        self.unproject_world(&world)
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn projection(&self) -> ProjectionKind {
        ProjectionKind::Flat
    }

    fn container_size(&self) -> Point {
        self.size
    }

    fn jump_to(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    fn request_redraw(&self) {
        self.redraw_requests.set(self.redraw_requests.get() + 1);
    }
}

/// Reference globe surface using an orthographic projection looking at the
/// camera center. Far-hemisphere points still project to finite coordinates;
/// occlusion is handled by the visibility fade, not the projection.
#[derive(Debug, Clone)]
pub struct GlobeSurface {
    center: LatLng,
    zoom: f64,
    size: Point,
    redraw_requests: Cell<u32>,
}

impl GlobeSurface {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            redraw_requests: Cell::new(0),
        }
    }

    pub fn redraw_requests(&self) -> u32 {
        self.redraw_requests.get()
    }

    /// Globe radius in screen pixels at the current zoom
    fn radius_px(&self) -> f64 {
        128.0 * 2_f64.powf(self.zoom)
    }

    /// East/north tangent basis at the look-at center
    fn basis(&self) -> ([f64; 3], [f64; 3], [f64; 3]) {
        let up = self.center.to_unit_vector();
        // East is undefined exactly at the poles; nudge off the singularity.
        let east = if up[0].abs() < 1e-12 && up[1].abs() < 1e-12 {
            [0.0, 1.0, 0.0]
        } else {
            let len = (up[0] * up[0] + up[1] * up[1]).sqrt();
            [-up[1] / len, up[0] / len, 0.0]
        };
        let north = [
            up[1] * east[2] - up[2] * east[1],
            up[2] * east[0] - up[0] * east[2],
            up[0] * east[1] - up[1] * east[0],
        ];
        (up, east, north)
    }
}

impl MapSurface for GlobeSurface {
    fn project(&self, lat_lng: &LatLng) -> Point {
        let (_, east, north) = self.basis();
        let p = lat_lng.to_unit_vector();
        let r = self.radius_px();
        Point::new(
            r * dot3(&p, &east) + self.size.x / 2.0,
            -r * dot3(&p, &north) + self.size.y / 2.0,
        )
    }

    fn unproject(&self, point: &Point) -> LatLng {
        let (up, east, north) = self.basis();
        let r = self.radius_px();
        let mut ex = (point.x - self.size.x / 2.0) / r;
        let mut ny = -(point.y - self.size.y / 2.0) / r;

        // Clamp points outside the disc onto the horizon circle.
        let len_sq = ex * ex + ny * ny;
        if len_sq > 1.0 {
            let len = len_sq.sqrt();
            ex /= len;
            ny /= len;
        }
        let z = (1.0 - (ex * ex + ny * ny)).max(0.0).sqrt();

        let p = [
            up[0] * z + east[0] * ex + north[0] * ny,
            up[1] * z + east[1] * ex + north[1] * ny,
            up[2] * z + east[2] * ex + north[2] * ny,
        ];
        LatLng::new(
            p[2].clamp(-1.0, 1.0).asin().to_degrees(),
            p[1].atan2(p[0]).to_degrees(),
        )
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn projection(&self) -> ProjectionKind {
        ProjectionKind::Globe
    }

    fn container_size(&self) -> Point {
        self.size
    }

    fn jump_to(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    fn request_redraw(&self) {
        self.redraw_requests.set(self.redraw_requests.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_center_projects_to_viewport_center() {
        let surface = MercatorSurface::new(LatLng::new(12.0, 34.0), 5.0, Point::new(800.0, 600.0));
        let px = surface.project(&LatLng::new(12.0, 34.0));
        assert!((px.x - 400.0).abs() < 1e-6);
        assert!((px.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_mercator_round_trip() {
        let surface = MercatorSurface::new(LatLng::new(0.0, 0.0), 4.0, Point::new(512.0, 512.0));
        let original = LatLng::new(37.7749, -122.4194);
        let back = surface.unproject(&surface.project(&original));
        assert!((back.lat - original.lat).abs() < 1e-6);
        assert!((back.lng - original.lng).abs() < 1e-6);
    }

    #[test]
    fn test_globe_center_projects_to_viewport_center() {
        let surface = GlobeSurface::new(LatLng::new(48.0, 2.0), 2.0, Point::new(640.0, 480.0));
        let px = surface.project(&LatLng::new(48.0, 2.0));
        assert!((px.x - 320.0).abs() < 1e-6);
        assert!((px.y - 240.0).abs() < 1e-6);
    }

    #[test]
    fn test_globe_round_trip_near_center() {
        let surface = GlobeSurface::new(LatLng::new(10.0, 20.0), 3.0, Point::new(640.0, 480.0));
        let original = LatLng::new(12.0, 22.5);
        let back = surface.unproject(&surface.project(&original));
        assert!((back.lat - original.lat).abs() < 1e-6);
        assert!((back.lng - original.lng).abs() < 1e-6);
    }

    #[test]
    fn test_redraw_request_counter() {
        let surface = MercatorSurface::new(LatLng::default(), 1.0, Point::new(100.0, 100.0));
        surface.request_redraw();
        surface.request_redraw();
        assert_eq!(surface.redraw_requests(), 2);
    }
}
