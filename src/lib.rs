//! # Pinlet
//!
//! A pin visual layout engine for interactive maps.
//!
//! Pinlet turns a list of geographic markers ("pins") into a frame-by-frame
//! stable set of non-overlapping screen markers and text labels: spatial
//! clustering, honeycomb slot assignment, greedy label placement, and the
//! spherical-visibility fade used in globe projections. Basemap rendering,
//! data fetching, and UI chrome live behind the [`MapSurface`] seam and are
//! not part of this crate.

pub mod animation;
pub mod core;
pub mod layout;
pub mod projector;
pub mod spatial;
pub mod surface;

mod prelude;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::LayoutConfig,
    geo::{LatLng, Point},
};

pub use crate::layout::{
    engine::{LayoutContext, LayoutFrame},
    node::{LabelBox, LabelSide, NodeCategory, Pin, PinKind, VisualNode},
};

pub use crate::animation::camera::{CameraController, CameraTarget};

pub use crate::projector::{GeoProjector, ProjectedPoint};

pub use crate::spatial::index::NodeIndex;

pub use crate::surface::{CameraState, EdgePadding, MapSurface, ProjectionKind};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = LayoutError;
