//! Prelude module for common pinlet types
//!
//! Internal convenience re-exports used across the crate.

#![allow(unused_imports)]

pub use crate::core::{
    bounds::Bounds,
    config::LayoutConfig,
    geo::{LatLng, Point},
};

pub use crate::{Error as PinletError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
