//! Input and output data model of the layout pass.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Moderation state of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinKind {
    Approved,
    Pending,
}

/// A user-submitted geographic marker. Owned by the external data layer;
/// the layout engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub icon: String,
    pub nickname: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub genders: Vec<String>,
    pub kind: PinKind,
    /// Insertion order assigned by the data layer; used for deterministic
    /// overflow selection and label priority.
    pub order: u64,
}

impl Pin {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            icon: String::new(),
            nickname: String::new(),
            age: None,
            genders: Vec::new(),
            kind: PinKind::Approved,
            order: 0,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    pub fn with_kind(mut self, kind: PinKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_order(mut self, order: u64) -> Self {
        self.order = order;
        self
    }

    /// Text shown in this pin's label, if any
    pub fn label_text(&self) -> Option<String> {
        if self.nickname.is_empty() {
            return None;
        }
        match self.age {
            Some(age) => Some(format!("{}, {}", self.nickname, age)),
            None => Some(self.nickname.clone()),
        }
    }

    /// Parses a JSON array of pins handed over by the data layer,
    /// rejecting out-of-range coordinates
    pub fn from_json_slice(bytes: &[u8]) -> Result<Vec<Pin>> {
        let pins: Vec<Pin> = serde_json::from_slice(bytes)?;
        for pin in &pins {
            if !crate::core::geo::LatLng::new(pin.lat, pin.lng).is_valid() {
                return Err(crate::Error::InvalidCoordinates(format!(
                    "pin {}: ({}, {})",
                    pin.id, pin.lat, pin.lng
                )));
            }
        }
        Ok(pins)
    }
}

/// A pin projected to screen space for the current pass
#[derive(Debug, Clone, Copy)]
pub struct ProjectedPoint {
    /// Index into the combined pin slice of this pass
    pub pin_idx: usize,
    pub x: f64,
    pub y: f64,
    /// Spherical visibility fade weight, 1.0 in flat mode
    pub alpha: f64,
}

/// Render category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Approved,
    Pending,
    /// Synthetic "+N" marker for cluster members past the honeycomb cap
    Overflow,
}

/// Final render unit produced by a layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub key: String,
    pub x: f64,
    pub y: f64,
    /// Index into the pass's pin slice; `None` for the overflow node
    pub pin_idx: Option<usize>,
    pub is_plus: bool,
    /// Total member count of the owning cluster
    pub cluster_size: usize,
    pub label_text: Option<String>,
    pub category: NodeCategory,
    pub is_selected: bool,
    /// Spherical visibility fade weight carried through for the renderer
    pub alpha: f64,
}

/// Side a label is anchored to, relative to its marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSide {
    Left,
    Right,
}

/// An accepted text label box. At most one per pin per pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBox {
    pub pin_key: String,
    pub side: LabelSide,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub width: f64,
    pub height: f64,
    pub priority: u32,
}
