//! Manually driven camera easing.
//!
//! The controller interpolates the viewport toward a requested target on
//! every redraw tick instead of delegating to the host map's native
//! animation, so layout-triggered moves (selection focus, cluster
//! expansion) stay frame-synchronized with the pin layout. Time is injected
//! through an explicit `now` argument, letting tests step the clock
//! deterministically.
//!
//! State machine: Idle ↔ Easing. A new request while easing cancels the
//! in-flight interpolation and restarts from the live camera state; there
//! is no queue. Reaching `t = 1` snaps to the exact target and returns to
//! Idle. A request whose target already matches the live camera within a
//! small epsilon is ignored to avoid redundant redraw churn.

use crate::animation::easing::{EasingFunction, Interpolation};
use crate::core::config::CameraConfig;
use crate::core::geo::{LatLng, Point};
use crate::surface::{CameraState, EdgePadding, MapSurface};
use instant::Instant;

/// Padding equality tolerance in pixels
const PADDING_EPSILON: f64 = 0.5;

/// A requested camera destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub center: LatLng,
    pub zoom: f64,
    pub padding: EdgePadding,
    /// Explicit duration override in milliseconds
    pub duration_ms: Option<f64>,
}

impl CameraTarget {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            padding: EdgePadding::ZERO,
            duration_ms: None,
        }
    }

    pub fn with_padding(mut self, padding: EdgePadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Builds a target centered on a screen position, as used for selection
    /// focus and cluster expansion.
    pub fn focus(surface: &dyn MapSurface, screen: Point, zoom: f64) -> Self {
        Self::new(surface.unproject(&screen), zoom)
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Easing {
        from: CameraState,
        to: CameraTarget,
        start: Instant,
        duration_ms: f64,
    },
}

/// Drives the camera toward requested targets, one tick per redraw
pub struct CameraController {
    config: CameraConfig,
    phase: Phase,
    pan_easing: EasingFunction,
    zoom_easing: EasingFunction,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            pan_easing: EasingFunction::EaseOutCubic,
            zoom_easing: EasingFunction::EaseInOutQuad,
        }
    }

    pub fn is_easing(&self) -> bool {
        matches!(self.phase, Phase::Easing { .. })
    }

    /// Requests an ease from the live camera state toward `target`.
    ///
    /// Returns false (and stays in the current phase) when the target
    /// already matches the live camera within epsilon. A request while
    /// easing restarts from `live`, cancelling the in-flight interpolation.
    pub fn request_ease(&mut self, live: CameraState, target: CameraTarget, now: Instant) -> bool {
        if self.matches_live(&live, &target) {
            return false;
        }
        let zoom_delta = (target.zoom - live.zoom).abs();
        let duration_ms = target
            .duration_ms
            .unwrap_or(self.config.min_duration_ms + self.config.ms_per_zoom_level * zoom_delta)
            .clamp(self.config.min_duration_ms, self.config.max_duration_ms);
        self.phase = Phase::Easing {
            from: live,
            to: target,
            start: now,
            duration_ms,
        };
        true
    }

    /// Advances the interpolation. Returns the camera state to apply this
    /// tick, or `None` when idle. At `t = 1` the exact target is returned
    /// and the controller transitions back to Idle.
    pub fn tick(&mut self, now: Instant) -> Option<CameraState> {
        let (from, to, start, duration_ms) = match &self.phase {
            Phase::Easing {
                from,
                to,
                start,
                duration_ms,
            } => (*from, *to, *start, *duration_ms),
            Phase::Idle => return None,
        };

        let elapsed_ms = now.saturating_duration_since(start).as_secs_f64() * 1000.0;
        let t = (elapsed_ms / duration_ms).clamp(0.0, 1.0);

        if t >= 1.0 {
            self.phase = Phase::Idle;
            return Some(CameraState {
                center: to.center,
                zoom: to.zoom,
                padding: to.padding,
            });
        }

        let pan_t = self.pan_easing.apply(t);
        let zoom_t = self.zoom_easing.apply(t);
        Some(CameraState {
            center: Interpolation::lat_lng(&from.center, &to.center, pan_t),
            zoom: Interpolation::linear(from.zoom, to.zoom, zoom_t),
            padding: from.padding.lerp(&to.padding, pan_t),
        })
    }

    /// Ticks the interpolation and pushes the frame into the surface.
    /// Returns true while the ease is still running.
    pub fn drive(&mut self, surface: &mut dyn MapSurface, now: Instant) -> bool {
        if let Some(state) = self.tick(now) {
            surface.jump_to(state.center, state.zoom);
            if self.is_easing() {
                surface.request_redraw();
                return true;
            }
        }
        false
    }

    fn matches_live(&self, live: &CameraState, target: &CameraTarget) -> bool {
        (live.center.lat - target.center.lat).abs() < self.config.center_epsilon
            && (live.center.lng - target.center.lng).abs() < self.config.center_epsilon
            && (live.zoom - target.zoom).abs() < self.config.zoom_epsilon
            && (live.padding.top - target.padding.top).abs() < PADDING_EPSILON
            && (live.padding.right - target.padding.right).abs() < PADDING_EPSILON
            && (live.padding.bottom - target.padding.bottom).abs() < PADDING_EPSILON
            && (live.padding.left - target.padding.left).abs() < PADDING_EPSILON
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
