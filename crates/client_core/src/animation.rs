//! Owned handle for one running orbit animation. The handle is the only way
//! to stop it, and dropping the handle stops it.

use std::{
    f64::consts::TAU,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use tracing::debug;

use crate::geometry::TransitGeometry;

/// Repaint cadence renderers should request while an animation runs.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub struct OrbitAnimation {
    owner: String,
    geometry: TransitGeometry,
    started_at: Instant,
    running: Arc<AtomicBool>,
}

/// Read-only view of a handle's running flag that outlives the handle.
#[derive(Debug, Clone)]
pub struct RunningFlag(Arc<AtomicBool>);

impl RunningFlag {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Planet centre relative to the star centre for one frame. The planet is
/// always drawn over the star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitFrame {
    pub x_px: f64,
    pub y_px: f64,
}

impl OrbitAnimation {
    pub fn start(owner: impl Into<String>, geometry: &TransitGeometry) -> Self {
        let owner = owner.into();
        debug!(owner = %owner, period_ms = geometry.angular_period_ms, "animation: started");
        Self {
            owner,
            geometry: *geometry,
            started_at: Instant::now(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn geometry(&self) -> &TransitGeometry {
        &self.geometry
    }

    pub fn running_flag(&self) -> RunningFlag {
        RunningFlag(self.running.clone())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::Relaxed) {
            debug!(owner = %self.owner, "animation: stopped");
        }
    }

    /// Orbit angle in radians at `now`, one full turn per angular period.
    /// `None` once stopped.
    pub fn rotation_at(&self, now: Instant) -> Option<f64> {
        if !self.is_running() {
            return None;
        }
        let period_ms = self.geometry.angular_period_ms;
        if period_ms <= 0.0 {
            return Some(0.0);
        }
        let elapsed_ms = now.saturating_duration_since(self.started_at).as_secs_f64() * 1000.0;
        Some((elapsed_ms / period_ms).fract() * TAU)
    }

    pub fn frame_at(&self, now: Instant) -> Option<OrbitFrame> {
        self.rotation_at(now)
            .map(|angle| orbit_frame(&self.geometry, angle))
    }
}

impl Drop for OrbitAnimation {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Circular orbit centred `vertical_offset_px` below the star centre. The
/// planet starts at the leftmost point and turns clockwise on screen.
pub fn orbit_frame(geometry: &TransitGeometry, angle: f64) -> OrbitFrame {
    let radius = geometry.orbit_diameter_px / 2.0;
    OrbitFrame {
        x_px: -radius * angle.cos(),
        y_px: geometry.vertical_offset_px - radius * angle.sin(),
    }
}
