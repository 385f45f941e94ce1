//! Per-modality liveness and activation.
//!
//! Times are milliseconds on the pipeline clock.

use crate::{ACTIVATE_MS, FACE_HOLD_MS, HOLD_MS};

/// Liveness state machine for one tracked modality.
///
/// A gate is live while the last detection is younger than `hold_ms`. With an
/// activation delay it additionally requires an unbroken run of detections
/// longer than `activate_ms`; absence beyond `hold_ms` breaks the run.
#[derive(Debug, Clone)]
pub struct TrackingGate {
    hold_ms: f64,
    activate_ms: Option<f64>,
    last_seen: Option<f64>,
    continuous_since: Option<f64>,
}

impl TrackingGate {
    pub fn new(hold_ms: f64, activate_ms: Option<f64>) -> Self {
        Self {
            hold_ms,
            activate_ms,
            last_seen: None,
            continuous_since: None,
        }
    }

    /// Faces are expected to be present and rarely false-positive: no activation delay.
    pub fn face() -> Self {
        Self::new(FACE_HOLD_MS, None)
    }

    /// Short hold for a snappy release, activation delay against one-frame ghosts.
    pub fn hand() -> Self {
        Self::new(HOLD_MS, Some(ACTIVATE_MS))
    }

    /// Record a usable detection at `now`.
    ///
    /// A gap longer than `hold_ms` since the last detection restarts the run,
    /// whether or not absent frames were reported in between.
    pub fn observe(&mut self, now: f64) {
        let lapsed = self.last_seen.is_some_and(|t| now - t > self.hold_ms);
        if lapsed || self.continuous_since.is_none() {
            self.continuous_since = Some(now);
        }
        self.last_seen = Some(self.last_seen.map_or(now, |t| t.max(now)));
    }

    /// Record a processed frame without a usable detection.
    pub fn mark_absent(&mut self, now: f64) {
        let expired = self.last_seen.map_or(true, |t| now - t > self.hold_ms);
        if expired {
            self.continuous_since = None;
        }
    }

    pub fn is_active(&self, now: f64) -> bool {
        let Some(last_seen) = self.last_seen else {
            return false;
        };
        if now - last_seen >= self.hold_ms {
            return false;
        }
        match self.activate_ms {
            None => true,
            Some(delay) => self
                .continuous_since
                .is_some_and(|start| now - start > delay),
        }
    }

    pub fn last_seen(&self) -> Option<f64> {
        self.last_seen
    }

    pub fn continuous_since(&self) -> Option<f64> {
        self.continuous_since
    }
}
