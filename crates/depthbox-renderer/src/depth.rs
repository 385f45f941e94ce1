//! Box depth driven by hand openness.
//!
//! While the hand is tracked, depth follows a smoothed tension. When tracking
//! drops, the tension from [`LOOKBACK_MS`] before the loss is restored, so the
//! transient of a hand leaving the frame does not stick.

use depthbox_tracking::HandState;
use std::collections::VecDeque;
use tracing::debug;

pub const DEPTH_ALPHA: f32 = 0.15;
pub const LOOKBACK_MS: f64 = 200.0;
/// About one second at 60 Hz.
pub const HISTORY_CAPACITY: usize = 60;
pub const INITIAL_TENSION: f32 = 0.5;
/// Depth of a closed fist.
pub const MAX_DEPTH: f32 = 60.0;
/// Depth of an open hand.
pub const MIN_DEPTH: f32 = 2.0;

/// Box depth for a smoothed tension in [0, 1].
pub fn depth_for(tension: f32) -> f32 {
    MAX_DEPTH + (MIN_DEPTH - MAX_DEPTH) * tension.clamp(0.0, 1.0)
}

/// Bounded, time-ordered `(tension, time_ms)` samples. Oldest evicted first.
#[derive(Debug, Clone)]
pub struct TensionHistory {
    entries: VecDeque<(f32, f64)>,
    capacity: usize,
}

impl TensionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, tension: f32, time: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((tension, time));
    }

    /// The newest sample taken at or before `cutoff`, skipping the trailing
    /// tail. Falls back to the oldest sample when all are newer.
    pub fn sample_before(&self, cutoff: f64) -> Option<f32> {
        self.entries
            .iter()
            .rev()
            .find(|(_, time)| *time <= cutoff)
            .or_else(|| self.entries.front())
            .map(|(tension, _)| *tension)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone)]
pub struct DepthController {
    smoothed: f32,
    was_active: bool,
    history: TensionHistory,
}

impl DepthController {
    pub fn new() -> Self {
        Self {
            smoothed: INITIAL_TENSION,
            was_active: false,
            history: TensionHistory::new(HISTORY_CAPACITY),
        }
    }

    /// Advance one frame at `now` (ms) and return the new depth.
    pub fn update(&mut self, hand: &HandState, now: f64) -> f32 {
        if hand.active {
            self.history.push(hand.tension, now);
            self.smoothed += DEPTH_ALPHA * (hand.tension - self.smoothed);
            self.was_active = true;
        } else if self.was_active {
            if let Some(restored) = self.history.sample_before(now - LOOKBACK_MS) {
                debug!(
                    restored,
                    discarded = self.smoothed,
                    "Hand lost, restoring pre-dropout tension"
                );
                self.smoothed = restored;
            }
            self.history.clear();
            self.was_active = false;
        }
        self.depth()
    }

    pub fn depth(&self) -> f32 {
        depth_for(self.smoothed)
    }

    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    pub fn was_active(&self) -> bool {
        self.was_active
    }

    pub fn history(&self) -> &TensionHistory {
        &self.history
    }
}

impl Default for DepthController {
    fn default() -> Self {
        Self::new()
    }
}
