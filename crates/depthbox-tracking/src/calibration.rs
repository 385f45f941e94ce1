use glam::Vec2;

/// Neutral head offset, subtracted from the smoothed head position before publishing.
///
/// Session-only: starts at zero and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    offset: Vec2,
}

impl Calibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Head position relative to the calibrated origin.
    pub fn apply(&self, head: Vec2) -> Vec2 {
        head - self.offset
    }

    /// Make the current head position the new origin.
    ///
    /// The offset accumulates the currently published (already offset) position,
    /// so repeated calls keep re-centering instead of drifting.
    pub fn recenter(&mut self, head: Vec2) {
        self.offset += self.apply(head);
        tracing::info!(
            offset_x = self.offset.x,
            offset_y = self.offset.y,
            "Head calibration updated"
        );
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neutral() {
        let c = Calibration::new();
        assert_eq!(c.apply(Vec2::new(0.3, -0.2)), Vec2::new(0.3, -0.2));
    }

    #[test]
    fn recenter_zeroes_current_position() {
        let mut c = Calibration::new();
        c.recenter(Vec2::new(0.3, 0.1));
        assert!(c.apply(Vec2::new(0.3, 0.1)).length() < 1e-6);
    }

    #[test]
    fn repeated_recenter_tracks_latest_position() {
        let mut c = Calibration::new();
        c.recenter(Vec2::new(0.3, 0.1));
        c.recenter(Vec2::new(0.5, 0.1));
        assert!(c.apply(Vec2::new(0.5, 0.1)).length() < 1e-6);
        assert!((c.offset() - Vec2::new(0.5, 0.1)).length() < 1e-6);
    }
}
