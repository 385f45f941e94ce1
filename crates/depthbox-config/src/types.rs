use glam::Vec2;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Head-coupled off-axis projection on startup.
    pub parallax_enabled: bool,
    /// Hand openness drives the back wall depth on startup.
    pub hand_control_enabled: bool,
    /// Virtual window width and height in world units.
    #[serde(deserialize_with = "vec2_serde::deserialize")]
    pub window: Vec2,
    /// Wall and frame color (linear RGB, 0-1).
    pub wall_color: [f32; 3],
    /// Vision input configuration.
    pub vision: VisionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parallax_enabled: true,
            hand_control_enabled: true,
            window: Vec2::new(14.0, 9.0),
            // #00ffcc
            wall_color: [0.0, 1.0, 0.8],
            vision: VisionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Replace values that would break the projection with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.window.x > 0.0 && self.window.y > 0.0) || !self.window.is_finite() {
            tracing::warn!(window = ?self.window, "Invalid window size, using default");
            self.window = defaults.window;
        }
        for c in &mut self.wall_color {
            *c = if c.is_finite() { c.clamp(0.0, 1.0) } else { 1.0 };
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Where head and hand landmarks come from.
    pub source: TrackingSource,
    /// Directory holding `face_landmarker.task` and `hand_landmarker.task`.
    pub model_base: PathBuf,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            source: TrackingSource::Pointer,
            model_base: PathBuf::from("mediapipe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingSource {
    /// Landmarks synthesized from the mouse pointer.
    Pointer,
    /// No tracking; the pipeline stays degraded.
    Disabled,
}

// glam's own serde form is a struct; a plain array reads better in TOML.
mod vec2_serde {
    use glam::Vec2;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec2, D::Error> {
        let [x, y] = <[f32; 2]>::deserialize(d)?;
        Ok(Vec2::new(x, y))
    }
}
