//! Head and hand tracking for the parallax box.
//!
//! Landmark sets from an external engine are reduced to raw features,
//! smoothed, gated for liveness and calibrated, then published as a
//! [`VisionData`] snapshot once per rendered frame.

pub mod calibration;
pub mod error;
pub mod features;
pub mod gate;
pub mod pipeline;
pub mod scripted;
pub mod smoother;
pub mod source;
pub mod startup;
pub mod synth;
pub mod types;

pub use error::VisionError;
pub use pipeline::{VisionBackend, VisionPipeline};
pub use source::{
    Detection, LandmarkDetector, LandmarkEngine, LandmarkerOptions, ModelAssets, VideoFrame,
    VideoSource, VisionProvider,
};
pub use startup::VisionStartup;
pub use types::{HandState, HeadState, LandmarkSet, VisionData};

/// Hand hold window: absence tolerated before the hand gate drops.
pub const HOLD_MS: f64 = 150.0;
/// Continuous hand presence required before the hand gate opens.
pub const ACTIVATE_MS: f64 = 200.0;
/// Face hold window.
pub const FACE_HOLD_MS: f64 = 500.0;
/// Startup ready fallback.
pub const FALLBACK_MS: f64 = 6000.0;

pub const ALPHA_HEAD_XY: f32 = 0.3;
/// Slower than x/y: the eye-distance depth proxy is noisier.
pub const ALPHA_HEAD_Z: f32 = 0.1;
pub const ALPHA_TENSION: f32 = 0.2;

/// Head depth reported before any face has been seen.
pub const DEFAULT_HEAD_Z: f32 = 12.0;
