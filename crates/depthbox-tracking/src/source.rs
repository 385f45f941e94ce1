//! Seams to the camera and the landmark inference engine.

use crate::error::VisionError;
use crate::types::LandmarkSet;
use std::path::{Path, PathBuf};

/// One presented video frame, borrowed from its source.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub width: u32,
    pub height: u32,
    /// Packed RGB8 pixels. Empty for sources that carry no image.
    pub pixels: &'a [u8],
    /// Presentation time in seconds.
    pub time: f64,
}

/// A live video surface presenting frames at roughly camera rate.
///
/// Dropping the source releases the underlying stream.
pub trait VideoSource: Send {
    /// Whether a frame with data is available yet.
    fn is_ready(&self) -> bool;

    /// Presentation time of the current frame in seconds. Monotonic.
    fn current_time(&self) -> f64;

    /// The current frame.
    fn frame(&self) -> VideoFrame<'_>;
}

/// Result of running one detector on one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub landmarks: Vec<LandmarkSet>,
}

impl Detection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(set: LandmarkSet) -> Self {
        Self {
            landmarks: vec![set],
        }
    }

    /// The first detected set, if any.
    pub fn first(&self) -> Option<&LandmarkSet> {
        self.landmarks.first()
    }
}

/// A landmark detector running in video mode.
pub trait LandmarkDetector: Send {
    /// Detect landmarks in `frame`. `timestamp_ms` must increase between calls.
    fn detect_for_video(
        &mut self,
        frame: &VideoFrame<'_>,
        timestamp_ms: f64,
    ) -> Result<Detection, VisionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningMode {
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegate {
    Gpu,
}

#[derive(Debug, Clone)]
pub struct LandmarkerOptions {
    pub model_asset_path: PathBuf,
    pub delegate: Delegate,
    pub running_mode: RunningMode,
    /// Maximum faces or hands reported per frame.
    pub max_results: u32,
    /// Face only; requested but not consumed by the pipeline.
    pub output_face_blendshapes: bool,
}

/// Factory for face and hand detectors.
pub trait LandmarkEngine: Send {
    fn face_landmarker(
        &mut self,
        options: &LandmarkerOptions,
    ) -> Result<Box<dyn LandmarkDetector>, VisionError>;

    fn hand_landmarker(
        &mut self,
        options: &LandmarkerOptions,
    ) -> Result<Box<dyn LandmarkDetector>, VisionError>;
}

/// Acquires the video source and landmark engine during startup.
///
/// Both calls may block; startup runs them off the render thread.
pub trait VisionProvider: Send {
    fn open_video(&mut self) -> Result<Box<dyn VideoSource>, VisionError>;

    fn open_engine(&mut self) -> Result<Box<dyn LandmarkEngine>, VisionError>;
}

/// Location of the landmark model files.
#[derive(Debug, Clone)]
pub struct ModelAssets {
    base: PathBuf,
}

impl ModelAssets {
    pub const FACE_MODEL: &'static str = "face_landmarker.task";
    pub const HAND_MODEL: &'static str = "hand_landmarker.task";

    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn face_model(&self) -> PathBuf {
        self.base.join(Self::FACE_MODEL)
    }

    pub fn hand_model(&self) -> PathBuf {
        self.base.join(Self::HAND_MODEL)
    }

    /// Single-face, video-mode options with blendshapes enabled.
    pub fn face_options(&self) -> LandmarkerOptions {
        LandmarkerOptions {
            model_asset_path: self.face_model(),
            delegate: Delegate::Gpu,
            running_mode: RunningMode::Video,
            max_results: 1,
            output_face_blendshapes: true,
        }
    }

    /// Single-hand, video-mode options.
    pub fn hand_options(&self) -> LandmarkerOptions {
        LandmarkerOptions {
            model_asset_path: self.hand_model(),
            delegate: Delegate::Gpu,
            running_mode: RunningMode::Video,
            max_results: 1,
            output_face_blendshapes: false,
        }
    }
}
