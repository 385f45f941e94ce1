//! Mouse-driven stand-in for a camera and landmark engine.
//!
//! The cursor plays the nose, the wheel the viewer distance, and a held
//! right button raises a hand whose openness the wheel then adjusts. Poses are
//! turned into synthetic landmark sets so the real tracking pipeline runs.

use depthbox_tracking::synth::{synthetic_face, synthetic_hand};
use depthbox_tracking::{
    Detection, LandmarkDetector, LandmarkEngine, LandmarkSet, LandmarkerOptions, VideoFrame,
    VideoSource, VisionError, VisionProvider,
};
use glam::Vec2;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Presentation rate of the synthetic video clock.
pub const POINTER_FPS: f64 = 30.0;

pub const MIN_EYE_DISTANCE: f32 = 0.05;
pub const MAX_EYE_DISTANCE: f32 = 0.35;
pub const DEFAULT_EYE_DISTANCE: f32 = 0.15;
/// Eye distance change per wheel line.
const DISTANCE_STEP: f32 = 0.01;
/// Openness change per wheel line.
const OPENNESS_STEP: f32 = 0.05;
/// Pixels per wheel line for touchpad deltas.
const PIXELS_PER_LINE: f32 = 100.0;
/// The synthetic wrist sits this far below the cursor.
const WRIST_DROP: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPose {
    /// Cursor position in [0, 1], x right and y down.
    pub cursor: Vec2,
    /// Cursor is inside the window; a face is only seen then.
    pub inside: bool,
    /// Stand-in for the outer eye corner distance.
    pub eye_distance: f32,
    pub hand_raised: bool,
    /// 0 for a fist, 1 for an open hand.
    pub openness: f32,
}

impl Default for PointerPose {
    fn default() -> Self {
        Self {
            cursor: Vec2::splat(0.5),
            inside: false,
            eye_distance: DEFAULT_EYE_DISTANCE,
            hand_raised: false,
            openness: 0.5,
        }
    }
}

impl PointerPose {
    /// Nose position in a mirrored self-view image.
    fn nose(&self) -> Vec2 {
        Vec2::new(1.0 - self.cursor.x, self.cursor.y)
    }

    pub fn face(&self) -> Option<LandmarkSet> {
        self.inside.then(|| synthetic_face(self.nose(), self.eye_distance))
    }

    pub fn hand(&self) -> Option<LandmarkSet> {
        self.hand_raised.then(|| {
            let nose = self.nose();
            let wrist = Vec2::new(nose.x, (nose.y + WRIST_DROP).min(1.0));
            synthetic_hand(wrist, 0.1 + 0.3 * self.openness)
        })
    }
}

/// Turns window mouse events into a published [`PointerPose`].
pub struct PointerTracker {
    window_size: Vec2,
    pose: watch::Sender<PointerPose>,
}

impl PointerTracker {
    pub fn new(window_width: f32, window_height: f32) -> Self {
        let (pose, _) = watch::channel(PointerPose::default());
        Self {
            window_size: Vec2::new(window_width, window_height),
            pose,
        }
    }

    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = Vec2::new(width, height);
    }

    pub fn pose(&self) -> PointerPose {
        *self.pose.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PointerPose> {
        self.pose.subscribe()
    }

    /// A tracking source fed by this tracker.
    pub fn provider(&self) -> PointerProvider {
        PointerProvider {
            pose: self.subscribe(),
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        if self.window_size.x <= 0.0 || self.window_size.y <= 0.0 {
            return;
        }
        let cursor = Vec2::new(x as f32, y as f32) / self.window_size;
        self.pose.send_modify(|pose| {
            pose.cursor = cursor.clamp(Vec2::ZERO, Vec2::ONE);
            pose.inside = true;
        });
    }

    pub fn on_cursor_left(&mut self) {
        self.pose.send_modify(|pose| pose.inside = false);
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Right {
            return;
        }
        let raised = state == ElementState::Pressed;
        self.pose.send_modify(|pose| pose.hand_raised = raised);
        debug!(raised, "Pointer hand");
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        self.pose.send_modify(|pose| {
            if pose.hand_raised {
                pose.openness = (pose.openness + lines * OPENNESS_STEP).clamp(0.0, 1.0);
            } else {
                pose.eye_distance = (pose.eye_distance + lines * DISTANCE_STEP)
                    .clamp(MIN_EYE_DISTANCE, MAX_EYE_DISTANCE);
            }
        });
    }
}

/// [`VisionProvider`] backed by a [`PointerTracker`].
pub struct PointerProvider {
    pose: watch::Receiver<PointerPose>,
}

impl VisionProvider for PointerProvider {
    fn open_video(&mut self) -> Result<Box<dyn VideoSource>, VisionError> {
        Ok(Box::new(PointerVideo::new()))
    }

    fn open_engine(&mut self) -> Result<Box<dyn LandmarkEngine>, VisionError> {
        Ok(Box::new(PointerEngine {
            pose: self.pose.clone(),
        }))
    }
}

/// A video source without pixels, presenting a new frame every 1/30 s.
pub struct PointerVideo {
    epoch: Instant,
}

impl PointerVideo {
    pub fn new() -> Self {
        info!(fps = POINTER_FPS, "Pointer video opened");
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for PointerVideo {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSource for PointerVideo {
    fn is_ready(&self) -> bool {
        true
    }

    fn current_time(&self) -> f64 {
        let elapsed = self.epoch.elapsed().as_secs_f64();
        (elapsed * POINTER_FPS).floor() / POINTER_FPS
    }

    fn frame(&self) -> VideoFrame<'_> {
        VideoFrame {
            width: 640,
            height: 480,
            pixels: &[],
            time: self.current_time(),
        }
    }
}

impl Drop for PointerVideo {
    fn drop(&mut self) {
        info!("Pointer video released");
    }
}

pub struct PointerEngine {
    pose: watch::Receiver<PointerPose>,
}

impl LandmarkEngine for PointerEngine {
    fn face_landmarker(
        &mut self,
        options: &LandmarkerOptions,
    ) -> Result<Box<dyn LandmarkDetector>, VisionError> {
        debug!(model = ?options.model_asset_path, "Pointer face landmarker");
        Ok(Box::new(PointerDetector {
            pose: self.pose.clone(),
            read: PointerPose::face,
        }))
    }

    fn hand_landmarker(
        &mut self,
        options: &LandmarkerOptions,
    ) -> Result<Box<dyn LandmarkDetector>, VisionError> {
        debug!(model = ?options.model_asset_path, "Pointer hand landmarker");
        Ok(Box::new(PointerDetector {
            pose: self.pose.clone(),
            read: PointerPose::hand,
        }))
    }
}

struct PointerDetector {
    pose: watch::Receiver<PointerPose>,
    read: fn(&PointerPose) -> Option<LandmarkSet>,
}

impl LandmarkDetector for PointerDetector {
    fn detect_for_video(
        &mut self,
        _frame: &VideoFrame<'_>,
        _timestamp_ms: f64,
    ) -> Result<Detection, VisionError> {
        let pose = *self.pose.borrow();
        Ok((self.read)(&pose).map(Detection::single).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthbox_tracking::{ModelAssets, VisionPipeline};
    use winit::dpi::PhysicalPosition;

    fn live(tracker: &PointerTracker) -> VisionPipeline {
        let mut provider = tracker.provider();
        let video = provider.open_video().unwrap();
        let mut engine = provider.open_engine().unwrap();
        let mut pipeline = VisionPipeline::new();
        pipeline
            .initialize(video, &mut *engine, &ModelAssets::new("models"))
            .unwrap();
        pipeline
    }

    #[test]
    fn cursor_maps_to_mirrored_nose() {
        let mut tracker = PointerTracker::new(800.0, 600.0);
        tracker.on_cursor_moved(600.0, 150.0);
        let pose = tracker.pose();
        assert!(pose.inside);
        assert_eq!(pose.cursor, Vec2::new(0.75, 0.25));

        let face = pose.face().unwrap();
        let nose = face.planar(depthbox_tracking::types::index::NOSE_TIP).unwrap();
        assert!(nose.abs_diff_eq(Vec2::new(0.25, 0.25), 1e-6));
    }

    #[test]
    fn cursor_right_of_center_reads_as_head_right() {
        let mut tracker = PointerTracker::new(800.0, 600.0);
        tracker.on_cursor_moved(600.0, 150.0);
        let head = depthbox_tracking::features::head_features(&tracker.pose().face().unwrap())
            .unwrap();
        assert!((head.x - 0.5).abs() < 1e-5);
        assert!((head.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn leaving_the_window_hides_the_face() {
        let mut tracker = PointerTracker::new(800.0, 600.0);
        tracker.on_cursor_moved(10.0, 10.0);
        tracker.on_cursor_left();
        assert!(tracker.pose().face().is_none());
    }

    #[test]
    fn scroll_changes_distance_or_openness() {
        let mut tracker = PointerTracker::new(800.0, 600.0);
        tracker.on_scroll(MouseScrollDelta::LineDelta(0.0, 5.0));
        assert!((tracker.pose().eye_distance - 0.2).abs() < 1e-6);

        tracker.on_mouse_button(MouseButton::Right, ElementState::Pressed);
        tracker.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -200.0)));
        let pose = tracker.pose();
        assert!((pose.openness - 0.4).abs() < 1e-6);
        assert!((pose.eye_distance - 0.2).abs() < 1e-6);

        tracker.on_scroll(MouseScrollDelta::LineDelta(0.0, 100.0));
        assert_eq!(tracker.pose().openness, 1.0);
    }

    #[test]
    fn right_button_raises_the_hand() {
        let mut tracker = PointerTracker::new(800.0, 600.0);
        tracker.on_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(tracker.pose().hand().is_none());

        tracker.on_mouse_button(MouseButton::Right, ElementState::Pressed);
        let hand = tracker.pose().hand().unwrap();
        let tension = depthbox_tracking::features::hand_tension(&hand).unwrap();
        assert!((tension - 0.5).abs() < 1e-4);

        tracker.on_mouse_button(MouseButton::Right, ElementState::Released);
        assert!(tracker.pose().hand().is_none());
    }

    #[test]
    fn video_clock_advances_in_frame_steps() {
        let video = PointerVideo::new();
        let t = video.current_time();
        let frames = t * POINTER_FPS;
        assert!((frames - frames.round()).abs() < 1e-9);
        assert!(video.is_ready());
    }

    #[test]
    fn pointer_drives_the_pipeline() {
        let mut tracker = PointerTracker::new(800.0, 600.0);
        let mut pipeline = live(&tracker);

        tracker.on_cursor_moved(200.0, 300.0);
        let data = pipeline.process_at(0.0);
        assert!(data.head.active);
        assert!((data.head.x + 0.5).abs() < 1e-5);
        assert!(data.head.y.abs() < 1e-5);
        assert!(!data.hand.active);
    }
}
