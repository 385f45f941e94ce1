use crate::camera::{ease_to_neutral, Camera, ParallaxProjector};
use crate::depth::DepthController;
use crate::scene::BoxScene;
use depthbox_tracking::VisionData;
use glam::{Vec2, Vec3};

/// Per-frame delta cap for the FPS window, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.05;

/// Frames counted over one-second windows.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame. Returns the frame count when a window closes.
    pub fn tick(&mut self, delta_seconds: f32) -> Option<u32> {
        self.frames += 1;
        self.elapsed += delta_seconds.clamp(0.0, MAX_FRAME_DELTA);
        if self.elapsed >= 1.0 {
            let fps = self.frames;
            self.frames = 0;
            self.elapsed = 0.0;
            Some(fps)
        } else {
            None
        }
    }
}

/// What one frame step decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// The camera follows the head this frame.
    pub head_coupled: bool,
    pub depth: f32,
    /// Set when an FPS window closed this frame.
    pub fps: Option<u32>,
}

/// Per-frame state of the render loop: camera, box depth and frame timing.
pub struct FrameDriver {
    pub camera: Camera,
    pub projector: ParallaxProjector,
    pub depth: DepthController,
    pub scene: BoxScene,
    pub parallax_enabled: bool,
    pub hand_control_enabled: bool,
    fps: FpsCounter,
}

impl FrameDriver {
    pub fn new(window: Vec2, color: Vec3, aspect_ratio: f32) -> Self {
        Self {
            camera: Camera::new(aspect_ratio),
            projector: ParallaxProjector::new(window),
            depth: DepthController::new(),
            scene: BoxScene::new(window, color),
            parallax_enabled: true,
            hand_control_enabled: true,
            fps: FpsCounter::new(),
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.camera.aspect_ratio = aspect_ratio;
        }
    }

    /// Advance one frame with the latest tracking snapshot.
    ///
    /// `now_ms` clocks the depth lookback; `delta_seconds` feeds the FPS counter.
    pub fn step(&mut self, vision: &VisionData, now_ms: f64, delta_seconds: f32) -> FrameReport {
        let head_coupled = self.parallax_enabled && vision.head.active;
        if head_coupled {
            self.projector.track(&mut self.camera, &vision.head);
        } else {
            ease_to_neutral(&mut self.camera);
        }

        if self.hand_control_enabled {
            self.depth.update(&vision.hand, now_ms);
        }
        self.scene.set_depth(self.depth.depth());

        FrameReport {
            head_coupled,
            depth: self.scene.depth(),
            fps: self.fps.tick(delta_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{NEUTRAL_POSITION, WINDOW_SIZE};
    use depthbox_tracking::{HandState, HeadState};

    fn tracked(x: f32, y: f32, z: f32) -> VisionData {
        VisionData {
            head: HeadState {
                x,
                y,
                z,
                yaw: 0.0,
                pitch: 0.0,
                active: true,
            },
            hand: HandState {
                tension: 0.0,
                active: false,
            },
        }
    }

    fn driver() -> FrameDriver {
        FrameDriver::new(WINDOW_SIZE, Vec3::new(0.0, 1.0, 0.8), 16.0 / 9.0)
    }

    #[test]
    fn active_head_drives_the_camera() {
        let mut driver = driver();
        let report = driver.step(&tracked(0.5, 0.0, 10.0), 0.0, 1.0 / 60.0);
        assert!(report.head_coupled);
        assert_eq!(driver.camera.position, Vec3::new(12.0, 0.0, 18.0));
        assert!(driver.camera.frustum.is_some());
    }

    #[test]
    fn parallax_toggle_eases_to_neutral() {
        let mut driver = driver();
        driver.step(&tracked(0.5, 0.0, 10.0), 0.0, 1.0 / 60.0);
        driver.parallax_enabled = false;

        let before = driver.camera.position.distance(NEUTRAL_POSITION);
        let report = driver.step(&tracked(0.5, 0.0, 10.0), 16.0, 1.0 / 60.0);
        assert!(!report.head_coupled);
        assert!(driver.camera.position.distance(NEUTRAL_POSITION) < before);
        assert!(driver.camera.frustum.is_none());
    }

    #[test]
    fn inactive_head_eases_to_neutral() {
        let mut driver = driver();
        let report = driver.step(&VisionData::neutral(), 0.0, 1.0 / 60.0);
        assert!(!report.head_coupled);
        assert!(driver.camera.position.abs_diff_eq(NEUTRAL_POSITION, 1e-5));
    }

    #[test]
    fn hand_control_toggle_freezes_depth() {
        let mut driver = driver();
        let mut open = tracked(0.0, 0.0, 10.0);
        open.hand = HandState {
            tension: 1.0,
            active: true,
        };

        let first = driver.step(&open, 0.0, 1.0 / 60.0).depth;
        assert!(first < 31.0);

        driver.hand_control_enabled = false;
        let frozen = driver.step(&open, 16.0, 1.0 / 60.0).depth;
        assert_eq!(frozen, first);
    }

    #[test]
    fn fps_counts_frames_per_second() {
        let mut fps = FpsCounter::new();
        let reports: Vec<_> = (0..96).filter_map(|_| fps.tick(1.0 / 32.0)).collect();
        assert_eq!(reports, vec![32, 32, 32]);
    }

    #[test]
    fn fps_delta_is_capped() {
        let mut fps = FpsCounter::new();
        // A 2 s stall counts as 50 ms.
        assert_eq!(fps.tick(2.0), None);
        let closed = (0..40).find_map(|_| fps.tick(1.0 / 32.0));
        assert_eq!(closed, Some(32));
    }
}
