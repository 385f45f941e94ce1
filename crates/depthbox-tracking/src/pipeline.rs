use crate::calibration::Calibration;
use crate::error::VisionError;
use crate::features::{hand_tension, head_features};
use crate::gate::TrackingGate;
use crate::smoother::Smoother;
use crate::source::{LandmarkDetector, LandmarkEngine, ModelAssets, VideoFrame, VideoSource};
use crate::types::{HandState, HeadState, RawHead, VisionData};
use crate::{ALPHA_HEAD_XY, ALPHA_HEAD_Z, ALPHA_TENSION, DEFAULT_HEAD_Z};
use glam::Vec2;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A bound video source with its face and hand detectors.
pub struct VisionBackend {
    video: Box<dyn VideoSource>,
    face: Box<dyn LandmarkDetector>,
    hand: Box<dyn LandmarkDetector>,
}

impl VisionBackend {
    /// Construct single-subject video-mode detectors for `video`.
    ///
    /// On failure `video` is dropped, releasing the stream.
    pub fn open(
        video: Box<dyn VideoSource>,
        engine: &mut dyn LandmarkEngine,
        assets: &ModelAssets,
    ) -> Result<Self, VisionError> {
        let face = engine.face_landmarker(&assets.face_options())?;
        let hand = engine.hand_landmarker(&assets.hand_options())?;
        info!(base = ?assets.base(), "Landmarkers created");
        Ok(Self { video, face, hand })
    }

    pub fn from_parts(
        video: Box<dyn VideoSource>,
        face: Box<dyn LandmarkDetector>,
        hand: Box<dyn LandmarkDetector>,
    ) -> Self {
        Self { video, face, hand }
    }
}

/// Smoothed, gated and calibrated tracking state.
struct TrackerState {
    head_x: Smoother,
    head_y: Smoother,
    head_z: Smoother,
    tension: Smoother,
    head_gate: TrackingGate,
    hand_gate: TrackingGate,
    calibration: Calibration,
    /// Smoothed head before calibration.
    last_head: RawHead,
    last_tension: f32,
}

impl TrackerState {
    fn new() -> Self {
        Self {
            head_x: Smoother::new(ALPHA_HEAD_XY),
            head_y: Smoother::new(ALPHA_HEAD_XY),
            head_z: Smoother::new(ALPHA_HEAD_Z),
            tension: Smoother::new(ALPHA_TENSION),
            head_gate: TrackingGate::face(),
            hand_gate: TrackingGate::hand(),
            calibration: Calibration::new(),
            last_head: RawHead {
                x: 0.0,
                y: 0.0,
                z: DEFAULT_HEAD_Z,
            },
            last_tension: 0.0,
        }
    }

    fn track_face(&mut self, face: &mut dyn LandmarkDetector, frame: &VideoFrame<'_>, now: f64) {
        let detection = match face.detect_for_video(frame, now) {
            Ok(detection) => detection,
            Err(e) => {
                warn!(error = %e, "Face detection failed, skipping frame");
                return;
            }
        };

        if let Some(raw) = detection.first().and_then(head_features) {
            self.head_gate.observe(now);
            self.last_head = RawHead {
                x: self.head_x.update(raw.x),
                y: self.head_y.update(raw.y),
                z: self.head_z.update(raw.z),
            };
        }
    }

    fn track_hand(&mut self, hand: &mut dyn LandmarkDetector, frame: &VideoFrame<'_>, now: f64) {
        let detection = match hand.detect_for_video(frame, now) {
            Ok(detection) => detection,
            Err(e) => {
                warn!(error = %e, "Hand detection failed, skipping frame");
                return;
            }
        };

        match detection.first().and_then(hand_tension) {
            Some(raw) => {
                self.hand_gate.observe(now);
                self.last_tension = self.tension.update(raw);
            }
            None => self.hand_gate.mark_absent(now),
        }
    }

    fn centered_head(&self) -> Vec2 {
        self.calibration
            .apply(Vec2::new(self.last_head.x, self.last_head.y))
    }

    fn snapshot(&self, now: f64, live: bool) -> VisionData {
        let centered = self.centered_head();
        VisionData {
            head: HeadState {
                x: unit_or_zero(centered.x),
                y: unit_or_zero(centered.y),
                z: positive_or(self.last_head.z, DEFAULT_HEAD_Z),
                yaw: 0.0,
                pitch: 0.0,
                active: live && self.head_gate.is_active(now),
            },
            hand: HandState {
                tension: if self.last_tension.is_finite() {
                    self.last_tension.clamp(0.0, 1.0)
                } else {
                    0.0
                },
                active: live && self.hand_gate.is_active(now),
            },
        }
    }
}

/// Pull-based head and hand tracker.
///
/// Call [`VisionPipeline::process`] once per rendered frame. Inference runs at
/// most once per presented video frame; between video frames the previous
/// results are reused. Without a backend (or before the video is ready) the
/// pipeline is degraded: it reports the last known values with both
/// modalities inactive.
pub struct VisionPipeline {
    backend: Option<VisionBackend>,
    state: TrackerState,
    last_video_time: Option<f64>,
    epoch: Instant,
}

impl VisionPipeline {
    pub fn new() -> Self {
        Self {
            backend: None,
            state: TrackerState::new(),
            last_video_time: None,
            epoch: Instant::now(),
        }
    }

    /// Bind `video` and construct the landmarkers in one step.
    ///
    /// Failure is logged and leaves the pipeline degraded; it is returned for
    /// callers that want to surface it.
    pub fn initialize(
        &mut self,
        video: Box<dyn VideoSource>,
        engine: &mut dyn LandmarkEngine,
        assets: &ModelAssets,
    ) -> Result<(), VisionError> {
        match VisionBackend::open(video, engine, assets) {
            Ok(backend) => {
                self.attach(backend);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Vision pipeline init failed, running degraded");
                Err(e)
            }
        }
    }

    /// Install a ready backend, replacing (and releasing) any previous one.
    pub fn attach(&mut self, backend: VisionBackend) {
        if self.backend.replace(backend).is_some() {
            debug!("Replaced vision backend");
        }
        self.last_video_time = None;
        info!("Vision pipeline ready");
    }

    /// Release the video source and detectors. The pipeline becomes degraded.
    pub fn shutdown(&mut self) {
        if self.backend.take().is_some() {
            info!("Vision backend released");
        }
    }

    pub fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    /// Milliseconds since the pipeline was created.
    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    pub fn process(&mut self) -> VisionData {
        let now = self.now_ms();
        self.process_at(now)
    }

    /// [`VisionPipeline::process`] against an explicit clock, in milliseconds.
    pub fn process_at(&mut self, now: f64) -> VisionData {
        let state = &mut self.state;
        let Some(VisionBackend { video, face, hand }) = self.backend.as_mut() else {
            return state.snapshot(now, false);
        };
        if !video.is_ready() {
            return state.snapshot(now, false);
        }

        let video_time = video.current_time();
        if self.last_video_time != Some(video_time) {
            self.last_video_time = Some(video_time);
            let frame = video.frame();
            state.track_face(&mut **face, &frame, now);
            state.track_hand(&mut **hand, &frame, now);
        }

        state.snapshot(now, true)
    }

    /// Make the current head position the neutral origin.
    pub fn calibrate(&mut self) {
        let head = Vec2::new(self.state.last_head.x, self.state.last_head.y);
        self.state.calibration.recenter(head);
    }

    pub fn calibration(&self) -> &Calibration {
        &self.state.calibration
    }
}

impl Default for VisionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn unit_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn positive_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        fallback
    }
}
