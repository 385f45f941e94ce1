//! Deterministic video and landmark feed.
//!
//! A [`ScriptedFeed`] is a shared handle: hand its [`ScriptedVideo`] and
//! [`ScriptedEngine`] to a pipeline, then drive presentation time and
//! detections from the outside.

use crate::error::VisionError;
use crate::source::{
    Detection, LandmarkDetector, LandmarkEngine, LandmarkerOptions, VideoFrame, VideoSource,
};
use crate::types::LandmarkSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct FeedState {
    video_time: f64,
    ready: bool,
    face: Option<LandmarkSet>,
    hand: Option<LandmarkSet>,
    fail_next_face: bool,
    fail_next_hand: bool,
    fail_engine: bool,
    face_calls: usize,
    hand_calls: usize,
    video_released: bool,
}

#[derive(Clone)]
pub struct ScriptedFeed {
    inner: Arc<Mutex<FeedState>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeedState {
                video_time: 0.0,
                ready: true,
                face: None,
                hand: None,
                fail_next_face: false,
                fail_next_hand: false,
                fail_engine: false,
                face_calls: 0,
                hand_calls: 0,
                video_released: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn video(&self) -> ScriptedVideo {
        ScriptedVideo { feed: self.clone() }
    }

    pub fn engine(&self) -> ScriptedEngine {
        ScriptedEngine { feed: self.clone() }
    }

    pub fn set_ready(&self, ready: bool) {
        self.lock().ready = ready;
    }

    /// Present a new frame `seconds` later.
    pub fn advance_video(&self, seconds: f64) {
        self.lock().video_time += seconds;
    }

    pub fn show_face(&self, face: LandmarkSet) {
        self.lock().face = Some(face);
    }

    pub fn hide_face(&self) {
        self.lock().face = None;
    }

    pub fn show_hand(&self, hand: LandmarkSet) {
        self.lock().hand = Some(hand);
    }

    pub fn hide_hand(&self) {
        self.lock().hand = None;
    }

    pub fn fail_next_face(&self) {
        self.lock().fail_next_face = true;
    }

    pub fn fail_next_hand(&self) {
        self.lock().fail_next_hand = true;
    }

    /// Make landmarker construction fail.
    pub fn fail_engine(&self) {
        self.lock().fail_engine = true;
    }

    pub fn face_calls(&self) -> usize {
        self.lock().face_calls
    }

    pub fn hand_calls(&self) -> usize {
        self.lock().hand_calls
    }

    /// Whether a [`ScriptedVideo`] from this feed has been dropped.
    pub fn video_released(&self) -> bool {
        self.lock().video_released
    }
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ScriptedVideo {
    feed: ScriptedFeed,
}

impl VideoSource for ScriptedVideo {
    fn is_ready(&self) -> bool {
        self.feed.lock().ready
    }

    fn current_time(&self) -> f64 {
        self.feed.lock().video_time
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

impl Drop for ScriptedVideo {
    fn drop(&mut self) {
        self.feed.lock().video_released = true;
    }
}

pub struct ScriptedEngine {
    feed: ScriptedFeed,
}

impl ScriptedEngine {
    fn detector(&self, modality: Modality) -> Result<Box<dyn LandmarkDetector>, VisionError> {
        if self.feed.lock().fail_engine {
            return Err(VisionError::Unavailable("scripted engine failure".into()));
        }
        Ok(Box::new(ScriptedDetector {
            feed: self.feed.clone(),
            modality,
        }))
    }
}

impl LandmarkEngine for ScriptedEngine {
    fn face_landmarker(
        &mut self,
        _options: &LandmarkerOptions,
    ) -> Result<Box<dyn LandmarkDetector>, VisionError> {
        self.detector(Modality::Face)
    }

    fn hand_landmarker(
        &mut self,
        _options: &LandmarkerOptions,
    ) -> Result<Box<dyn LandmarkDetector>, VisionError> {
        self.detector(Modality::Hand)
    }
}

#[derive(Clone, Copy)]
enum Modality {
    Face,
    Hand,
}

struct ScriptedDetector {
    feed: ScriptedFeed,
    modality: Modality,
}

impl LandmarkDetector for ScriptedDetector {
    fn detect_for_video(
        &mut self,
        _frame: &VideoFrame<'_>,
        _timestamp_ms: f64,
    ) -> Result<Detection, VisionError> {
        let mut state = self.feed.lock();
        let state = &mut *state;
        let (calls, fail, set) = match self.modality {
            Modality::Face => (&mut state.face_calls, &mut state.fail_next_face, &state.face),
            Modality::Hand => (&mut state.hand_calls, &mut state.fail_next_hand, &state.hand),
        };
        *calls += 1;
        if std::mem::take(fail) {
            return Err(VisionError::Detection("scripted failure".into()));
        }
        Ok(set.clone().map(Detection::single).unwrap_or_default())
    }
}
