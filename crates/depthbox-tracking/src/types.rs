use glam::{Vec2, Vec3};

/// Well-known landmark indices.
pub mod index {
    pub const WRIST: usize = 0;
    pub const NOSE_TIP: usize = 1;
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const RIGHT_EYE_OUTER: usize = 263;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;

    pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

/// One detection: points normalized to the video frame, origin top-left.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    pub points: Vec<Vec3>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// Image-plane position of a landmark, ignoring its depth.
    pub fn planar(&self, index: usize) -> Option<Vec2> {
        self.get(index).map(|p| p.truncate())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Unsmoothed head features from one face detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHead {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Published head state.
///
/// `x` is right-positive for a mirrored (self-view) video source, `y` is up-positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Reserved; always 0 until a pose estimate is wired in.
    pub yaw: f32,
    /// Reserved; always 0 until a pose estimate is wired in.
    pub pitch: f32,
    pub active: bool,
}

/// Published hand state. `tension` is 0 for a closed fist and 1 for an open hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandState {
    pub tension: f32,
    pub active: bool,
}

/// Snapshot produced by one `VisionPipeline::process` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionData {
    pub head: HeadState,
    pub hand: HandState,
}

impl VisionData {
    /// What the pipeline reports before anything has been observed.
    pub fn neutral() -> Self {
        Self {
            head: HeadState {
                x: 0.0,
                y: 0.0,
                z: crate::DEFAULT_HEAD_Z,
                yaw: 0.0,
                pitch: 0.0,
                active: false,
            },
            hand: HandState {
                tension: 0.0,
                active: false,
            },
        }
    }
}

impl Default for VisionData {
    fn default() -> Self {
        Self::neutral()
    }
}
