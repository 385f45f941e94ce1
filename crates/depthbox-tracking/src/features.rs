//! Raw head and hand features from a single landmark set.
//!
//! Distances are measured in the image plane (normalized x, y); the landmark
//! depth channel is too noisy to help here.

use crate::types::{index, LandmarkSet, RawHead};

/// Eye distance floor; keeps `raw_z` finite when the eyes collapse onto each other.
const MIN_EYE_DISTANCE: f32 = 0.01;
/// Caps `raw_z` when the face fills the frame.
const EYE_DISTANCE_BIAS: f32 = 0.05;

/// Average fingertip-to-wrist distance of a closed fist.
const FIST_SPREAD: f32 = 0.1;
/// Spread between a closed fist and an open hand.
const OPEN_SPREAD_RANGE: f32 = 0.3;

/// Head position from a face landmark set.
///
/// `x` and `y` map a half-frame nose displacement to +-1. `x` is positive when
/// the nose is left of image center, which is the viewer's right on a mirrored
/// self-view source. Returns `None` if the nose or either outer eye corner is missing.
pub fn head_features(face: &LandmarkSet) -> Option<RawHead> {
    let nose = face.planar(index::NOSE_TIP)?;
    let eye_l = face.planar(index::LEFT_EYE_OUTER)?;
    let eye_r = face.planar(index::RIGHT_EYE_OUTER)?;

    let eye_dist = eye_l.distance(eye_r);
    Some(RawHead {
        x: (0.5 - nose.x) * 2.0,
        y: (0.5 - nose.y) * 2.0,
        z: 1.0 / (eye_dist.max(MIN_EYE_DISTANCE) + EYE_DISTANCE_BIAS),
    })
}

/// Hand openness in [0, 1] from a hand landmark set.
///
/// Returns `None` if the wrist or any fingertip is missing.
pub fn hand_tension(hand: &LandmarkSet) -> Option<f32> {
    let wrist = hand.planar(index::WRIST)?;

    let mut total = 0.0;
    for tip in index::FINGERTIPS {
        total += hand.planar(tip)?.distance(wrist);
    }
    let avg = total / index::FINGERTIPS.len() as f32;

    Some(((avg - FIST_SPREAD) / OPEN_SPREAD_RANGE).clamp(0.0, 1.0))
}
