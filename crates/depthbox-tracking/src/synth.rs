//! Synthetic landmark sets with a controlled nose position, eye distance and hand spread.

use crate::types::{index, LandmarkSet};
use glam::{Vec2, Vec3};

/// Size of a face mesh landmark set (with irises).
pub const FACE_LANDMARK_COUNT: usize = 478;
/// Size of a hand landmark set.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// A face whose nose tip sits at `nose` and whose outer eye corners are
/// exactly `eye_distance` apart, level, slightly above the nose.
pub fn synthetic_face(nose: Vec2, eye_distance: f32) -> LandmarkSet {
    let mut points = vec![nose.extend(0.0); FACE_LANDMARK_COUNT];
    let eye_y = nose.y - eye_distance * 0.3;
    let half = eye_distance / 2.0;
    points[index::LEFT_EYE_OUTER] = Vec3::new(nose.x - half, eye_y, 0.0);
    points[index::RIGHT_EYE_OUTER] = Vec3::new(nose.x + half, eye_y, 0.0);
    LandmarkSet::new(points)
}

/// A hand whose five fingertips are each exactly `spread` from the wrist,
/// fanned upward in image space. Intermediate joints lie on the wrist-tip segments.
pub fn synthetic_hand(wrist: Vec2, spread: f32) -> LandmarkSet {
    let mut points = vec![wrist.extend(0.0); HAND_LANDMARK_COUNT];

    for (finger, tip) in index::FINGERTIPS.into_iter().enumerate() {
        // Thumb points left, pinky right; all point up (negative y).
        let angle = (-60.0_f32 + finger as f32 * 30.0).to_radians();
        let dir = Vec2::new(angle.sin(), -angle.cos());
        for (joint, fraction) in [(tip - 3, 0.4), (tip - 2, 0.6), (tip - 1, 0.8), (tip, 1.0)] {
            points[joint] = (wrist + dir * spread * fraction).extend(0.0);
        }
    }

    LandmarkSet::new(points)
}
