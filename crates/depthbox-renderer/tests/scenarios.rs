//! End-to-end behavior of tracking feeding the render loop, driven by a
//! scripted video and landmark feed.

use depthbox_renderer::camera::{
    Camera, ParallaxProjector, MIN_EYE_Z, NEUTRAL_LERP, NEUTRAL_POSITION, WINDOW_SIZE,
};
use depthbox_renderer::FrameDriver;
use depthbox_tracking::scripted::ScriptedFeed;
use depthbox_tracking::synth::{synthetic_face, synthetic_hand};
use depthbox_tracking::{LandmarkSet, ModelAssets, VisionData, VisionPipeline};
use glam::{Vec2, Vec3};

const WALL_COLOR: Vec3 = Vec3::new(0.0, 1.0, 0.8);

fn live_pipeline(feed: &ScriptedFeed) -> VisionPipeline {
    let mut pipeline = VisionPipeline::new();
    pipeline
        .initialize(
            Box::new(feed.video()),
            &mut feed.engine(),
            &ModelAssets::new("models"),
        )
        .expect("scripted engine initializes");
    pipeline
}

fn driver() -> FrameDriver {
    FrameDriver::new(WINDOW_SIZE, WALL_COLOR, 16.0 / 9.0)
}

/// Face whose nose maps to head `(x, y)`.
fn face_at(x: f32, y: f32) -> LandmarkSet {
    synthetic_face(Vec2::new(0.5 - x / 2.0, 0.5 - y / 2.0), 0.15)
}

/// Hand whose fingertip spread maps to `tension`.
fn hand_with_tension(tension: f32) -> LandmarkSet {
    synthetic_hand(Vec2::new(0.5, 0.8), 0.1 + 0.3 * tension)
}

#[test]
fn window_corners_stay_put_as_the_head_moves() {
    let projector = ParallaxProjector::new(WINDOW_SIZE);
    let mut camera = Camera::new(16.0 / 9.0);
    let corners = [
        Vec3::new(-7.0, -4.5, 0.0),
        Vec3::new(7.0, -4.5, 0.0),
        Vec3::new(7.0, 4.5, 0.0),
        Vec3::new(-7.0, 4.5, 0.0),
    ];

    projector.place(&mut camera, Vec3::new(0.0, 0.0, 15.0));
    let centered: Vec<Vec3> = corners.iter().map(|&c| camera.project(c)).collect();
    projector.place(&mut camera, Vec3::new(5.0, 3.0, 15.0));
    let shifted: Vec<Vec3> = corners.iter().map(|&c| camera.project(c)).collect();

    for (a, b) in centered.iter().zip(&shifted) {
        assert!(a.truncate().abs_diff_eq(b.truncate(), 1e-4), "{a} vs {b}");
    }
}

#[test]
fn tracked_face_moves_the_camera() {
    let feed = ScriptedFeed::new();
    feed.show_face(face_at(0.25, -0.5));
    let mut pipeline = live_pipeline(&feed);
    let mut driver = driver();

    let vision = pipeline.process_at(0.0);
    let report = driver.step(&vision, 0.0, 1.0 / 60.0);

    assert!(report.head_coupled);
    assert!(driver
        .camera
        .position
        .abs_diff_eq(Vec3::new(6.0, -8.0, MIN_EYE_Z), 1e-4));
}

#[test]
fn hand_needs_continuous_presence_to_activate() {
    let feed = ScriptedFeed::new();
    feed.show_hand(hand_with_tension(0.5));
    let mut pipeline = live_pipeline(&feed);
    let step = 16.7;

    let mut vision = VisionData::neutral();
    for i in 0..3 {
        vision = pipeline.process_at(i as f64 * step);
        feed.advance_video(step / 1000.0);
    }
    assert!(!vision.hand.active);

    for i in 3..13 {
        vision = pipeline.process_at(i as f64 * step);
        feed.advance_video(step / 1000.0);
    }
    assert!(vision.hand.active);
}

#[test]
fn withdrawal_spike_is_discarded_on_dropout() {
    let feed = ScriptedFeed::new();
    let mut pipeline = live_pipeline(&feed);
    let mut driver = driver();
    let step = 16.0;
    let mut now = 0.0;

    let frame = |pipeline: &mut VisionPipeline, driver: &mut FrameDriver, now: &mut f64| {
        let vision = pipeline.process_at(*now);
        driver.step(&vision, *now, (step / 1000.0) as f32);
        feed.advance_video(step / 1000.0);
        *now += step;
        vision
    };

    feed.show_hand(hand_with_tension(0.6));
    for _ in 0..75 {
        frame(&mut pipeline, &mut driver, &mut now);
    }
    assert!((driver.depth.smoothed() - 0.6).abs() < 0.01);

    for spike in [0.95, 0.98, 0.99] {
        feed.show_hand(hand_with_tension(spike));
        frame(&mut pipeline, &mut driver, &mut now);
    }
    let spiked = driver.depth.smoothed();
    assert!(spiked > 0.6);

    feed.hide_hand();
    let mut vision = VisionData::neutral();
    for _ in 0..12 {
        vision = frame(&mut pipeline, &mut driver, &mut now);
    }

    assert!(!vision.hand.active);
    assert!((driver.depth.smoothed() - 0.6).abs() < 1e-3);
    assert!(driver.depth.history().is_empty());
}

#[test]
fn calibration_accumulates() {
    let feed = ScriptedFeed::new();
    feed.show_face(face_at(0.3, 0.1));
    let mut pipeline = live_pipeline(&feed);
    let mut now = 0.0;

    pipeline.process_at(now);
    pipeline.calibrate();
    feed.advance_video(0.033);
    now += 33.0;
    let centered = pipeline.process_at(now);
    assert!(centered.head.x.abs() < 1e-4);
    assert!(centered.head.y.abs() < 1e-4);

    feed.show_face(face_at(0.5, 0.1));
    let mut drifted = centered;
    for _ in 0..80 {
        feed.advance_video(0.033);
        now += 33.0;
        drifted = pipeline.process_at(now);
    }
    assert!((drifted.head.x - 0.2).abs() < 1e-3);

    pipeline.calibrate();
    feed.advance_video(0.033);
    now += 33.0;
    let recentered = pipeline.process_at(now);
    assert!(recentered.head.x.abs() < 1e-4);
    assert!(recentered.head.y.abs() < 1e-4);
    assert!((pipeline.calibration().offset().x - 0.5).abs() < 1e-3);
}

#[test]
fn degraded_pipeline_still_renders() {
    let mut pipeline = VisionPipeline::new();
    let mut driver = driver();

    for i in 0..10 {
        let vision = pipeline.process();
        assert!(!vision.head.active);
        assert_eq!(vision.head.x, 0.0);
        assert_eq!(vision.head.y, 0.0);
        assert_eq!(vision.head.z, 12.0);
        assert_eq!(vision.hand.tension, 0.0);
        assert!(!vision.hand.active);

        let report = driver.step(&vision, i as f64 * 16.0, 1.0 / 60.0);
        assert!(!report.head_coupled);
    }
}

#[test]
fn disabled_parallax_returns_to_neutral() {
    let start = Vec3::new(5.0, 0.0, 15.0);
    let mut driver = driver();
    driver.parallax_enabled = false;
    driver.camera.position = start;

    let feed = ScriptedFeed::new();
    feed.show_face(face_at(0.5, 0.5));
    let mut pipeline = live_pipeline(&feed);

    for i in 0..100 {
        let vision = pipeline.process_at(i as f64 * 16.0);
        feed.advance_video(0.016);
        driver.step(&vision, i as f64 * 16.0, 0.016);
    }

    // Per-frame easing leaves (1 - 0.08)^100 of the starting offset.
    let remaining = (1.0 - NEUTRAL_LERP).powi(100);
    let expected = NEUTRAL_POSITION + (start - NEUTRAL_POSITION) * remaining;
    assert!(driver.camera.position.abs_diff_eq(expected, 1e-4));
    assert!(driver.camera.position.distance(NEUTRAL_POSITION) < 2.5e-3);
    assert_eq!(driver.camera.target, Vec3::ZERO);
}
