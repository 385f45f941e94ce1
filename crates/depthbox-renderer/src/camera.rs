use depthbox_tracking::HeadState;
use glam::{Mat4, Vec2, Vec3};

/// Virtual window size in world units (width, height).
pub const WINDOW_SIZE: Vec2 = Vec2::new(14.0, 9.0);
/// Head position in tracker units to world units.
pub const HEAD_SCALE: Vec3 = Vec3::new(24.0, 16.0, 1.8);
/// The eye never gets closer to the window plane than this.
pub const MIN_EYE_Z: f32 = 12.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 2000.0;

pub const NEUTRAL_POSITION: Vec3 = Vec3::new(0.0, 0.0, 22.0);
/// Per-frame lerp factor toward [`NEUTRAL_POSITION`].
pub const NEUTRAL_LERP: f32 = 0.08;
pub const NEUTRAL_FOV_Y_DEGREES: f32 = 50.0;

/// Near-plane extents of an asymmetric perspective frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Frustum through a `window`-sized rectangle centered on the world origin
    /// in the z = 0 plane, seen from `eye`. `eye.z` must be positive.
    pub fn off_axis(eye: Vec3, window: Vec2, near: f32, far: f32) -> Self {
        debug_assert!(eye.z > 0.0, "eye must be in front of the window plane");
        let half = window / 2.0;
        let scale = near / eye.z;
        Self {
            left: (-half.x - eye.x) * scale,
            right: (half.x - eye.x) * scale,
            bottom: (-half.y - eye.y) * scale,
            top: (half.y - eye.y) * scale,
            near,
            far,
        }
    }

    /// Right-handed projection with clip depth in [0, 1].
    pub fn projection_matrix(&self) -> Mat4 {
        let Self {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;
        Mat4::from_cols_array(&[
            2.0 * n / (r - l),
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 * n / (t - b),
            0.0,
            0.0,
            (r + l) / (r - l),
            (t + b) / (t - b),
            f / (n - f),
            -1.0,
            0.0,
            0.0,
            n * f / (n - f),
            0.0,
        ])
    }
}

/// Camera for the box scene.
///
/// Either off-axis (head-coupled, `frustum` set) or a plain symmetric
/// perspective used while easing back to neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view for the symmetric projection.
    pub fov_y_degrees: f32,
    /// Window aspect ratio (width / height) for the symmetric projection.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub frustum: Option<Frustum>,
}

impl Camera {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: NEUTRAL_POSITION,
            target: Vec3::ZERO,
            fov_y_degrees: NEUTRAL_FOV_Y_DEGREES,
            aspect_ratio,
            near: NEAR,
            far: FAR,
            frustum: None,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match &self.frustum {
            Some(frustum) => frustum.projection_matrix(),
            None => Mat4::perspective_rh(
                self.fov_y_degrees.to_radians(),
                self.aspect_ratio,
                self.near,
                self.far,
            ),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to normalized device coordinates.
    pub fn project(&self, point: Vec3) -> Vec3 {
        self.view_projection().project_point3(point)
    }
}

/// Head-coupled camera placement for a fixed virtual window.
#[derive(Debug, Clone, Copy)]
pub struct ParallaxProjector {
    pub window: Vec2,
    pub near: f32,
    pub far: f32,
}

impl ParallaxProjector {
    pub fn new(window: Vec2) -> Self {
        Self {
            window,
            near: NEAR,
            far: FAR,
        }
    }

    /// World-space eye position for a tracked head.
    pub fn eye_position(head: &HeadState) -> Vec3 {
        Vec3::new(
            head.x * HEAD_SCALE.x,
            head.y * HEAD_SCALE.y,
            (head.z * HEAD_SCALE.z).max(MIN_EYE_Z),
        )
    }

    /// Put the camera at `eye`, facing the window plane head-on, with an
    /// off-axis frustum through the window rectangle.
    pub fn place(&self, camera: &mut Camera, eye: Vec3) {
        camera.position = eye;
        camera.target = Vec3::new(eye.x, eye.y, 0.0);
        camera.near = self.near;
        camera.far = self.far;
        camera.frustum = Some(Frustum::off_axis(eye, self.window, self.near, self.far));
    }

    pub fn track(&self, camera: &mut Camera, head: &HeadState) {
        self.place(camera, Self::eye_position(head));
    }
}

/// One frame of easing toward the neutral viewpoint.
pub fn ease_to_neutral(camera: &mut Camera) {
    camera.position = camera.position.lerp(NEUTRAL_POSITION, NEUTRAL_LERP);
    camera.target = Vec3::ZERO;
    camera.fov_y_degrees = NEUTRAL_FOV_Y_DEGREES;
    camera.near = NEAR;
    camera.far = FAR;
    camera.frustum = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(x: f32, y: f32, z: f32) -> HeadState {
        HeadState {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
            active: true,
        }
    }

    fn window_corners() -> [Vec3; 4] {
        let h = WINDOW_SIZE / 2.0;
        [
            Vec3::new(-h.x, -h.y, 0.0),
            Vec3::new(h.x, -h.y, 0.0),
            Vec3::new(h.x, h.y, 0.0),
            Vec3::new(-h.x, h.y, 0.0),
        ]
    }

    #[test]
    fn window_corners_project_to_fixed_screen_positions() {
        let projector = ParallaxProjector::new(WINDOW_SIZE);
        let mut centered = Camera::new(16.0 / 9.0);
        let mut shifted = centered;
        projector.place(&mut centered, Vec3::new(0.0, 0.0, 15.0));
        projector.place(&mut shifted, Vec3::new(5.0, 3.0, 15.0));

        for corner in window_corners() {
            let a = centered.project(corner);
            let b = shifted.project(corner);
            assert!((a.x - b.x).abs() < 1e-4, "{corner}: {a} vs {b}");
            assert!((a.y - b.y).abs() < 1e-4, "{corner}: {a} vs {b}");
        }
    }

    #[test]
    fn window_fills_the_viewport() {
        let projector = ParallaxProjector::new(WINDOW_SIZE);
        let mut camera = Camera::new(1.0);
        for eye in [Vec3::new(0.0, 0.0, 15.0), Vec3::new(-8.0, 2.0, 30.0)] {
            projector.place(&mut camera, eye);
            let top_right = camera.project(Vec3::new(7.0, 4.5, 0.0));
            let bottom_left = camera.project(Vec3::new(-7.0, -4.5, 0.0));
            assert!(top_right.truncate().abs_diff_eq(glam::Vec2::ONE, 1e-4));
            assert!(bottom_left.truncate().abs_diff_eq(-glam::Vec2::ONE, 1e-4));
        }
    }

    #[test]
    fn points_behind_the_window_slide_toward_the_head() {
        let projector = ParallaxProjector::new(WINDOW_SIZE);
        let mut camera = Camera::new(1.0);
        let deep = Vec3::new(0.0, 0.0, -30.0);

        projector.place(&mut camera, Vec3::new(0.0, 0.0, 15.0));
        let centered = camera.project(deep);
        projector.place(&mut camera, Vec3::new(5.0, 0.0, 15.0));
        let moved = camera.project(deep);

        // The sight line to (0, 0, -30) from x = 5 crosses the window at x = 10/3.
        assert!((moved.x - 2.0 * (10.0 / 3.0) / WINDOW_SIZE.x).abs() < 1e-4);
        assert!(moved.x > centered.x);
    }

    #[test]
    fn projection_depth_range_is_zero_to_one() {
        let frustum = Frustum::off_axis(Vec3::new(1.0, -2.0, 20.0), WINDOW_SIZE, NEAR, FAR);
        let m = frustum.projection_matrix();
        let near = m.project_point3(Vec3::new(0.0, 0.0, -NEAR));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -FAR));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn frustum_extents_follow_the_head() {
        let f = Frustum::off_axis(Vec3::new(2.0, 1.0, 10.0), WINDOW_SIZE, 0.1, 100.0);
        assert!((f.left - (-7.0 - 2.0) * 0.01).abs() < 1e-6);
        assert!((f.right - (7.0 - 2.0) * 0.01).abs() < 1e-6);
        assert!((f.bottom - (-4.5 - 1.0) * 0.01).abs() < 1e-6);
        assert!((f.top - (4.5 - 1.0) * 0.01).abs() < 1e-6);
    }

    #[test]
    fn head_is_scaled_and_floored() {
        let eye = ParallaxProjector::eye_position(&head(0.5, -0.25, 10.0));
        assert_eq!(eye, Vec3::new(12.0, -4.0, 18.0));

        let close = ParallaxProjector::eye_position(&head(0.0, 0.0, 3.0));
        assert_eq!(close.z, MIN_EYE_Z);
    }

    #[test]
    fn tracking_looks_straight_at_the_window_plane() {
        let projector = ParallaxProjector::new(WINDOW_SIZE);
        let mut camera = Camera::new(1.0);
        projector.track(&mut camera, &head(0.25, 0.5, 12.0));
        assert_eq!(camera.target, Vec3::new(6.0, 8.0, 0.0));
        assert!(camera.frustum.is_some());
    }

    #[test]
    fn neutral_easing_converges_geometrically() {
        let start = Vec3::new(5.0, 0.0, 15.0);
        let mut camera = Camera::new(16.0 / 9.0);
        camera.position = start;

        for _ in 0..100 {
            ease_to_neutral(&mut camera);
        }

        let remaining = (1.0 - NEUTRAL_LERP).powi(100);
        let expected = NEUTRAL_POSITION + (start - NEUTRAL_POSITION) * remaining;
        assert!(camera.position.abs_diff_eq(expected, 1e-4));
        assert!(camera.position.distance(NEUTRAL_POSITION) < 2.5e-3);
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera.frustum.is_none());

        for _ in 0..100 {
            ease_to_neutral(&mut camera);
        }
        assert!(camera.position.distance(NEUTRAL_POSITION) < 1e-3);
    }
}
