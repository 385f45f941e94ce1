use crate::depth::{depth_for, INITIAL_TENSION};
use glam::{Mat4, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Opacity of the wall grids.
pub const WALL_OPACITY: f32 = 0.8;
/// The front frame sits just in front of the window plane.
pub const FRAME_Z: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl Wall {
    pub const ALL: [Wall; 5] = [Wall::Back, Wall::Left, Wall::Right, Wall::Top, Wall::Bottom];
}

/// Placement of a unit-square mesh in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Quat,
    /// Extent along the mesh's local x and y.
    pub scale: Vec2,
}

impl Placement {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale.extend(1.0), self.rotation, self.position)
    }

    /// World-space direction of the mesh's +Z face.
    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

/// An open box behind the virtual window: back wall, four side walls and a
/// frame on the window plane.
#[derive(Debug, Clone)]
pub struct BoxScene {
    pub window: Vec2,
    pub color: Vec3,
    pub opacity: f32,
    depth: f32,
}

impl BoxScene {
    pub fn new(window: Vec2, color: Vec3) -> Self {
        Self {
            window,
            color,
            opacity: WALL_OPACITY,
            depth: depth_for(INITIAL_TENSION),
        }
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Non-positive or non-finite depths are ignored.
    pub fn set_depth(&mut self, depth: f32) {
        if depth.is_finite() && depth > 0.0 {
            self.depth = depth;
        }
    }

    pub fn wall(&self, wall: Wall) -> Placement {
        let Vec2 { x: w, y: h } = self.window;
        let d = self.depth;
        match wall {
            Wall::Back => Placement {
                position: Vec3::new(0.0, 0.0, -d),
                rotation: Quat::IDENTITY,
                scale: self.window,
            },
            Wall::Left => Placement {
                position: Vec3::new(-w / 2.0, 0.0, -d / 2.0),
                rotation: Quat::from_rotation_y(FRAC_PI_2),
                scale: Vec2::new(d, h),
            },
            Wall::Right => Placement {
                position: Vec3::new(w / 2.0, 0.0, -d / 2.0),
                rotation: Quat::from_rotation_y(-FRAC_PI_2),
                scale: Vec2::new(d, h),
            },
            Wall::Top => Placement {
                position: Vec3::new(0.0, h / 2.0, -d / 2.0),
                rotation: Quat::from_rotation_x(FRAC_PI_2),
                scale: Vec2::new(w, d),
            },
            Wall::Bottom => Placement {
                position: Vec3::new(0.0, -h / 2.0, -d / 2.0),
                rotation: Quat::from_rotation_x(-FRAC_PI_2),
                scale: Vec2::new(w, d),
            },
        }
    }

    pub fn walls(&self) -> impl Iterator<Item = (Wall, Placement)> + '_ {
        Wall::ALL.into_iter().map(|wall| (wall, self.wall(wall)))
    }

    pub fn frame(&self) -> Placement {
        Placement {
            position: Vec3::new(0.0, 0.0, FRAME_Z),
            rotation: Quat::IDENTITY,
            scale: self.window,
        }
    }

    /// Wall color with opacity, for the shader.
    pub fn rgba(&self) -> [f32; 4] {
        self.color.extend(self.opacity).to_array()
    }
}
