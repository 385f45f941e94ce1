//! Head-coupled rendering of a wireframe box behind a virtual window.

pub mod camera;
pub mod depth;
pub mod frame;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod scene;

pub use camera::{Camera, Frustum, ParallaxProjector};
pub use depth::DepthController;
pub use frame::{FpsCounter, FrameDriver, FrameReport};
pub use renderer::BoxRenderer;
pub use scene::BoxScene;
