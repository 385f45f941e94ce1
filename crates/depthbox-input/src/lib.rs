//! Input handling: the pointer-driven tracking source.

pub mod pointer;

pub use pointer::{PointerPose, PointerProvider, PointerTracker};
