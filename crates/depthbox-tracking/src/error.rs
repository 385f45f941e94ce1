use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    /// Camera, landmark engine or model assets cannot be used.
    #[error("Vision input unavailable: {0}")]
    Unavailable(String),
    /// A single detect call failed; the next frame is attempted normally.
    #[error("Landmark detection failed: {0}")]
    Detection(String),
    #[error("Vision startup cancelled")]
    Cancelled,
}
