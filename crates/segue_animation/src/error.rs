//! Animation error types

use thiserror::Error;

/// Errors raised while parsing or validating animation descriptions
#[derive(Error, Debug)]
pub enum AnimationError {
    /// Unrecognized CSS timing function
    #[error("Invalid easing function: {0}")]
    InvalidEasing(String),

    /// cubic-bezier x control points outside [0, 1]
    #[error("cubic-bezier x control points must lie in [0, 1], got {0} and {1}")]
    BezierOutOfRange(f32, f32),

    /// Keyframe offset outside [0, 1] or decreasing
    #[error("Invalid keyframe offset {offset} at index {index}")]
    KeyframeOffset { index: usize, offset: f32 },

    /// Structurally invalid keyframe list
    #[error("Invalid keyframes: {0}")]
    Keyframes(String),

    /// Failed to parse a TOML preset config
    #[error("TOML config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse a JSON preset config
    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for segue_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
