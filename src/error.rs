//! Error types for the particle text engine.
//!
//! Configuration problems never reach the engine as errors: [`Config::resolve`]
//! falls back to defaults and logs a warning. The types here cover the parsers,
//! the render path, and the engine state machine.
//!
//! [`Config::resolve`]: crate::config::Config::resolve

use thiserror::Error;

/// Errors produced while parsing configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A color string could not be parsed.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// Draw type other than `stroke` or `fill`.
    #[error("unknown draw type `{0}`, expected `stroke` or `fill`")]
    UnknownDrawType(String),
    /// Text alignment keyword not recognised.
    #[error("unknown text alignment `{0}`")]
    UnknownTextAlign(String),
    /// Text baseline keyword not recognised.
    #[error("unknown text baseline `{0}`")]
    UnknownTextBaseline(String),
    /// The configuration document itself was malformed.
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while compositing onto a display surface.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The source buffer and the display surface disagree on size.
    #[error("cannot draw a {src_width}x{src_height} buffer onto a {dst_width}x{dst_height} surface")]
    SizeMismatch {
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    },
    /// The display surface can no longer be drawn to.
    #[error("display surface lost: {0}")]
    SurfaceLost(String),
}

/// A failed frame step. Always fatal to the render loop.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Compositing failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The frame step panicked.
    #[error("frame step panicked: {0}")]
    Panicked(String),
}

/// Errors from driving the engine state machine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `init` was called on an engine that already left `Uninitialized`.
    #[error("engine already initialized")]
    AlreadyInitialized,
}

/// Errors decoding an inbound message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not valid JSON, or an unknown message type.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
