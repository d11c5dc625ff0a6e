//! Error types shared by the composer, the effects and the backends.
//!
//! Every fallible public API returns [`Result<T>`], an alias for
//! `std::result::Result<T, PostError>`.

use thiserror::Error;

use crate::composer::EffectId;
use crate::renderer::{ProgramId, RenderTargetId};

/// Errors raised by the post-processing layer.
#[derive(Error, Debug)]
pub enum PostError {
    // ========================================================================
    // Usage errors
    // ========================================================================
    /// The effect id does not name a registered effect.
    #[error("effect {0:?} is not registered with this composer")]
    NotRegistered(EffectId),

    /// An exclusive composer already drives another effect.
    #[error("composer is exclusive and effect {0:?} is already active")]
    EffectAlreadyActive(EffectId),

    /// The effect released its GPU resources and can no longer be used.
    #[error("{0} effect has been disposed")]
    Disposed(&'static str),

    /// An effect or composer configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Resource errors
    // ========================================================================
    /// A render target was requested with an unusable size.
    #[error("invalid render target extent {width}x{height}")]
    InvalidExtent {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The render target id is unknown to the renderer (never created or released).
    #[error("unknown render target {0:?}")]
    UnknownRenderTarget(RenderTargetId),

    /// The program id is unknown to the renderer (never created or released).
    #[error("unknown shader program {0:?}")]
    UnknownProgram(ProgramId),

    /// The graphics backend reported a failure.
    #[error("backend error: {0}")]
    Backend(String),

    // ========================================================================
    // Configuration I/O
    // ========================================================================
    /// An effect preset failed to parse.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading a preset or writing an output file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An output image could not be encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Alias for `Result<T, PostError>`.
pub type Result<T> = std::result::Result<T, PostError>;
