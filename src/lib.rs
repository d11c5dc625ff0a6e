//! Multi-pass post-processing layered over a host renderer.
//!
//! An [`EffectComposer`] owns the active effects and, once per frame, either
//! lets the host render normally or hands the frame to one effect. Blur,
//! bloom and unreal-style bloom share a dual-filter downsample/upsample
//! pyramid; sobel, pixelate and chromatic aberration are single full-screen
//! passes. Every effect saves and restores the host renderer's global state
//! (target, clear state, XR flag) and scales stereo viewports when it renders
//! the scene at reduced resolution.

pub mod backend;
pub mod composer;
pub mod config;
pub mod effects;
pub mod error;
pub mod renderer;

pub use composer::{EffectComposer, EffectId, FrameOutcome};
pub use config::{ComposerConfig, EffectConfig};
pub use effects::{Effect, PostProcessEffect};
pub use error::{PostError, Result};
pub use renderer::{Extent, HostRenderer, Viewport};
