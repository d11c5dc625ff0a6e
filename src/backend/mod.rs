//! [`HostRenderer`](crate::renderer::HostRenderer) implementations.
//!
//! - [`software`]: CPU reference renderer, used by the tests and the demo.
//! - [`gpu`]: `wgpu` renderer on an offscreen presentation texture.

pub mod gpu;
pub mod software;

pub use gpu::{FullscreenShaderScene, GpuRenderer, GpuScene, SceneFrame};
pub use software::{Image, SoftwareRenderer, SoftwareScene, SoftwareStats, SolidScene};
