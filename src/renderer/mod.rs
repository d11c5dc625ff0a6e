//! Host renderer interface.
//!
//! The post-processing layer never owns a graphics device. It drives an
//! existing renderer through [`HostRenderer`]: scene rendering, render-target
//! binding, clear state, XR flags and a small resource arena of offscreen
//! targets and full-screen shader programs. [`crate::backend`] provides a CPU
//! reference implementation and a `wgpu` one.

pub mod program;
pub mod shaders;
pub mod state_guard;
pub mod target_chain;
pub mod utils;

pub use program::{BlendMode, ProgramKind, ShaderProgram, Uniforms};
pub use state_guard::{RendererSnapshot, RendererStateGuard, with_scaled_xr_viewports};
pub use target_chain::{ChainDesc, ChainShape, RenderTargetChain};
pub use utils::{Extent, Viewport};

use crate::error::Result;

// ── Handles ───────────────────────────────────────────────────────────────────

/// Index of an offscreen render target in the renderer's arena.
///
/// Ids are never reused after release, so a stale id is always detectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTargetId(pub u32);

/// Index of a shader program in the renderer's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

// ── Color ─────────────────────────────────────────────────────────────────────

/// Linear RGB clear color. Alpha travels separately, as in the clear state of
/// the host renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.0[0], self.0[1], self.0[2], alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ── Render targets ────────────────────────────────────────────────────────────

/// Pixel format of an offscreen color buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit linear color.
    Rgba8Unorm,
    /// 8-bit sRGB-encoded color (single-pass effect scene buffers).
    Rgba8UnormSrgb,
    /// Half-float HDR color (bloom pyramids).
    Rgba16Float,
}

/// Creation parameters for an offscreen render target.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTargetDesc {
    pub label: &'static str,
    pub extent: Extent,
    pub format: TextureFormat,
    /// Attach a depth buffer (only targets that receive scene renders need one).
    pub depth_buffer: bool,
    /// MSAA sample count; 1 disables multisampling.
    pub samples: u32,
}

impl RenderTargetDesc {
    pub fn new(label: &'static str, extent: Extent, format: TextureFormat) -> Self {
        Self { label, extent, format, depth_buffer: false, samples: 1 }
    }

    pub fn with_depth(mut self, depth_buffer: bool) -> Self {
        self.depth_buffer = depth_buffer;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }
}

// ── XR ────────────────────────────────────────────────────────────────────────

/// Camera the XR system renders with: a single mono camera or one camera per
/// eye, each with its own mutable viewport.
#[derive(Clone, Debug, PartialEq)]
pub enum XrCamera {
    Mono,
    Array(Vec<Viewport>),
}

impl XrCamera {
    /// Per-eye viewports, empty for a mono camera.
    pub fn viewports(&self) -> &[Viewport] {
        match self {
            Self::Mono => &[],
            Self::Array(views) => views,
        }
    }

    pub fn viewports_mut(&mut self) -> &mut [Viewport] {
        match self {
            Self::Mono => &mut [],
            Self::Array(views) => views,
        }
    }
}

/// XR flags of the host renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct XrState {
    /// Whether scene renders apply XR (stereo) projection.
    pub enabled: bool,
    /// Whether an XR session is currently presenting.
    pub presenting: bool,
    pub camera: XrCamera,
}

impl Default for XrState {
    fn default() -> Self {
        Self { enabled: false, presenting: false, camera: XrCamera::Mono }
    }
}

/// XR session lifecycle notifications forwarded to the composer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum XrSessionEvent {
    SessionStart,
    SessionEnd,
}

// ── RenderInfo ────────────────────────────────────────────────────────────────

/// Counters the host renderer maintains across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderInfo {
    /// Incremented by every scene render. Per-frame host computations key off it.
    pub frame: u64,
    /// Full-screen draws issued since creation.
    pub draws: u64,
}

// ── HostRenderer ──────────────────────────────────────────────────────────────

/// The renderer/graphics-device object effects run on.
///
/// `None` as a render target always means the presentation target (the
/// swap-chain image, or the XR framebuffer while presenting).
pub trait HostRenderer {
    /// Scene graph type rendered by [`HostRenderer::render_scene`].
    type Scene: ?Sized;
    /// Camera type rendered by [`HostRenderer::render_scene`].
    type Camera: ?Sized;

    /// Render `scene` into the bound target. Clears first when auto-clear is
    /// on and renders once per eye viewport when XR is enabled and presenting.
    fn render_scene(&mut self, scene: &Self::Scene, camera: &Self::Camera) -> Result<()>;

    fn render_target(&self) -> Option<RenderTargetId>;
    fn set_render_target(&mut self, target: Option<RenderTargetId>) -> Result<()>;
    /// Pixel size of `target` (`None` = presentation target).
    fn target_size(&self, target: Option<RenderTargetId>) -> Result<Extent>;
    /// Viewport used for subsequent draws to the presentation target.
    fn set_viewport(&mut self, viewport: Viewport);
    /// Clear the bound target to the current clear color/alpha.
    fn clear(&mut self) -> Result<()>;

    fn clear_color(&self) -> Color;
    fn clear_alpha(&self) -> f32;
    fn set_clear_color(&mut self, color: Color, alpha: f32);
    fn auto_clear(&self) -> bool;
    fn set_auto_clear(&mut self, auto_clear: bool);

    fn xr(&self) -> &XrState;
    fn xr_mut(&mut self) -> &mut XrState;

    /// Current output (drawing-buffer) size, XR framebuffer size while presenting.
    fn output_size(&self) -> Extent;
    fn info_mut(&mut self) -> &mut RenderInfo;

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId>;
    /// Resize in place. The id stays valid.
    fn resize_render_target(&mut self, id: RenderTargetId, extent: Extent) -> Result<()>;
    fn release_render_target(&mut self, id: RenderTargetId);

    fn create_program(&mut self, kind: ProgramKind, blend: BlendMode) -> Result<ProgramId>;
    fn release_program(&mut self, id: ProgramId);
    /// Draw one full-screen quad with `program` into the bound target.
    /// Never auto-clears.
    fn draw_fullscreen(&mut self, program: &ShaderProgram) -> Result<()>;
}
