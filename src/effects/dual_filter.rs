//! Dual-filter blur pyramid.
//!
//! Shared engine of the blur and bloom effects: the scene is rendered into
//! level 0 of a downsample chain, halved `steps - 1` times with the
//! dual-filter downsample kernel, then re-expanded level by level with the
//! upsample kernel. The same two programs serve every level; only their
//! inputs and uniforms are rebound between draws.
//!
//! ```text
//! scene ─▶ down[0] ─▶ down[1] ─▶ … ─▶ down[n-1]
//!                                        │ seed
//!          up[0]  ◀─  up[1]  ◀─  …  ◀────┘
//! ```

use crate::error::{PostError, Result};
use crate::renderer::program::run_pass;
use crate::renderer::target_chain::ChainDesc;
use crate::renderer::{
    BlendMode, ChainShape, Extent, HostRenderer, ProgramKind, RenderTargetChain, RenderTargetId,
    ShaderProgram, TextureFormat, Uniforms, with_scaled_xr_viewports,
};

pub struct DualFilterPyramid {
    label: &'static str,
    downsample_targets: RenderTargetChain,
    upsample_targets: RenderTargetChain,
    downsample_program: ShaderProgram,
    upsample_program: ShaderProgram,
}

impl DualFilterPyramid {
    /// Allocate a pyramid of `steps` levels for a requested `size`.
    pub fn new<R: HostRenderer + ?Sized>(
        renderer: &mut R,
        label: &'static str,
        steps: usize,
        resolution_factor: f32,
        size: Extent,
    ) -> Result<Self> {
        if steps == 0 {
            return Err(PostError::InvalidConfig(format!("{label}: step count must be at least 1")));
        }

        let chain = |label: &'static str, depth_on_base: bool| ChainDesc {
            label,
            len: steps,
            shape: ChainShape::Halving,
            resolution_factor,
            format: TextureFormat::Rgba16Float,
            depth_on_base,
        };

        let mut downsample_targets =
            RenderTargetChain::new(renderer, chain("dual_filter_down", true), size.width, size.height)?;
        let mut upsample_targets =
            match RenderTargetChain::new(renderer, chain("dual_filter_up", false), size.width, size.height) {
                Ok(c) => c,
                Err(err) => {
                    downsample_targets.release(renderer);
                    return Err(err);
                }
            };
        let programs = ShaderProgram::new(renderer, ProgramKind::DualFilterDownsample, BlendMode::Replace)
            .and_then(|down| {
                match ShaderProgram::new(renderer, ProgramKind::DualFilterUpsample, BlendMode::Replace) {
                    Ok(up) => Ok((down, up)),
                    Err(err) => {
                        down.release(renderer);
                        Err(err)
                    }
                }
            });
        let (downsample_program, upsample_program) = match programs {
            Ok(p) => p,
            Err(err) => {
                downsample_targets.release(renderer);
                upsample_targets.release(renderer);
                return Err(err);
            }
        };

        Ok(Self { label, downsample_targets, upsample_targets, downsample_program, upsample_program })
    }

    pub fn steps(&self) -> usize {
        self.downsample_targets.len()
    }

    pub fn resolution_factor(&self) -> f32 {
        self.downsample_targets.resolution_factor()
    }

    pub fn downsample_targets(&self) -> &RenderTargetChain {
        &self.downsample_targets
    }

    pub fn upsample_targets(&self) -> &RenderTargetChain {
        &self.upsample_targets
    }

    pub fn upsample_program(&self) -> &ShaderProgram {
        &self.upsample_program
    }

    pub fn is_released(&self) -> bool {
        self.downsample_targets.is_released()
    }

    /// Returns `true` when any level changed size.
    pub fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<bool> {
        let down = self.downsample_targets.set_size(renderer, width, height)?;
        let up = self.upsample_targets.set_size(renderer, width, height)?;
        Ok(down || up)
    }

    /// Step 1: render the scene into the base level. Per-eye XR viewports are
    /// scaled by the resolution factor for the duration of the render.
    pub fn render_base<R: HostRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &R::Camera,
    ) -> Result<()> {
        let base = self.downsample_targets.level(0);
        with_scaled_xr_viewports(renderer, self.resolution_factor(), |r| {
            r.set_render_target(Some(base))?;
            r.render_scene(scene, camera)
        })
    }

    /// Step 2: fill levels 1..n with the downsample kernel. The luminosity
    /// `threshold` applies to the first step only; later steps use 0.
    pub fn downsample<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, threshold: f32) -> Result<()> {
        let mut threshold = threshold;
        for i in 1..self.steps() {
            let previous = self.downsample_targets.level(i - 1);
            let res = self.downsample_targets.extent(i - 1).as_vec2().to_array();
            self.downsample_program.bind_input(0, Some(previous));
            if let Uniforms::Downsample(u) = &mut self.downsample_program.uniforms {
                u.previous_texture_res = res;
                u.luminosity_threshold = threshold;
            }
            run_pass(renderer, &self.downsample_program, Some(self.downsample_targets.level(i)), true)?;
            threshold = 0.0;
        }
        Ok(())
    }

    /// Step 3: seed from downsample level `seed` and upsample into levels
    /// `seed - 1` down to `stop` (inclusive; none when `stop >= seed`).
    ///
    /// Leaves the upsample program bound to the last result, so one more
    /// [`DualFilterPyramid::draw_upsample`] writes the next finer image
    /// anywhere. Returns that last result.
    pub fn upsample<R: HostRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        seed: usize,
        stop: usize,
    ) -> Result<RenderTargetId> {
        let mut source = self.downsample_targets.level(seed);
        self.bind_upsample_source(source, self.downsample_targets.extent(seed));
        for i in (stop..seed).rev() {
            let target = self.upsample_targets.level(i);
            run_pass(renderer, &self.upsample_program, Some(target), true)?;
            source = target;
            self.bind_upsample_source(target, self.upsample_targets.extent(i));
        }
        Ok(source)
    }

    /// Draw the currently bound upsample step into `target`, clearing it first.
    pub fn draw_upsample<R: HostRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        target: Option<RenderTargetId>,
        clear: bool,
    ) -> Result<()> {
        run_pass(renderer, &self.upsample_program, target, clear)
    }

    fn bind_upsample_source(&mut self, source: RenderTargetId, extent: Extent) {
        self.upsample_program.bind_input(0, Some(source));
        if let Uniforms::Upsample(u) = &mut self.upsample_program.uniforms {
            u.previous_texture_res = extent.as_vec2().to_array();
        }
    }

    /// Release both chains and both programs. Returns `false` when already released.
    pub fn release<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        if self.is_released() {
            return false;
        }
        self.downsample_targets.release(renderer);
        self.upsample_targets.release(renderer);
        self.downsample_program.release(renderer);
        self.upsample_program.release(renderer);
        log::debug!("{}: released pyramid", self.label);
        true
    }
}
