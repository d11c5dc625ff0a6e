//! Unreal-style bloom.
//!
//! Renders the scene at half resolution, builds a `mips`-level dual-filter
//! pyramid and captures up to five progressively blurrier images into a blur
//! sub-chain sized like mip `target_mip`:
//!
//! ```text
//! blur[k] = upsample(down[target_mip + k] → … → up[target_mip + 1])
//! ```
//!
//! The final frame is the ordinary scene render with the weighted, tinted sum
//! of the blur levels blended on top additively.

use super::PostProcessEffect;
use super::dual_filter::DualFilterPyramid;
use crate::config::UnrealBloomConfig;
use crate::error::{PostError, Result};
use crate::renderer::program::UNREAL_BLUR_LEVELS;
use crate::renderer::target_chain::ChainDesc;
use crate::renderer::{
    BlendMode, ChainShape, HostRenderer, ProgramKind, RenderTargetChain, RendererStateGuard, ShaderProgram,
    TextureFormat, Uniforms,
};

/// Per-level weights, finest first.
pub const BLOOM_FACTORS: [f32; UNREAL_BLUR_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];

pub struct UnrealBloomEffect {
    pyramid: DualFilterPyramid,
    blur_targets: RenderTargetChain,
    composite_program: ShaderProgram,
    target_mip: usize,
    pub strength: f32,
    pub threshold: f32,
    pub radius: f32,
    tint_colors: [[f32; 3]; UNREAL_BLUR_LEVELS],
}

impl UnrealBloomEffect {
    pub const RESOLUTION_FACTOR: f32 = 0.5;

    pub fn new<R: HostRenderer + ?Sized>(renderer: &mut R, config: &UnrealBloomConfig) -> Result<Self> {
        if config.target_mip >= config.mips {
            return Err(PostError::InvalidConfig(format!(
                "unreal_bloom: target mip {} outside of {} mips",
                config.target_mip, config.mips
            )));
        }
        let size = config.resolution;
        let mut pyramid =
            DualFilterPyramid::new(renderer, "unreal_bloom", config.mips, Self::RESOLUTION_FACTOR, size)?;

        let blur_desc = ChainDesc {
            label: "unreal_bloom_blur",
            len: (config.mips - config.target_mip).min(UNREAL_BLUR_LEVELS),
            shape: ChainShape::Fixed { mip: config.target_mip },
            resolution_factor: Self::RESOLUTION_FACTOR,
            format: TextureFormat::Rgba16Float,
            depth_on_base: false,
        };
        let mut blur_targets = match RenderTargetChain::new(renderer, blur_desc, size.width, size.height) {
            Ok(c) => c,
            Err(err) => {
                pyramid.release(renderer);
                return Err(err);
            }
        };
        let composite_program =
            match ShaderProgram::new(renderer, ProgramKind::UnrealBloomComposite, BlendMode::Additive) {
                Ok(p) => p,
                Err(err) => {
                    pyramid.release(renderer);
                    blur_targets.release(renderer);
                    return Err(err);
                }
            };

        let mut effect = Self {
            pyramid,
            blur_targets,
            composite_program,
            target_mip: config.target_mip,
            strength: config.strength,
            threshold: config.threshold,
            radius: config.radius,
            tint_colors: config.tint_colors,
        };
        effect.bind_blur_levels();
        Ok(effect)
    }

    pub fn mips(&self) -> usize {
        self.pyramid.steps()
    }

    pub fn target_mip(&self) -> usize {
        self.target_mip
    }

    pub fn pyramid(&self) -> &DualFilterPyramid {
        &self.pyramid
    }

    pub fn blur_targets(&self) -> &RenderTargetChain {
        &self.blur_targets
    }

    pub fn composite_program(&self) -> &ShaderProgram {
        &self.composite_program
    }

    pub fn tint_colors(&self) -> &[[f32; 3]; UNREAL_BLUR_LEVELS] {
        &self.tint_colors
    }

    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    pub fn set_tint_color(&mut self, level: usize, rgb: [f32; 3]) -> Result<()> {
        let slot = self.tint_colors.get_mut(level).ok_or_else(|| {
            PostError::InvalidConfig(format!("unreal_bloom: tint level {level} out of range"))
        })?;
        *slot = rgb;
        Ok(())
    }

    /// Update the tunable parameters. Mip layout cannot change.
    pub fn apply_config(&mut self, config: &UnrealBloomConfig) -> Result<()> {
        if config.mips != self.mips() || config.target_mip != self.target_mip {
            return Err(PostError::InvalidConfig(format!(
                "unreal_bloom mip layout is fixed at {}/{} (requested {}/{})",
                self.mips(),
                self.target_mip,
                config.mips,
                config.target_mip
            )));
        }
        self.strength = config.strength;
        self.threshold = config.threshold;
        self.radius = config.radius;
        self.tint_colors = config.tint_colors;
        Ok(())
    }

    fn bind_blur_levels(&mut self) {
        for level in 0..self.blur_targets.len() {
            self.composite_program.bind_input(level, self.blur_targets.get(level));
        }
        if let Uniforms::UnrealComposite(u) = &mut self.composite_program.uniforms {
            u.bloom_factors = [BLOOM_FACTORS[0], BLOOM_FACTORS[1], BLOOM_FACTORS[2], BLOOM_FACTORS[3]];
            u.bloom_factor_4 = BLOOM_FACTORS[4];
            u.num_mips = self.blur_targets.len() as u32;
        }
    }

    fn upload_parameters(&mut self) {
        if let Uniforms::UnrealComposite(u) = &mut self.composite_program.uniforms {
            u.bloom_strength = self.strength;
            u.bloom_radius = self.radius;
            for (dst, [r, g, b]) in u.bloom_tint_colors.iter_mut().zip(self.tint_colors) {
                *dst = [r, g, b, 1.0];
            }
        }
    }
}

impl PostProcessEffect for UnrealBloomEffect {
    fn effect_name(&self) -> &'static str {
        "unreal_bloom"
    }

    fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<()> {
        if self.is_disposed() {
            return Err(PostError::Disposed(self.effect_name()));
        }
        let mut guard = RendererStateGuard::enter(renderer);
        self.pyramid.render_base(&mut *guard, scene, camera)?;
        // The scene is rendered again below; keep the host's frame count at one.
        let info = guard.info_mut();
        info.frame = info.frame.saturating_sub(1);
        guard.isolate();

        self.pyramid.downsample(&mut *guard, self.threshold)?;

        let mips = self.mips();
        if mips > 1 {
            let first = mips - self.blur_targets.len();
            for start in (first..mips).rev() {
                self.pyramid.upsample(&mut *guard, start, self.target_mip + 1)?;
                let blur = self.blur_targets.level(start - first);
                self.pyramid.draw_upsample(&mut *guard, Some(blur), true)?;
            }
        } else {
            // Nothing was thresholded; keep the blur level empty so only the scene shows.
            for level in 0..self.blur_targets.len() {
                guard.set_render_target(Some(self.blur_targets.level(level)))?;
                guard.clear()?;
            }
        }
        self.upload_parameters();

        let presentation = guard.presentation_target();
        guard.set_render_target(presentation)?;
        guard.with_caller_state(|r| r.render_scene(scene, camera))?;
        guard.bind_presentation()?;
        guard.draw_fullscreen(&self.composite_program)
    }

    fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<()> {
        self.pyramid.set_size(renderer, width, height)?;
        self.blur_targets.set_size(renderer, width, height)?;
        Ok(())
    }

    fn dispose<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) {
        if self.pyramid.release(renderer) {
            self.blur_targets.release(renderer);
            self.composite_program.release(renderer);
        }
    }

    fn is_disposed(&self) -> bool {
        self.pyramid.is_released()
    }
}
