// ── BloomEffect ───────────────────────────────────────────────────────────────
//
// Basic dual-filter bloom. The first downsample step keeps only pixels above
// the luminosity threshold; the fully upsampled result is added back onto the
// unthresholded base image, scaled by `strength`.

use super::PostProcessEffect;
use super::dual_filter::DualFilterPyramid;
use crate::config::BloomConfig;
use crate::error::{PostError, Result};
use crate::renderer::{BlendMode, HostRenderer, ProgramKind, RendererStateGuard, ShaderProgram, Uniforms};

/// Composite input slots.
const BLUR_SLOT: usize = 0;
const BASE_SLOT: usize = 1;

pub struct BloomEffect {
    pyramid: DualFilterPyramid,
    composite_program: ShaderProgram,
    pub strength: f32,
    pub threshold: f32,
    /// Stored for preset compatibility; the basic composite ignores it.
    pub radius: f32,
}

impl BloomEffect {
    pub const RESOLUTION_FACTOR: f32 = 1.0;

    pub fn new<R: HostRenderer + ?Sized>(renderer: &mut R, config: &BloomConfig) -> Result<Self> {
        let mut pyramid =
            DualFilterPyramid::new(renderer, "bloom", config.steps, Self::RESOLUTION_FACTOR, config.resolution)?;
        let composite_program = match ShaderProgram::new(renderer, ProgramKind::BloomComposite, BlendMode::Replace) {
            Ok(p) => p,
            Err(err) => {
                pyramid.release(renderer);
                return Err(err);
            }
        };
        Ok(Self {
            pyramid,
            composite_program,
            strength: config.strength,
            threshold: config.threshold,
            radius: config.radius,
        })
    }

    pub fn steps(&self) -> usize {
        self.pyramid.steps()
    }

    pub fn pyramid(&self) -> &DualFilterPyramid {
        &self.pyramid
    }

    pub fn composite_program(&self) -> &ShaderProgram {
        &self.composite_program
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

    /// Update the tunable parameters. The step count cannot change.
    pub fn apply_config(&mut self, config: &BloomConfig) -> Result<()> {
        if config.steps != self.steps() {
            return Err(PostError::InvalidConfig(format!(
                "bloom step count is fixed at {} (requested {})",
                self.steps(),
                config.steps
            )));
        }
        self.strength = config.strength;
        self.threshold = config.threshold;
        self.radius = config.radius;
        Ok(())
    }
}

impl PostProcessEffect for BloomEffect {
    fn effect_name(&self) -> &'static str {
        "bloom"
    }

    fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<()> {
        if self.is_disposed() {
            return Err(PostError::Disposed(self.effect_name()));
        }
        let mut guard = RendererStateGuard::enter(renderer);
        self.pyramid.render_base(&mut *guard, scene, camera)?;
        guard.isolate();

        // A single level has no thresholded image to add back: only the base is drawn.
        let blurred = if self.steps() > 1 {
            self.pyramid.downsample(&mut *guard, self.threshold)?;
            Some(self.pyramid.upsample(&mut *guard, self.steps() - 1, 0)?)
        } else {
            None
        };

        self.composite_program.bind_input(BLUR_SLOT, blurred);
        self.composite_program.bind_input(BASE_SLOT, Some(self.pyramid.downsample_targets().level(0)));
        if let Uniforms::BloomComposite(u) = &mut self.composite_program.uniforms {
            u.bloom_strength = if blurred.is_some() { self.strength } else { 0.0 };
        }

        guard.bind_presentation()?;
        guard.clear()?;
        guard.draw_fullscreen(&self.composite_program)
    }

    fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<()> {
        self.pyramid.set_size(renderer, width, height).map(|_| ())
    }

    fn dispose<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) {
        if self.pyramid.release(renderer) {
            self.composite_program.release(renderer);
        }
    }

    fn is_disposed(&self) -> bool {
        self.pyramid.is_released()
    }
}
