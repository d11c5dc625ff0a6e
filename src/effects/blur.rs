// ── BlurEffect ────────────────────────────────────────────────────────────────
//
// Full-screen dual-filter blur: downsample `steps - 1` times, upsample back to
// level 1, and let the last upsample write straight to the presentation target.

use super::PostProcessEffect;
use super::dual_filter::DualFilterPyramid;
use crate::config::BlurConfig;
use crate::error::{PostError, Result};
use crate::renderer::{HostRenderer, RendererStateGuard};

pub struct BlurEffect {
    pyramid: DualFilterPyramid,
}

impl BlurEffect {
    pub const RESOLUTION_FACTOR: f32 = 1.0;

    pub fn new<R: HostRenderer + ?Sized>(renderer: &mut R, config: &BlurConfig) -> Result<Self> {
        let pyramid =
            DualFilterPyramid::new(renderer, "blur", config.steps, Self::RESOLUTION_FACTOR, config.resolution)?;
        Ok(Self { pyramid })
    }

    pub fn steps(&self) -> usize {
        self.pyramid.steps()
    }

    pub fn pyramid(&self) -> &DualFilterPyramid {
        &self.pyramid
    }

    /// Blur has no tunable parameters; only a step count change is rejected.
    pub fn apply_config(&mut self, config: &BlurConfig) -> Result<()> {
        if config.steps != self.steps() {
            return Err(PostError::InvalidConfig(format!(
                "blur step count is fixed at {} (requested {})",
                self.steps(),
                config.steps
            )));
        }
        Ok(())
    }
}

impl PostProcessEffect for BlurEffect {
    fn effect_name(&self) -> &'static str {
        "blur"
    }

    fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<()> {
        if self.is_disposed() {
            return Err(PostError::Disposed(self.effect_name()));
        }
        let mut guard = RendererStateGuard::enter(renderer);
        self.pyramid.render_base(&mut *guard, scene, camera)?;
        guard.isolate();

        self.pyramid.downsample(&mut *guard, 0.0)?;
        let seed = self.steps() - 1;
        self.pyramid.upsample(&mut *guard, seed, 1)?;

        guard.bind_presentation()?;
        guard.clear()?;
        let presentation = guard.presentation_target();
        self.pyramid.draw_upsample(&mut *guard, presentation, false)
    }

    fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<()> {
        self.pyramid.set_size(renderer, width, height).map(|_| ())
    }

    fn dispose<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.pyramid.release(renderer);
    }

    fn is_disposed(&self) -> bool {
        self.pyramid.is_released()
    }
}
