//! Post-processing effects.
//!
//! Every effect owns its render targets and shader programs for its whole
//! registered lifetime and exposes the same three operations through
//! [`PostProcessEffect`]. The composer only ever sees the closed [`Effect`]
//! sum, so it never special-cases a concrete kind.

pub mod blur;
pub mod bloom;
pub mod dual_filter;
pub mod single_pass;
pub mod unreal_bloom;

pub use blur::BlurEffect;
pub use bloom::BloomEffect;
pub use dual_filter::DualFilterPyramid;
pub use single_pass::{SinglePassEffect, SinglePassKind};
pub use unreal_bloom::UnrealBloomEffect;

use crate::config::EffectConfig;
use crate::error::{PostError, Result};
use crate::renderer::HostRenderer;

// ── PostProcessEffect ─────────────────────────────────────────────────────────

pub trait PostProcessEffect {
    /// Unique name of the effect type (e.g. "bloom").
    fn effect_name(&self) -> &'static str;

    /// Render `scene` through the effect into the renderer's currently bound
    /// target. The renderer's global state is the same afterwards, on error too.
    fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<()>;

    /// Resize owned targets for a presentation size of `width × height`.
    /// Resizes in place; a repeated call with the same size touches nothing.
    fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<()>;

    /// Release every owned resource exactly once. Later calls do nothing.
    fn dispose<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R);

    fn is_disposed(&self) -> bool;
}

// ── Effect ────────────────────────────────────────────────────────────────────

/// Broad family of an effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EffectFamily {
    /// Built on a dual-filter pyramid (blur, bloom, unreal bloom).
    BlurPyramid,
    /// One scene buffer and one full-screen draw.
    SinglePass,
}

pub enum Effect {
    Blur(BlurEffect),
    Bloom(BloomEffect),
    UnrealBloom(UnrealBloomEffect),
    SinglePass(SinglePassEffect),
}

impl Effect {
    /// Build the effect a preset describes, allocating its resources on `renderer`.
    pub fn from_config<R: HostRenderer + ?Sized>(renderer: &mut R, config: &EffectConfig) -> Result<Self> {
        let effect = match config {
            EffectConfig::Blur(c) => Self::Blur(BlurEffect::new(renderer, c)?),
            EffectConfig::Bloom(c) => Self::Bloom(BloomEffect::new(renderer, c)?),
            EffectConfig::UnrealBloom(c) => Self::UnrealBloom(UnrealBloomEffect::new(renderer, c)?),
            EffectConfig::Sobel(c) => Self::SinglePass(SinglePassEffect::sobel(renderer, c)?),
            EffectConfig::Pixelate(c) => Self::SinglePass(SinglePassEffect::pixelate(renderer, c)?),
            EffectConfig::ChromaticAberration(c) => {
                Self::SinglePass(SinglePassEffect::chromatic_aberration(renderer, c)?)
            }
        };
        log::debug!("built {} effect", effect.effect_name());
        Ok(effect)
    }

    /// Update parameters in place. The preset must describe the same kind of
    /// effect with the same pyramid layout.
    pub fn apply_config(&mut self, config: &EffectConfig) -> Result<()> {
        match (self, config) {
            (Self::Blur(e), EffectConfig::Blur(c)) => e.apply_config(c),
            (Self::Bloom(e), EffectConfig::Bloom(c)) => e.apply_config(c),
            (Self::UnrealBloom(e), EffectConfig::UnrealBloom(c)) => e.apply_config(c),
            (Self::SinglePass(e), EffectConfig::Sobel(_)) if e.kind() == SinglePassKind::Sobel => Ok(()),
            (Self::SinglePass(e), EffectConfig::Pixelate(c)) => e.set_pixel_size(c.pixel_size),
            (Self::SinglePass(e), EffectConfig::ChromaticAberration(c)) => {
                e.set_offset(c.offset)?;
                e.set_angle(c.angle)
            }
            (effect, config) => Err(PostError::InvalidConfig(format!(
                "cannot apply a {} preset to a {} effect",
                config.effect_name(),
                effect.effect_name()
            ))),
        }
    }

    pub fn family(&self) -> EffectFamily {
        match self {
            Self::SinglePass(_) => EffectFamily::SinglePass,
            _ => EffectFamily::BlurPyramid,
        }
    }

    pub fn as_blur_mut(&mut self) -> Option<&mut BlurEffect> {
        match self {
            Self::Blur(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_bloom_mut(&mut self) -> Option<&mut BloomEffect> {
        match self {
            Self::Bloom(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_unreal_bloom_mut(&mut self) -> Option<&mut UnrealBloomEffect> {
        match self {
            Self::UnrealBloom(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_single_pass_mut(&mut self) -> Option<&mut SinglePassEffect> {
        match self {
            Self::SinglePass(e) => Some(e),
            _ => None,
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $e:ident => $body:expr) => {
        match $self {
            Effect::Blur($e) => $body,
            Effect::Bloom($e) => $body,
            Effect::UnrealBloom($e) => $body,
            Effect::SinglePass($e) => $body,
        }
    };
}

impl PostProcessEffect for Effect {
    fn effect_name(&self) -> &'static str {
        dispatch!(self, e => e.effect_name())
    }

    fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<()> {
        dispatch!(self, e => e.render(renderer, scene, camera))
    }

    fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<()> {
        dispatch!(self, e => e.set_size(renderer, width, height))
    }

    fn dispose<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) {
        dispatch!(self, e => e.dispose(renderer))
    }

    fn is_disposed(&self) -> bool {
        dispatch!(self, e => e.is_disposed())
    }
}
