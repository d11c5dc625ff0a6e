//! Effect and composer configuration.
//!
//! Every field has a default, so a preset only names what it changes:
//!
//! ```json
//! { "type": "bloom", "strength": 1.5, "threshold": 0.6 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::renderer::Extent;

// ── Dual-filter effects ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Pyramid depth. Fixed once the effect exists.
    pub steps: usize,
    /// Size used until the composer synchronises the effect.
    pub resolution: Extent,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self { steps: 5, resolution: Extent::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub strength: f32,
    /// Luminosity cutoff of the first downsample step.
    pub threshold: f32,
    /// Accepted for preset compatibility with unreal bloom; the basic composite does not use it.
    pub radius: f32,
    /// Pyramid depth. Fixed once the effect exists.
    pub steps: usize,
    pub resolution: Extent,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self { strength: 1.0, threshold: 0.8, radius: 1.0, steps: 5, resolution: Extent::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnrealBloomConfig {
    pub strength: f32,
    pub threshold: f32,
    /// 0 favours fine mips, 1 favours coarse mips.
    pub radius: f32,
    /// Number of pyramid levels. Fixed once the effect exists.
    pub mips: usize,
    /// First level captured into the blur sub-chain.
    pub target_mip: usize,
    /// RGB tint per captured blur level.
    pub tint_colors: [[f32; 3]; 5],
    pub resolution: Extent,
}

impl Default for UnrealBloomConfig {
    fn default() -> Self {
        Self {
            strength: 0.2,
            threshold: 0.5,
            radius: 0.0,
            mips: 7,
            target_mip: 2,
            tint_colors: [[1.0; 3]; 5],
            resolution: Extent::default(),
        }
    }
}

// ── Single-pass effects ───────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SobelConfig {
    pub resolution: Extent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelateConfig {
    /// Edge length of one output cell in pixels.
    pub pixel_size: f32,
    pub resolution: Extent,
}

impl Default for PixelateConfig {
    fn default() -> Self {
        Self { pixel_size: 8.0, resolution: Extent::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaticAberrationConfig {
    /// Channel displacement strength.
    pub offset: f32,
    /// Rotation of the displacement direction in radians.
    pub angle: f32,
    pub resolution: Extent,
}

impl Default for ChromaticAberrationConfig {
    fn default() -> Self {
        Self { offset: 1.0, angle: 0.0, resolution: Extent::new(1024, 1024) }
    }
}

// ── EffectConfig ──────────────────────────────────────────────────────────────

/// Preset for any built-in effect, tagged by `"type"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectConfig {
    Blur(BlurConfig),
    Bloom(BloomConfig),
    UnrealBloom(UnrealBloomConfig),
    Sobel(SobelConfig),
    Pixelate(PixelateConfig),
    ChromaticAberration(ChromaticAberrationConfig),
}

impl EffectConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a preset file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Name of the effect the preset builds.
    pub fn effect_name(&self) -> &'static str {
        match self {
            Self::Blur(_) => "blur",
            Self::Bloom(_) => "bloom",
            Self::UnrealBloom(_) => "unreal_bloom",
            Self::Sobel(_) => "sobel",
            Self::Pixelate(_) => "pixelate",
            Self::ChromaticAberration(_) => "chromatic_aberration",
        }
    }
}

// ── ComposerConfig ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// When false every frame falls through to the host's default render.
    pub enabled: bool,
    /// Reject a second registration while an effect is active.
    pub exclusive: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self { enabled: true, exclusive: false }
    }
}
