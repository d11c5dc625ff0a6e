// ── Shader programs ───────────────────────────────────────────────────────────
//
// A `ShaderProgram` is one full-screen fragment program plus its bound inputs
// and uniform block. Effects create each program once and rebind inputs and
// uniforms in place before every draw, so steady-state frames allocate nothing.

use bytemuck::{Pod, Zeroable};

use super::{HostRenderer, ProgramId, RenderTargetId};
use crate::error::Result;

/// Maximum number of texture inputs any program samples.
pub const MAX_PROGRAM_INPUTS: usize = 5;

/// Number of blur levels the unreal-style composite accumulates.
pub const UNREAL_BLUR_LEVELS: usize = 5;

// ── ProgramKind ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    DualFilterDownsample,
    DualFilterUpsample,
    BloomComposite,
    UnrealBloomComposite,
    Sobel,
    Pixelate,
    ChromaticAberration,
}

impl ProgramKind {
    /// Number of texture inputs the fragment stage samples.
    pub fn input_count(self) -> usize {
        match self {
            Self::BloomComposite => 2,
            Self::UnrealBloomComposite => UNREAL_BLUR_LEVELS,
            _ => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DualFilterDownsample => "dual_filter_downsample",
            Self::DualFilterUpsample => "dual_filter_upsample",
            Self::BloomComposite => "bloom_composite",
            Self::UnrealBloomComposite => "unreal_bloom_composite",
            Self::Sobel => "sobel",
            Self::Pixelate => "pixelate",
            Self::ChromaticAberration => "chromatic_aberration",
        }
    }
}

/// How a program's output combines with the target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Overwrite the target.
    Replace,
    /// `src * 1 + dst * 1` for color and alpha.
    Additive,
}

// ── Uniform blocks ────────────────────────────────────────────────────────────
//
// Layouts follow WGSL uniform rules: every block is a multiple of 16 bytes.

/// Downsample pass: size of the texture being read and the luminosity cutoff.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DownsampleUniforms {
    pub previous_texture_res: [f32; 2],
    pub luminosity_threshold: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct UpsampleUniforms {
    pub previous_texture_res: [f32; 2],
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BloomCompositeUniforms {
    pub bloom_strength: f32,
    pub _pad: [f32; 3],
}

/// Unreal-style composite: per-level weights, tints and the radius blend.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct UnrealCompositeUniforms {
    /// Weights of levels 0..4.
    pub bloom_factors: [f32; 4],
    /// Weight of level 4.
    pub bloom_factor_4: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    /// Number of bound blur levels (≤ 5).
    pub num_mips: u32,
    /// RGB tint per level; `w` unused.
    pub bloom_tint_colors: [[f32; 4]; UNREAL_BLUR_LEVELS],
}

impl UnrealCompositeUniforms {
    pub fn factor(&self, level: usize) -> f32 {
        if level < 4 { self.bloom_factors[level] } else { self.bloom_factor_4 }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SobelUniforms {
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PixelateUniforms {
    pub resolution: [f32; 2],
    pub pixel_size: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ChromaticAberrationUniforms {
    pub resolution: [f32; 2],
    pub offset: f32,
    pub angle: f32,
}

/// Uniform block of a program, tagged by kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Uniforms {
    Downsample(DownsampleUniforms),
    Upsample(UpsampleUniforms),
    BloomComposite(BloomCompositeUniforms),
    UnrealComposite(UnrealCompositeUniforms),
    Sobel(SobelUniforms),
    Pixelate(PixelateUniforms),
    ChromaticAberration(ChromaticAberrationUniforms),
}

impl Uniforms {
    /// Zeroed uniforms for `kind`.
    pub fn for_kind(kind: ProgramKind) -> Self {
        match kind {
            ProgramKind::DualFilterDownsample => Self::Downsample(Zeroable::zeroed()),
            ProgramKind::DualFilterUpsample => Self::Upsample(Zeroable::zeroed()),
            ProgramKind::BloomComposite => Self::BloomComposite(Zeroable::zeroed()),
            ProgramKind::UnrealBloomComposite => Self::UnrealComposite(Zeroable::zeroed()),
            ProgramKind::Sobel => Self::Sobel(Zeroable::zeroed()),
            ProgramKind::Pixelate => Self::Pixelate(Zeroable::zeroed()),
            ProgramKind::ChromaticAberration => Self::ChromaticAberration(Zeroable::zeroed()),
        }
    }

    pub fn kind(&self) -> ProgramKind {
        match self {
            Self::Downsample(_) => ProgramKind::DualFilterDownsample,
            Self::Upsample(_) => ProgramKind::DualFilterUpsample,
            Self::BloomComposite(_) => ProgramKind::BloomComposite,
            Self::UnrealComposite(_) => ProgramKind::UnrealBloomComposite,
            Self::Sobel(_) => ProgramKind::Sobel,
            Self::Pixelate(_) => ProgramKind::Pixelate,
            Self::ChromaticAberration(_) => ProgramKind::ChromaticAberration,
        }
    }

    /// Raw bytes for a GPU uniform buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Downsample(u) => bytemuck::bytes_of(u),
            Self::Upsample(u) => bytemuck::bytes_of(u),
            Self::BloomComposite(u) => bytemuck::bytes_of(u),
            Self::UnrealComposite(u) => bytemuck::bytes_of(u),
            Self::Sobel(u) => bytemuck::bytes_of(u),
            Self::Pixelate(u) => bytemuck::bytes_of(u),
            Self::ChromaticAberration(u) => bytemuck::bytes_of(u),
        }
    }
}

// ── ShaderProgram ─────────────────────────────────────────────────────────────

/// A program instance exclusively owned by one effect.
#[derive(Clone, Debug)]
pub struct ShaderProgram {
    id: ProgramId,
    blend: BlendMode,
    inputs: [Option<RenderTargetId>; MAX_PROGRAM_INPUTS],
    pub uniforms: Uniforms,
}

impl ShaderProgram {
    /// Allocate the program on `renderer`.
    pub fn new<R: HostRenderer + ?Sized>(
        renderer: &mut R,
        kind: ProgramKind,
        blend: BlendMode,
    ) -> Result<Self> {
        let id = renderer.create_program(kind, blend)?;
        log::debug!("created {} program {:?}", kind.label(), id);
        Ok(Self { id, blend, inputs: [None; MAX_PROGRAM_INPUTS], uniforms: Uniforms::for_kind(kind) })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn kind(&self) -> ProgramKind {
        self.uniforms.kind()
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn inputs(&self) -> &[Option<RenderTargetId>] {
        &self.inputs[..self.kind().input_count()]
    }

    pub fn input(&self, slot: usize) -> Option<RenderTargetId> {
        self.inputs.get(slot).copied().flatten()
    }

    /// Bind `target`'s color texture to input `slot`.
    pub fn bind_input(&mut self, slot: usize, target: Option<RenderTargetId>) {
        debug_assert!(slot < self.kind().input_count(), "input slot out of range");
        self.inputs[slot] = target;
    }

    pub fn release<R: HostRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.release_program(self.id);
    }
}

// ── Pass runner ───────────────────────────────────────────────────────────────

/// Run one full-screen pass of `program` into `target`, clearing it first
/// when `clear` is set.
pub fn run_pass<R: HostRenderer + ?Sized>(
    renderer: &mut R,
    program: &ShaderProgram,
    target: Option<RenderTargetId>,
    clear: bool,
) -> Result<()> {
    renderer.set_render_target(target)?;
    if clear {
        renderer.clear()?;
    }
    log::trace!("{} pass -> {:?}", program.kind().label(), target);
    renderer.draw_fullscreen(program)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_blocks_are_16_byte_aligned() {
        for kind in [
            ProgramKind::DualFilterDownsample,
            ProgramKind::DualFilterUpsample,
            ProgramKind::BloomComposite,
            ProgramKind::UnrealBloomComposite,
            ProgramKind::Sobel,
            ProgramKind::Pixelate,
            ProgramKind::ChromaticAberration,
        ] {
            let u = Uniforms::for_kind(kind);
            assert_eq!(u.kind(), kind);
            assert_eq!(u.as_bytes().len() % 16, 0, "{kind:?}");
        }
    }

    #[test]
    fn unreal_block_is_112_bytes() {
        assert_eq!(std::mem::size_of::<UnrealCompositeUniforms>(), 112);
    }

    #[test]
    fn unreal_factor_reads_fifth_level_from_tail_field() {
        let mut u: UnrealCompositeUniforms = Zeroable::zeroed();
        u.bloom_factors = [1.0, 0.8, 0.6, 0.4];
        u.bloom_factor_4 = 0.2;
        assert_eq!(u.factor(0), 1.0);
        assert_eq!(u.factor(4), 0.2);
    }
}
