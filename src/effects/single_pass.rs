// ── SinglePassEffect ──────────────────────────────────────────────────────────
//
// Sobel, pixelate and chromatic aberration: the scene goes into one
// multisampled target at presentation size, then one full-screen draw filters
// it onto the presentation target.

use super::PostProcessEffect;
use crate::config::{ChromaticAberrationConfig, PixelateConfig, SobelConfig};
use crate::error::{PostError, Result};
use crate::renderer::{
    BlendMode, Extent, HostRenderer, ProgramKind, RenderTargetDesc, RenderTargetId, RendererStateGuard,
    ShaderProgram, TextureFormat, Uniforms,
};

/// MSAA sample count of the scene buffer.
pub const SCENE_SAMPLES: u32 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SinglePassKind {
    Sobel,
    Pixelate,
    ChromaticAberration,
}

impl SinglePassKind {
    pub fn program_kind(self) -> ProgramKind {
        match self {
            Self::Sobel => ProgramKind::Sobel,
            Self::Pixelate => ProgramKind::Pixelate,
            Self::ChromaticAberration => ProgramKind::ChromaticAberration,
        }
    }

    pub fn name(self) -> &'static str {
        self.program_kind().label()
    }
}

pub struct SinglePassEffect {
    kind: SinglePassKind,
    scene_target: RenderTargetId,
    extent: Extent,
    program: ShaderProgram,
    disposed: bool,
}

impl SinglePassEffect {
    fn new<R: HostRenderer + ?Sized>(renderer: &mut R, kind: SinglePassKind, resolution: Extent) -> Result<Self> {
        let extent = Extent::new(resolution.width, resolution.height);
        let desc = RenderTargetDesc::new(kind.name(), extent, TextureFormat::Rgba8UnormSrgb)
            .with_depth(true)
            .with_samples(SCENE_SAMPLES);
        let scene_target = renderer.create_render_target(&desc)?;
        let mut program = match ShaderProgram::new(renderer, kind.program_kind(), BlendMode::Replace) {
            Ok(p) => p,
            Err(err) => {
                renderer.release_render_target(scene_target);
                return Err(err);
            }
        };
        program.bind_input(0, Some(scene_target));

        let mut effect = Self { kind, scene_target, extent, program, disposed: false };
        effect.upload_resolution();
        Ok(effect)
    }

    pub fn sobel<R: HostRenderer + ?Sized>(renderer: &mut R, config: &SobelConfig) -> Result<Self> {
        Self::new(renderer, SinglePassKind::Sobel, config.resolution)
    }

    pub fn pixelate<R: HostRenderer + ?Sized>(renderer: &mut R, config: &PixelateConfig) -> Result<Self> {
        let mut effect = Self::new(renderer, SinglePassKind::Pixelate, config.resolution)?;
        effect.set_pixel_size(config.pixel_size)?;
        Ok(effect)
    }

    pub fn chromatic_aberration<R: HostRenderer + ?Sized>(
        renderer: &mut R,
        config: &ChromaticAberrationConfig,
    ) -> Result<Self> {
        let mut effect = Self::new(renderer, SinglePassKind::ChromaticAberration, config.resolution)?;
        effect.set_offset(config.offset)?;
        effect.set_angle(config.angle)?;
        Ok(effect)
    }

    pub fn kind(&self) -> SinglePassKind {
        self.kind
    }

    pub fn scene_target(&self) -> RenderTargetId {
        self.scene_target
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn set_pixel_size(&mut self, pixel_size: f32) -> Result<()> {
        match &mut self.program.uniforms {
            Uniforms::Pixelate(u) => {
                u.pixel_size = pixel_size;
                Ok(())
            }
            _ => Err(mismatch(self.kind, "pixel_size")),
        }
    }

    pub fn set_offset(&mut self, offset: f32) -> Result<()> {
        match &mut self.program.uniforms {
            Uniforms::ChromaticAberration(u) => {
                u.offset = offset;
                Ok(())
            }
            _ => Err(mismatch(self.kind, "offset")),
        }
    }

    pub fn set_angle(&mut self, angle: f32) -> Result<()> {
        match &mut self.program.uniforms {
            Uniforms::ChromaticAberration(u) => {
                u.angle = angle;
                Ok(())
            }
            _ => Err(mismatch(self.kind, "angle")),
        }
    }

    fn upload_resolution(&mut self) {
        let res = self.extent.as_vec2().to_array();
        match &mut self.program.uniforms {
            Uniforms::Sobel(u) => u.resolution = res,
            Uniforms::Pixelate(u) => u.resolution = res,
            Uniforms::ChromaticAberration(u) => u.resolution = res,
            _ => {}
        }
    }
}

fn mismatch(kind: SinglePassKind, parameter: &str) -> PostError {
    PostError::InvalidConfig(format!("{} has no `{parameter}` parameter", kind.name()))
}

impl PostProcessEffect for SinglePassEffect {
    fn effect_name(&self) -> &'static str {
        self.kind.name()
    }

    fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<()> {
        if self.disposed {
            return Err(PostError::Disposed(self.effect_name()));
        }
        let mut guard = RendererStateGuard::enter(renderer);
        guard.set_render_target(Some(self.scene_target))?;
        guard.render_scene(scene, camera)?;
        guard.isolate();

        guard.bind_presentation()?;
        guard.draw_fullscreen(&self.program)
    }

    fn set_size<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, width: u32, height: u32) -> Result<()> {
        if self.disposed {
            return Err(PostError::Disposed(self.effect_name()));
        }
        let extent = Extent::new(width, height);
        if extent == self.extent {
            return Ok(());
        }
        renderer.resize_render_target(self.scene_target, extent)?;
        self.extent = extent;
        self.upload_resolution();
        log::debug!("{}: resized to {}x{}", self.effect_name(), extent.width, extent.height);
        Ok(())
    }

    fn dispose<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) {
        if self.disposed {
            return;
        }
        renderer.release_render_target(self.scene_target);
        self.program.release(renderer);
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
