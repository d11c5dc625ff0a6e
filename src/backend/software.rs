//! CPU reference renderer.
//!
//! [`SoftwareRenderer`] implements [`HostRenderer`] over plain `Vec<Vec4>`
//! pixel buffers. Every shader program is evaluated per pixel by
//! [`kernels::shade`], the CPU twin of the WGSL sources, with bilinear,
//! clamp-to-edge sampling like the GPU sampler. Besides producing real
//! images it counts every allocation, resize, release, scene render and draw
//! so tests can check resource ownership and scheduling directly.

use glam::{Vec2, Vec4};

use crate::error::{PostError, Result};
use crate::renderer::{
    BlendMode, Color, Extent, HostRenderer, ProgramId, ProgramKind, RenderInfo, RenderTargetDesc, RenderTargetId,
    ShaderProgram, TextureFormat, Viewport, XrCamera, XrState,
};

// ── Scene ─────────────────────────────────────────────────────────────────────

/// A procedural scene: color as a function of the normalised position inside
/// the viewport being rendered (one viewport per eye in stereo).
pub trait SoftwareScene {
    /// `eye` is `Some(i)` while rendering eye `i` of a stereo frame.
    fn shade(&self, uv: Vec2, eye: Option<usize>) -> Vec4;
}

impl<F> SoftwareScene for F
where
    F: Fn(Vec2) -> Vec4,
{
    fn shade(&self, uv: Vec2, _eye: Option<usize>) -> Vec4 {
        self(uv)
    }
}

/// Single flat color everywhere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolidScene(pub Vec4);

impl SoftwareScene for SolidScene {
    fn shade(&self, _uv: Vec2, _eye: Option<usize>) -> Vec4 {
        self.0
    }
}

// ── Image ─────────────────────────────────────────────────────────────────────

/// Linear RGBA float image, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    extent: Extent,
    format: TextureFormat,
    pixels: Vec<Vec4>,
}

impl Image {
    pub fn new(extent: Extent, format: TextureFormat) -> Self {
        let len = extent.width as usize * extent.height as usize;
        Self { extent, format, pixels: vec![Vec4::ZERO; len] }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[self.index(x, y)]
    }

    /// Store `value`, clamped to `[0, 1]` for 8-bit formats.
    pub fn set(&mut self, x: u32, y: u32, value: Vec4) {
        let value = match self.format {
            TextureFormat::Rgba16Float => value,
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => value.clamp(Vec4::ZERO, Vec4::ONE),
        };
        let i = self.index(x, y);
        self.pixels[i] = value;
    }

    pub fn fill(&mut self, value: Vec4) {
        self.pixels.fill(value);
    }

    /// Bilinear sample with clamp-to-edge addressing; `uv` origin is top-left.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let size = self.extent.as_vec2();
        let p = uv * size - Vec2::splat(0.5);
        let base = p.floor();
        let f = p - base;
        let clamp_x = |x: f32| x.clamp(0.0, size.x - 1.0) as u32;
        let clamp_y = |y: f32| y.clamp(0.0, size.y - 1.0) as u32;
        let (x0, x1) = (clamp_x(base.x), clamp_x(base.x + 1.0));
        let (y0, y1) = (clamp_y(base.y), clamp_y(base.y + 1.0));
        let top = self.get(x0, y0).lerp(self.get(x1, y0), f.x);
        let bottom = self.get(x0, y1).lerp(self.get(x1, y1), f.x);
        top.lerp(bottom, f.y)
    }

    /// Mean of every pixel.
    pub fn average(&self) -> Vec4 {
        let sum: Vec4 = self.pixels.iter().copied().sum();
        sum / self.pixels.len() as f32
    }

    /// Largest per-channel difference to `other`; `None` when sizes differ.
    pub fn max_difference(&self, other: &Image) -> Option<f32> {
        if self.extent != other.extent {
            return None;
        }
        let max = self
            .pixels
            .iter()
            .zip(&other.pixels)
            .map(|(a, b)| (*a - *b).abs().max_element())
            .fold(0.0, f32::max);
        Some(max)
    }

    /// 8-bit sRGB-encoded copy for writing to disk.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.extent.width, self.extent.height, |x, y| {
            let p = self.get(x, y).clamp(Vec4::ZERO, Vec4::ONE);
            let encode = |c: f32| (linear_to_srgb(c) * 255.0).round() as u8;
            image::Rgba([encode(p.x), encode(p.y), encode(p.z), (p.w * 255.0).round() as u8])
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.extent.width as usize + x as usize
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 { c * 12.92 } else { 1.055 * c.powf(1.0 / 2.4) - 0.055 }
}

// ── Kernels ───────────────────────────────────────────────────────────────────

/// Per-pixel evaluation of every program kind, in step with the WGSL sources.
pub mod kernels {
    use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

    use super::Image;
    use crate::renderer::Uniforms;

    pub fn luminance(rgb: Vec3) -> f32 {
        rgb.dot(Vec3::new(0.2126, 0.7152, 0.0722))
    }

    pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
        let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// Luminosity high pass of the first downsample step.
    pub fn threshold_weight(threshold: f32, color: Vec3) -> f32 {
        if threshold > 0.0 { smoothstep(threshold, threshold + 0.01, luminance(color)) } else { 1.0 }
    }

    fn tap(inputs: &[Option<&Image>], slot: usize, uv: Vec2) -> Vec4 {
        inputs.get(slot).copied().flatten().map_or(Vec4::ZERO, |img| img.sample(uv))
    }

    /// Output color of the program with `uniforms` at `uv`.
    pub fn shade(uniforms: &Uniforms, inputs: &[Option<&Image>], uv: Vec2) -> Vec4 {
        match uniforms {
            Uniforms::Downsample(u) => {
                let half = Vec2::splat(0.5) / Vec2::from(u.previous_texture_res);
                let mut sum = tap(inputs, 0, uv) * 4.0;
                sum += tap(inputs, 0, uv - half);
                sum += tap(inputs, 0, uv + half);
                sum += tap(inputs, 0, uv + Vec2::new(half.x, -half.y));
                sum += tap(inputs, 0, uv - Vec2::new(half.x, -half.y));
                let color = sum / 8.0;
                color * threshold_weight(u.luminosity_threshold, color.xyz())
            }
            Uniforms::Upsample(u) => {
                let h = Vec2::splat(0.5) / Vec2::from(u.previous_texture_res);
                let mut sum = tap(inputs, 0, uv + Vec2::new(-h.x * 2.0, 0.0));
                sum += tap(inputs, 0, uv + Vec2::new(-h.x, h.y)) * 2.0;
                sum += tap(inputs, 0, uv + Vec2::new(0.0, h.y * 2.0));
                sum += tap(inputs, 0, uv + Vec2::new(h.x, h.y)) * 2.0;
                sum += tap(inputs, 0, uv + Vec2::new(h.x * 2.0, 0.0));
                sum += tap(inputs, 0, uv + Vec2::new(h.x, -h.y)) * 2.0;
                sum += tap(inputs, 0, uv + Vec2::new(0.0, -h.y * 2.0));
                sum += tap(inputs, 0, uv + Vec2::new(-h.x, -h.y)) * 2.0;
                sum / 12.0
            }
            Uniforms::BloomComposite(u) => {
                let blur = tap(inputs, 0, uv);
                let base = tap(inputs, 1, uv);
                (base.xyz() + blur.xyz() * u.bloom_strength).extend(base.w)
            }
            Uniforms::UnrealComposite(u) => {
                let mut sum = Vec4::ZERO;
                for level in 0..(u.num_mips as usize).min(u.bloom_tint_colors.len()) {
                    let f = u.factor(level);
                    let weight = f + (1.2 - f - f) * u.bloom_radius;
                    let tint = Vec3::from_slice(&u.bloom_tint_colors[level][..3]).extend(1.0);
                    sum += weight * tint * tap(inputs, level, uv);
                }
                u.bloom_strength * sum
            }
            Uniforms::Sobel(u) => {
                let texel = Vec2::ONE / Vec2::from(u.resolution);
                let l = |dx: f32, dy: f32| luminance(tap(inputs, 0, uv + Vec2::new(dx, dy) * texel).xyz());
                let (tl, t, tr) = (l(-1.0, -1.0), l(0.0, -1.0), l(1.0, -1.0));
                let (ml, mr) = (l(-1.0, 0.0), l(1.0, 0.0));
                let (bl, b, br) = (l(-1.0, 1.0), l(0.0, 1.0), l(1.0, 1.0));
                let gx = -tl - 2.0 * ml - bl + tr + 2.0 * mr + br;
                let gy = -tl - 2.0 * t - tr + bl + 2.0 * b + br;
                Vec3::splat((gx * gx + gy * gy).sqrt()).extend(1.0)
            }
            Uniforms::Pixelate(u) => {
                let cell = Vec2::splat(u.pixel_size.max(1.0)) / Vec2::from(u.resolution);
                tap(inputs, 0, cell * ((uv / cell).floor() + Vec2::splat(0.5)))
            }
            Uniforms::ChromaticAberration(u) => {
                let to_uv = uv - Vec2::splat(0.5);
                let dist = to_uv.length();
                let direction = if dist > 0.0 { to_uv / dist } else { Vec2::ZERO };
                let rotated = Vec2::from_angle(u.angle).rotate(direction);
                let shift = rotated * u.offset * dist * 0.02;
                let r = tap(inputs, 0, uv + shift).x;
                let g = tap(inputs, 0, uv).y;
                let b = tap(inputs, 0, uv - shift).z;
                Vec4::new(r, g, b, 1.0)
            }
        }
    }
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Counters of everything the renderer was asked to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoftwareStats {
    pub scene_renders: u64,
    /// Scene renders that landed on the presentation target.
    pub presentation_scene_renders: u64,
    pub draws: u64,
    pub clears: u64,
    pub targets_created: u64,
    pub targets_resized: u64,
    pub targets_released: u64,
    pub programs_created: u64,
    pub programs_released: u64,
    /// Releases of ids that were already released or never existed.
    pub double_releases: u64,
}

// ── SoftwareRenderer ──────────────────────────────────────────────────────────

struct TargetSlot {
    desc: RenderTargetDesc,
    image: Image,
}

#[derive(Copy, Clone)]
struct ProgramSlot {
    kind: ProgramKind,
    blend: BlendMode,
}

pub struct SoftwareRenderer {
    canvas: Extent,
    xr_framebuffer: Extent,
    output: Image,
    targets: Vec<Option<TargetSlot>>,
    programs: Vec<Option<ProgramSlot>>,
    bound: Option<RenderTargetId>,
    viewport: Option<Viewport>,
    clear_color: Color,
    clear_alpha: f32,
    auto_clear: bool,
    xr: XrState,
    info: RenderInfo,
    stats: SoftwareStats,
    /// Draw index (counted from creation) that fails with a backend error.
    fail_draw_at: Option<u64>,
}

impl SoftwareRenderer {
    /// Renderer whose presentation target is a `width × height` canvas.
    pub fn new(width: u32, height: u32) -> Self {
        let canvas = Extent::new(width, height);
        Self {
            canvas,
            xr_framebuffer: canvas,
            output: Image::new(canvas, TextureFormat::Rgba8UnormSrgb),
            targets: Vec::new(),
            programs: Vec::new(),
            bound: None,
            viewport: None,
            clear_color: Color::BLACK,
            clear_alpha: 1.0,
            auto_clear: true,
            xr: XrState::default(),
            info: RenderInfo::default(),
            stats: SoftwareStats::default(),
            fail_draw_at: None,
        }
    }

    pub fn stats(&self) -> SoftwareStats {
        self.stats
    }

    pub fn info(&self) -> RenderInfo {
        self.info
    }

    /// Presentation target contents.
    pub fn output(&self) -> &Image {
        &self.output
    }

    pub fn target_image(&self, id: RenderTargetId) -> Result<&Image> {
        self.slot(id).map(|s| &s.image)
    }

    pub fn target_desc(&self, id: RenderTargetId) -> Result<&RenderTargetDesc> {
        self.slot(id).map(|s| &s.desc)
    }

    pub fn live_targets(&self) -> usize {
        self.targets.iter().flatten().count()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.iter().flatten().count()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Resize the canvas (the window, outside XR).
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas = Extent::new(width, height);
        self.sync_output();
    }

    /// Start presenting side-by-side stereo into a `framebuffer`-sized target.
    pub fn begin_xr_session(&mut self, framebuffer: Extent) {
        self.xr_framebuffer = framebuffer;
        self.xr = XrState {
            enabled: true,
            presenting: true,
            camera: XrCamera::Array(Viewport::stereo_pair(framebuffer).to_vec()),
        };
        self.sync_output();
    }

    pub fn end_xr_session(&mut self) {
        self.xr = XrState::default();
        self.sync_output();
    }

    /// Make the `n`-th draw from now fail with [`PostError::Backend`].
    pub fn fail_draw_after(&mut self, n: u64) {
        self.fail_draw_at = Some(self.stats.draws + n);
    }

    fn sync_output(&mut self) {
        let size = self.output_size();
        if self.output.extent() != size {
            self.output = Image::new(size, self.output.format());
        }
    }

    fn slot(&self, id: RenderTargetId) -> Result<&TargetSlot> {
        self.targets
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PostError::UnknownRenderTarget(id))
    }

    fn image(&self, target: Option<RenderTargetId>) -> Result<&Image> {
        match target {
            Some(id) => self.slot(id).map(|s| &s.image),
            None => Ok(&self.output),
        }
    }

    fn image_mut(&mut self, target: Option<RenderTargetId>) -> Result<&mut Image> {
        match target {
            Some(id) => self
                .targets
                .get_mut(id.0 as usize)
                .and_then(Option::as_mut)
                .map(|s| &mut s.image)
                .ok_or(PostError::UnknownRenderTarget(id)),
            None => Ok(&mut self.output),
        }
    }

    /// Pixel rectangle draws cover on the bound target.
    fn draw_bounds(&self, extent: Extent) -> (u32, u32, u32, u32) {
        self.viewport.unwrap_or(Viewport::full(extent)).pixel_bounds(extent)
    }
}

impl HostRenderer for SoftwareRenderer {
    type Scene = dyn SoftwareScene;
    type Camera = ();

    fn render_scene(&mut self, scene: &dyn SoftwareScene, _camera: &()) -> Result<()> {
        if self.auto_clear {
            self.clear()?;
        }
        let stereo = self.xr.enabled && self.xr.presenting && !self.xr.camera.viewports().is_empty();
        let extent = self.image(self.bound)?.extent();
        let views: Vec<(Option<usize>, Viewport)> = if stereo {
            self.xr.camera.viewports().iter().copied().enumerate().map(|(i, v)| (Some(i), v)).collect()
        } else {
            vec![(None, self.viewport.unwrap_or(Viewport::full(extent)))]
        };

        let image = self.image_mut(self.bound)?;
        for (eye, view) in views {
            let (x0, y0, x1, y1) = view.pixel_bounds(extent);
            let size = Vec2::new((x1 - x0).max(1) as f32, (y1 - y0).max(1) as f32);
            for y in y0..y1 {
                for x in x0..x1 {
                    let uv = (Vec2::new((x - x0) as f32, (y - y0) as f32) + Vec2::splat(0.5)) / size;
                    image.set(x, y, scene.shade(uv, eye));
                }
            }
        }

        self.info.frame += 1;
        self.stats.scene_renders += 1;
        if self.bound.is_none() {
            self.stats.presentation_scene_renders += 1;
        }
        log::trace!("scene render -> {:?} (stereo: {stereo})", self.bound);
        Ok(())
    }

    fn render_target(&self) -> Option<RenderTargetId> {
        self.bound
    }

    fn set_render_target(&mut self, target: Option<RenderTargetId>) -> Result<()> {
        if let Some(id) = target {
            self.slot(id)?;
        }
        self.bound = target;
        self.viewport = None;
        Ok(())
    }

    fn target_size(&self, target: Option<RenderTargetId>) -> Result<Extent> {
        self.image(target).map(Image::extent)
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn clear(&mut self) -> Result<()> {
        let color = Vec4::from_array(self.clear_color.with_alpha(self.clear_alpha));
        self.image_mut(self.bound)?.fill(color);
        self.stats.clears += 1;
        Ok(())
    }

    fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn clear_alpha(&self) -> f32 {
        self.clear_alpha
    }

    fn set_clear_color(&mut self, color: Color, alpha: f32) {
        self.clear_color = color;
        self.clear_alpha = alpha;
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    fn xr(&self) -> &XrState {
        &self.xr
    }

    fn xr_mut(&mut self) -> &mut XrState {
        &mut self.xr
    }

    fn output_size(&self) -> Extent {
        if self.xr.presenting { self.xr_framebuffer } else { self.canvas }
    }

    fn info_mut(&mut self) -> &mut RenderInfo {
        &mut self.info
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId> {
        let Extent { width, height } = desc.extent;
        if width == 0 || height == 0 {
            return Err(PostError::InvalidExtent { width, height });
        }
        let id = RenderTargetId(self.targets.len() as u32);
        let image = Image::new(desc.extent, desc.format);
        self.targets.push(Some(TargetSlot { desc: desc.clone(), image }));
        self.stats.targets_created += 1;
        Ok(id)
    }

    fn resize_render_target(&mut self, id: RenderTargetId, extent: Extent) -> Result<()> {
        if extent.width == 0 || extent.height == 0 {
            return Err(PostError::InvalidExtent { width: extent.width, height: extent.height });
        }
        let slot = self
            .targets
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PostError::UnknownRenderTarget(id))?;
        slot.desc.extent = extent;
        slot.image = Image::new(extent, slot.desc.format);
        self.stats.targets_resized += 1;
        Ok(())
    }

    fn release_render_target(&mut self, id: RenderTargetId) {
        match self.targets.get_mut(id.0 as usize).and_then(Option::take) {
            Some(_) => self.stats.targets_released += 1,
            None => {
                log::warn!("release of unknown render target {id:?}");
                self.stats.double_releases += 1;
            }
        }
        if self.bound == Some(id) {
            self.bound = None;
        }
    }

    fn create_program(&mut self, kind: ProgramKind, blend: BlendMode) -> Result<ProgramId> {
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(Some(ProgramSlot { kind, blend }));
        self.stats.programs_created += 1;
        Ok(id)
    }

    fn release_program(&mut self, id: ProgramId) {
        match self.programs.get_mut(id.0 as usize).and_then(Option::take) {
            Some(_) => self.stats.programs_released += 1,
            None => {
                log::warn!("release of unknown program {id:?}");
                self.stats.double_releases += 1;
            }
        }
    }

    fn draw_fullscreen(&mut self, program: &ShaderProgram) -> Result<()> {
        let slot = self
            .programs
            .get(program.id().0 as usize)
            .copied()
            .flatten()
            .ok_or(PostError::UnknownProgram(program.id()))?;
        debug_assert_eq!(slot.kind, program.kind());

        let draw = self.stats.draws;
        self.stats.draws += 1;
        self.info.draws += 1;
        if self.fail_draw_at == Some(draw) {
            self.fail_draw_at = None;
            return Err(PostError::Backend(format!("injected failure on draw {draw}")));
        }

        let extent = self.image(self.bound)?.extent();
        let (x0, y0, x1, y1) = self.draw_bounds(extent);
        let size = Vec2::new((x1 - x0).max(1) as f32, (y1 - y0).max(1) as f32);

        let inputs = program
            .inputs()
            .iter()
            .map(|input| {
                if input.is_some() && *input == self.bound {
                    return Err(PostError::Backend(format!("{:?} is both input and output", self.bound)));
                }
                input.map(|id| self.image(Some(id))).transpose()
            })
            .collect::<Result<Vec<Option<&Image>>>>()?;
        let mut shaded = Vec::with_capacity(((x1 - x0) * (y1 - y0)) as usize);
        for y in y0..y1 {
            for x in x0..x1 {
                let uv = (Vec2::new((x - x0) as f32, (y - y0) as f32) + Vec2::splat(0.5)) / size;
                shaded.push(kernels::shade(&program.uniforms, &inputs, uv));
            }
        }

        let bound = self.bound;
        let image = self.image_mut(bound)?;
        let mut colors = shaded.into_iter();
        for y in y0..y1 {
            for x in x0..x1 {
                let Some(src) = colors.next() else { break };
                let value = match slot.blend {
                    BlendMode::Replace => src,
                    BlendMode::Additive => image.get(x, y) + src,
                };
                image.set(x, y, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_sample_interpolates_between_texel_centres() {
        let mut img = Image::new(Extent::new(2, 1), TextureFormat::Rgba16Float);
        img.set(0, 0, Vec4::ZERO);
        img.set(1, 0, Vec4::ONE);
        assert_eq!(img.sample(Vec2::new(0.25, 0.5)), Vec4::ZERO);
        assert_eq!(img.sample(Vec2::new(0.75, 0.5)), Vec4::ONE);
        let mid = img.sample(Vec2::new(0.5, 0.5));
        assert!((mid.x - 0.5).abs() < 1e-6);
        // Clamp to edge outside the image.
        assert_eq!(img.sample(Vec2::new(-1.0, 0.5)), Vec4::ZERO);
    }

    #[test]
    fn eight_bit_targets_clamp_on_store() {
        let mut img = Image::new(Extent::new(1, 1), TextureFormat::Rgba8Unorm);
        img.set(0, 0, Vec4::splat(3.0));
        assert_eq!(img.get(0, 0), Vec4::ONE);
    }

    #[test]
    fn threshold_weight_passes_everything_at_zero() {
        assert_eq!(kernels::threshold_weight(0.0, glam::Vec3::ZERO), 1.0);
        assert_eq!(kernels::threshold_weight(0.8, glam::Vec3::splat(0.5)), 0.0);
        assert_eq!(kernels::threshold_weight(0.8, glam::Vec3::ONE), 1.0);
    }

    #[test]
    fn stereo_scene_render_shades_each_eye_separately() {
        let mut r = SoftwareRenderer::new(8, 4);
        r.begin_xr_session(Extent::new(8, 4));
        struct EyeScene;
        impl SoftwareScene for EyeScene {
            fn shade(&self, _uv: Vec2, eye: Option<usize>) -> Vec4 {
                if eye == Some(1) { Vec4::ONE } else { Vec4::new(0.0, 0.0, 0.0, 1.0) }
            }
        }
        r.render_scene(&EyeScene, &()).unwrap();
        assert_eq!(r.output().get(0, 0).x, 0.0);
        assert_eq!(r.output().get(7, 0).x, 1.0);
        assert_eq!(r.info().frame, 1);
    }

    #[test]
    fn released_ids_are_never_reused() {
        let mut r = SoftwareRenderer::new(4, 4);
        let desc = RenderTargetDesc::new("t", Extent::new(2, 2), TextureFormat::Rgba16Float);
        let a = r.create_render_target(&desc).unwrap();
        r.release_render_target(a);
        let b = r.create_render_target(&desc).unwrap();
        assert_ne!(a, b);
        assert!(matches!(r.set_render_target(Some(a)), Err(PostError::UnknownRenderTarget(_))));
        r.release_render_target(a);
        assert_eq!(r.stats().double_releases, 1);
    }
}
