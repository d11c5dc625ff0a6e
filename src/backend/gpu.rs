//! `wgpu` renderer.
//!
//! [`GpuRenderer`] implements [`HostRenderer`] on an offscreen presentation
//! texture. Every program kind compiles to one full-screen pipeline per
//! (kind, format, sample count, blend) and is cached. All programs share one
//! bind group layout: texture inputs at bindings 0..5, the linear sampler and
//! the uniform block at the bindings named in [`crate::renderer::shaders`].
//! Each pass is encoded and submitted on its own, which keeps uniform
//! uploads ordered with the draws that read them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::mpsc;

use wgpu::util::DeviceExt;

use crate::error::{PostError, Result};
use crate::renderer::program::MAX_PROGRAM_INPUTS;
use crate::renderer::shaders::{FULLSCREEN_VS, SAMPLER_BINDING, UNIFORM_BINDING, program_source};
use crate::renderer::{
    BlendMode, Color, Extent, HostRenderer, ProgramId, ProgramKind, RenderInfo, RenderTargetDesc, RenderTargetId,
    ShaderProgram, TextureFormat, Viewport, XrState,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn wgpu_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
    }
}

fn blend_state(blend: BlendMode) -> Option<wgpu::BlendState> {
    match blend {
        BlendMode::Replace => None,
        BlendMode::Additive => {
            let add = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            Some(wgpu::BlendState { color: add, alpha: add })
        }
    }
}

// ── Fullscreen Quad Helper ──────────────────────────────────────────────────

pub fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader_source: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    output_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    samples: u32,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}_layout", label)),
        bind_group_layouts,
        ..Default::default()
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: output_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState { count: samples, ..Default::default() },
        multiview_mask: None,
        cache: None,
    })
}

// ── Targets ───────────────────────────────────────────────────────────────────

struct GpuTarget {
    desc: RenderTargetDesc,
    /// Single-sampled color texture; the one programs sample from.
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    /// Multisampled attachment resolved into `color` after every pass.
    msaa_view: Option<wgpu::TextureView>,
    depth_view: Option<wgpu::TextureView>,
}

impl GpuTarget {
    fn new(device: &wgpu::Device, desc: &RenderTargetDesc) -> Self {
        let size = wgpu::Extent3d {
            width: desc.extent.width,
            height: desc.extent.height,
            depth_or_array_layers: 1,
        };
        let format = wgpu_format(desc.format);
        let texture = |label: &str, format, samples, usage| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: samples,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let color = texture(
            desc.label,
            format,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC,
        );
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let msaa_view = (desc.samples > 1).then(|| {
            texture("msaa", format, desc.samples, wgpu::TextureUsages::RENDER_ATTACHMENT)
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        let depth_view = desc.depth_buffer.then(|| {
            texture("depth", DEPTH_FORMAT, desc.samples, wgpu::TextureUsages::RENDER_ATTACHMENT)
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        Self { desc: desc.clone(), color, color_view, msaa_view, depth_view }
    }

    /// `(attachment, resolve target)` for a color pass.
    fn attachment(&self) -> (&wgpu::TextureView, Option<&wgpu::TextureView>) {
        match &self.msaa_view {
            Some(msaa) => (msaa, Some(&self.color_view)),
            None => (&self.color_view, None),
        }
    }
}

// ── Scenes ────────────────────────────────────────────────────────────────────

/// Everything a scene needs to draw into the bound target.
pub struct SceneFrame<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub resolve_target: Option<&'a wgpu::TextureView>,
    pub depth_view: Option<&'a wgpu::TextureView>,
    pub format: wgpu::TextureFormat,
    pub samples: u32,
    pub extent: Extent,
    /// One viewport per eye in stereo, otherwise the single active viewport.
    pub viewports: &'a [Viewport],
}

pub trait GpuScene {
    /// Encode the scene into `frame`. The target is already cleared when the
    /// renderer auto-clears; load its contents otherwise.
    fn render(&self, frame: &mut SceneFrame<'_>) -> Result<()>;
}

/// A scene drawn by one full-screen WGSL fragment `fs_main(in: VertexOut)`.
/// Pipelines are built lazily per target format and sample count.
pub struct FullscreenShaderScene {
    source: String,
    pipelines: RefCell<HashMap<(wgpu::TextureFormat, u32), wgpu::RenderPipeline>>,
}

impl FullscreenShaderScene {
    pub fn new(fragment_source: &str) -> Self {
        Self { source: format!("{FULLSCREEN_VS}{fragment_source}"), pipelines: RefCell::new(HashMap::new()) }
    }
}

impl GpuScene for FullscreenShaderScene {
    fn render(&self, frame: &mut SceneFrame<'_>) -> Result<()> {
        let mut pipelines = self.pipelines.borrow_mut();
        let pipeline = pipelines.entry((frame.format, frame.samples)).or_insert_with(|| {
            create_fullscreen_pipeline(frame.device, "scene", &self.source, &[], frame.format, None, frame.samples)
        });

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.color_view,
                resolve_target: frame.resolve_target,
                ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(pipeline);
        for vp in frame.viewports {
            pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
            pass.draw(0..6, 0..1);
        }
        Ok(())
    }
}

// ── GpuRenderer ───────────────────────────────────────────────────────────────

struct GpuProgram {
    kind: ProgramKind,
    blend: BlendMode,
    uniform_buffer: wgpu::Buffer,
}

type PipelineKey = (ProgramKind, wgpu::TextureFormat, u32, BlendMode);

pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Bound to program inputs that have no target.
    fallback_view: wgpu::TextureView,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    output: GpuTarget,
    targets: Vec<Option<GpuTarget>>,
    programs: Vec<Option<GpuProgram>>,
    bound: Option<RenderTargetId>,
    viewport: Option<Viewport>,
    clear_color: Color,
    clear_alpha: f32,
    auto_clear: bool,
    xr: XrState,
    info: RenderInfo,
}

impl GpuRenderer {
    /// Headless renderer presenting into a `width × height` sRGB texture.
    pub fn new_headless(width: u32, height: u32) -> Result<Self> {
        pollster::block_on(Self::new(width, height))
    }

    pub async fn new(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .map_err(|e| PostError::Backend(format!("no suitable GPU adapter found: {e}")))?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .map_err(|e| PostError::Backend(format!("failed to create device: {e}")))?;
        log::debug!("gpu backend on {:?}", adapter.get_info().name);
        Ok(Self::from_device(device, queue, Extent::new(width, height)))
    }

    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, size: Extent) -> Self {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let mut entries: Vec<wgpu::BindGroupLayoutEntry> =
            (0..MAX_PROGRAM_INPUTS as u32).map(texture_entry).collect();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_fx_bgl"),
            entries: &entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let fallback = RenderTargetDesc::new("fallback_input", Extent::new(1, 1), TextureFormat::Rgba8Unorm);
        let fallback_view = GpuTarget::new(&device, &fallback).color_view;
        let output_desc = RenderTargetDesc::new("presentation", size, TextureFormat::Rgba8UnormSrgb);
        let output = GpuTarget::new(&device, &output_desc);

        Self {
            device,
            queue,
            bind_group_layout,
            sampler,
            fallback_view,
            pipelines: HashMap::new(),
            output,
            targets: Vec::new(),
            programs: Vec::new(),
            bound: None,
            viewport: None,
            clear_color: Color::BLACK,
            clear_alpha: 1.0,
            auto_clear: true,
            xr: XrState::default(),
            info: RenderInfo::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn info(&self) -> RenderInfo {
        self.info
    }

    /// Resize the presentation texture.
    pub fn set_output_size(&mut self, width: u32, height: u32) {
        let extent = Extent::new(width, height);
        if extent != self.output.desc.extent {
            let desc = RenderTargetDesc::new("presentation", extent, TextureFormat::Rgba8UnormSrgb);
            self.output = GpuTarget::new(&self.device, &desc);
        }
    }

    fn target(&self, target: Option<RenderTargetId>) -> Result<&GpuTarget> {
        match target {
            Some(id) => self
                .targets
                .get(id.0 as usize)
                .and_then(Option::as_ref)
                .ok_or(PostError::UnknownRenderTarget(id)),
            None => Ok(&self.output),
        }
    }

    /// Copy an 8-bit target back to the CPU.
    pub fn read_target(&self, target: Option<RenderTargetId>) -> Result<image::RgbaImage> {
        let t = self.target(target)?;
        if t.desc.format == TextureFormat::Rgba16Float {
            return Err(PostError::Backend("read back is limited to 8-bit targets".into()));
        }
        let Extent { width, height } = t.desc.extent;
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: padded as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder =
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("readback_encoder") });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &t.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        receiver
            .recv()
            .map_err(|_| PostError::Backend("read back was never mapped".into()))?
            .map_err(|e| PostError::Backend(format!("read back failed: {e}")))?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        for row in data.chunks(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        buffer.unmap();
        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| PostError::Backend("read back size mismatch".into()))
    }

    fn submit_pass(&self, target: &GpuTarget, load: wgpu::LoadOp<wgpu::Color>, draw: impl FnOnce(&mut wgpu::RenderPass<'_>)) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("post_fx") });
        {
            let (view, resolve_target) = target.attachment();
            let depth_stencil_attachment =
                target.depth_view.as_ref().filter(|_| matches!(load, wgpu::LoadOp::Clear(_))).map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                        stencil_ops: None,
                    }
                });
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("post_fx_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            draw(&mut pass);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl HostRenderer for GpuRenderer {
    type Scene = dyn GpuScene;
    type Camera = ();

    fn render_scene(&mut self, scene: &dyn GpuScene, _camera: &()) -> Result<()> {
        if self.auto_clear {
            self.clear()?;
        }
        let target = self.target(self.bound)?;
        let extent = target.desc.extent;
        let stereo = self.xr.enabled && self.xr.presenting && !self.xr.camera.viewports().is_empty();
        let viewports: Vec<Viewport> = if stereo {
            self.xr.camera.viewports().to_vec()
        } else {
            vec![self.viewport.unwrap_or(Viewport::full(extent))]
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("scene") });
        let (color_view, resolve_target) = target.attachment();
        let mut frame = SceneFrame {
            device: &self.device,
            queue: &self.queue,
            encoder: &mut encoder,
            color_view,
            resolve_target,
            depth_view: target.depth_view.as_ref(),
            format: wgpu_format(target.desc.format),
            samples: target.desc.samples,
            extent,
            viewports: &viewports,
        };
        scene.render(&mut frame)?;
        self.queue.submit(std::iter::once(encoder.finish()));
        self.info.frame += 1;
        Ok(())
    }

    fn render_target(&self) -> Option<RenderTargetId> {
        self.bound
    }

    fn set_render_target(&mut self, target: Option<RenderTargetId>) -> Result<()> {
        self.target(target)?;
        self.bound = target;
        self.viewport = None;
        Ok(())
    }

    fn target_size(&self, target: Option<RenderTargetId>) -> Result<Extent> {
        self.target(target).map(|t| t.desc.extent)
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn clear(&mut self) -> Result<()> {
        let [r, g, b, a] = self.clear_color.with_alpha(self.clear_alpha);
        let color = wgpu::Color { r: r as f64, g: g as f64, b: b as f64, a: a as f64 };
        let target = self.target(self.bound)?;
        self.submit_pass(target, wgpu::LoadOp::Clear(color), |_| {});
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
        self.output.desc.extent
    }

    fn info_mut(&mut self) -> &mut RenderInfo {
        &mut self.info
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId> {
        let Extent { width, height } = desc.extent;
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(PostError::InvalidExtent { width, height });
        }
        let id = RenderTargetId(self.targets.len() as u32);
        self.targets.push(Some(GpuTarget::new(&self.device, desc)));
        Ok(id)
    }

    fn resize_render_target(&mut self, id: RenderTargetId, extent: Extent) -> Result<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if extent.width == 0 || extent.height == 0 || extent.width > max || extent.height > max {
            return Err(PostError::InvalidExtent { width: extent.width, height: extent.height });
        }
        let slot = self
            .targets
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PostError::UnknownRenderTarget(id))?;
        let mut desc = slot.desc.clone();
        desc.extent = extent;
        *slot = GpuTarget::new(&self.device, &desc);
        Ok(())
    }

    fn release_render_target(&mut self, id: RenderTargetId) {
        if self.targets.get_mut(id.0 as usize).and_then(Option::take).is_none() {
            log::warn!("release of unknown render target {id:?}");
        }
        if self.bound == Some(id) {
            self.bound = None;
        }
    }

    fn create_program(&mut self, kind: ProgramKind, blend: BlendMode) -> Result<ProgramId> {
        let uniforms = crate::renderer::Uniforms::for_kind(kind);
        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(kind.label()),
            contents: uniforms.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(Some(GpuProgram { kind, blend, uniform_buffer }));
        Ok(id)
    }

    fn release_program(&mut self, id: ProgramId) {
        if self.programs.get_mut(id.0 as usize).and_then(Option::take).is_none() {
            log::warn!("release of unknown program {id:?}");
        }
    }

    fn draw_fullscreen(&mut self, program: &ShaderProgram) -> Result<()> {
        let slot = self
            .programs
            .get(program.id().0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PostError::UnknownProgram(program.id()))?;
        let (kind, blend) = (slot.kind, slot.blend);
        let target = self.target(self.bound)?;
        let key = (kind, wgpu_format(target.desc.format), target.desc.samples, blend);

        if !self.pipelines.contains_key(&key) {
            let pipeline = create_fullscreen_pipeline(
                &self.device,
                kind.label(),
                &program_source(kind),
                &[&self.bind_group_layout],
                key.1,
                blend_state(blend),
                key.2,
            );
            log::debug!("compiled {} pipeline for {:?} x{}", kind.label(), key.1, key.2);
            self.pipelines.insert(key, pipeline);
        }

        let slot = self
            .programs
            .get(program.id().0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PostError::UnknownProgram(program.id()))?;
        self.queue.write_buffer(&slot.uniform_buffer, 0, program.uniforms.as_bytes());

        let mut views = Vec::with_capacity(MAX_PROGRAM_INPUTS);
        for slot_index in 0..MAX_PROGRAM_INPUTS {
            match program.input(slot_index) {
                Some(id) if Some(id) == self.bound => {
                    return Err(PostError::Backend(format!("{id:?} is both input and output")));
                }
                Some(id) => views.push(&self.target(Some(id))?.color_view),
                None => views.push(&self.fallback_view),
            }
        }
        let mut entries: Vec<wgpu::BindGroupEntry> = views
            .into_iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry { binding: i as u32, resource: wgpu::BindingResource::TextureView(view) })
            .collect();
        entries.push(wgpu::BindGroupEntry { binding: SAMPLER_BINDING, resource: wgpu::BindingResource::Sampler(&self.sampler) });
        entries.push(wgpu::BindGroupEntry { binding: UNIFORM_BINDING, resource: slot.uniform_buffer.as_entire_binding() });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(kind.label()),
            layout: &self.bind_group_layout,
            entries: &entries,
        });

        let target = self.target(self.bound)?;
        let pipeline = self.pipelines.get(&key).ok_or(PostError::UnknownProgram(program.id()))?;
        let viewport = self.viewport;
        self.submit_pass(target, wgpu::LoadOp::Load, |pass| {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            if let Some(vp) = viewport {
                pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
            }
            pass.draw(0..6, 0..1);
        });
        self.info.draws += 1;
        log::trace!("{} draw -> {:?}", kind.label(), self.bound);
        Ok(())
    }
}
