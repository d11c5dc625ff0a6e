// ── WGSL sources ──────────────────────────────────────────────────────────────
//
// Every program shares `FULLSCREEN_VS` and binds its inputs in group 0:
// textures at bindings 0..n, the filtering sampler at `SAMPLER_BINDING`, the
// uniform block at `UNIFORM_BINDING`. The CPU backend mirrors these kernels in
// `backend::software::kernels`; keep the two in step.

use super::ProgramKind;

pub const SAMPLER_BINDING: u32 = 8;
pub const UNIFORM_BINDING: u32 = 9;

pub const FULLSCREEN_VS: &str = "
struct VertexOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VertexOut {
    var positions = array<vec2<f32>, 6>(
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
    );
    var uvs = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 1.0),
    );
    var out: VertexOut;
    out.pos = vec4<f32>(positions[vi], 0.0, 1.0);
    out.uv  = uvs[vi];
    return out;
}
";

const LUMINANCE_FN: &str = "
fn luminance(rgb: vec3<f32>) -> f32 {
    return dot(rgb, vec3<f32>(0.2126, 0.7152, 0.0722));
}
";

const DOWNSAMPLE_FS: &str = "
@group(0) @binding(0) var previous_texture: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms { previous_texture_res: vec2<f32>, luminosity_threshold: f32, _pad: f32 };
@group(0) @binding(9) var<uniform> u: Uniforms;

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let half_texel = 0.5 / u.previous_texture_res;
    var sum = textureSample(previous_texture, s_linear, in.uv) * 4.0;
    sum += textureSample(previous_texture, s_linear, in.uv - half_texel);
    sum += textureSample(previous_texture, s_linear, in.uv + half_texel);
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(half_texel.x, -half_texel.y));
    sum += textureSample(previous_texture, s_linear, in.uv - vec2<f32>(half_texel.x, -half_texel.y));
    let color = sum / 8.0;

    let t = u.luminosity_threshold;
    let weight = select(1.0, smoothstep(t, t + 0.01, luminance(color.rgb)), t > 0.0);
    return color * weight;
}
";

const UPSAMPLE_FS: &str = "
@group(0) @binding(0) var previous_texture: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms { previous_texture_res: vec2<f32>, _pad: vec2<f32> };
@group(0) @binding(9) var<uniform> u: Uniforms;

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let h = 0.5 / u.previous_texture_res;
    var sum = textureSample(previous_texture, s_linear, in.uv + vec2<f32>(-h.x * 2.0, 0.0));
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(-h.x, h.y)) * 2.0;
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(0.0, h.y * 2.0));
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(h.x, h.y)) * 2.0;
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(h.x * 2.0, 0.0));
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(h.x, -h.y)) * 2.0;
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(0.0, -h.y * 2.0));
    sum += textureSample(previous_texture, s_linear, in.uv + vec2<f32>(-h.x, -h.y)) * 2.0;
    return sum / 12.0;
}
";

const BLOOM_COMPOSITE_FS: &str = "
@group(0) @binding(0) var blur_texture: texture_2d<f32>;
@group(0) @binding(1) var base_texture: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms { bloom_strength: f32, _pad0: f32, _pad1: f32, _pad2: f32 };
@group(0) @binding(9) var<uniform> u: Uniforms;

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let base = textureSample(base_texture, s_linear, in.uv);
    let blur = textureSample(blur_texture, s_linear, in.uv);
    return vec4<f32>(base.rgb + blur.rgb * u.bloom_strength, base.a);
}
";

const UNREAL_COMPOSITE_FS: &str = "
@group(0) @binding(0) var blur_texture_1: texture_2d<f32>;
@group(0) @binding(1) var blur_texture_2: texture_2d<f32>;
@group(0) @binding(2) var blur_texture_3: texture_2d<f32>;
@group(0) @binding(3) var blur_texture_4: texture_2d<f32>;
@group(0) @binding(4) var blur_texture_5: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms {
    bloom_factors: vec4<f32>,
    bloom_factor_4: f32,
    bloom_strength: f32,
    bloom_radius: f32,
    num_mips: u32,
    bloom_tint_colors: array<vec4<f32>, 5>,
};
@group(0) @binding(9) var<uniform> u: Uniforms;

fn lerp_bloom_factor(factor: f32) -> f32 {
    return mix(factor, 1.2 - factor, u.bloom_radius);
}

fn level(i: u32, factor: f32, texel: vec4<f32>) -> vec4<f32> {
    let w = select(0.0, lerp_bloom_factor(factor), i < u.num_mips);
    return w * vec4<f32>(u.bloom_tint_colors[i].rgb, 1.0) * texel;
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    var sum = level(0u, u.bloom_factors.x, textureSample(blur_texture_1, s_linear, in.uv));
    sum += level(1u, u.bloom_factors.y, textureSample(blur_texture_2, s_linear, in.uv));
    sum += level(2u, u.bloom_factors.z, textureSample(blur_texture_3, s_linear, in.uv));
    sum += level(3u, u.bloom_factors.w, textureSample(blur_texture_4, s_linear, in.uv));
    sum += level(4u, u.bloom_factor_4, textureSample(blur_texture_5, s_linear, in.uv));
    return u.bloom_strength * sum;
}
";

const SOBEL_FS: &str = "
@group(0) @binding(0) var read_buffer: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms { resolution: vec2<f32>, _pad: vec2<f32> };
@group(0) @binding(9) var<uniform> u: Uniforms;

fn tap(uv: vec2<f32>, dx: f32, dy: f32) -> f32 {
    let texel = 1.0 / u.resolution;
    return luminance(textureSample(read_buffer, s_linear, uv + vec2<f32>(dx, dy) * texel).rgb);
}

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let tl = tap(in.uv, -1.0, -1.0);
    let t  = tap(in.uv,  0.0, -1.0);
    let tr = tap(in.uv,  1.0, -1.0);
    let l  = tap(in.uv, -1.0,  0.0);
    let r  = tap(in.uv,  1.0,  0.0);
    let bl = tap(in.uv, -1.0,  1.0);
    let b  = tap(in.uv,  0.0,  1.0);
    let br = tap(in.uv,  1.0,  1.0);
    let gx = -tl - 2.0 * l - bl + tr + 2.0 * r + br;
    let gy = -tl - 2.0 * t - tr + bl + 2.0 * b + br;
    let g = sqrt(gx * gx + gy * gy);
    return vec4<f32>(vec3<f32>(g), 1.0);
}
";

const PIXELATE_FS: &str = "
@group(0) @binding(0) var read_buffer: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms { resolution: vec2<f32>, pixel_size: f32, _pad: f32 };
@group(0) @binding(9) var<uniform> u: Uniforms;

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let cell = max(u.pixel_size, 1.0) / u.resolution;
    let uv = cell * (floor(in.uv / cell) + 0.5);
    return textureSample(read_buffer, s_linear, uv);
}
";

const CHROMATIC_ABERRATION_FS: &str = "
@group(0) @binding(0) var read_buffer: texture_2d<f32>;
@group(0) @binding(8) var s_linear: sampler;
struct Uniforms { resolution: vec2<f32>, offset: f32, angle: f32 };
@group(0) @binding(9) var<uniform> u: Uniforms;

@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    let center = vec2<f32>(0.5, 0.5);
    let to_uv = in.uv - center;
    let dist = length(to_uv);
    var direction = vec2<f32>(0.0, 0.0);
    if (dist > 0.0) {
        direction = to_uv / dist;
    }
    let c = cos(u.angle);
    let s = sin(u.angle);
    let rotated = vec2<f32>(direction.x * c - direction.y * s, direction.x * s + direction.y * c);
    let shift = rotated * u.offset * dist * 0.02;
    let r = textureSample(read_buffer, s_linear, in.uv + shift).r;
    let g = textureSample(read_buffer, s_linear, in.uv).g;
    let b = textureSample(read_buffer, s_linear, in.uv - shift).b;
    return vec4<f32>(r, g, b, 1.0);
}
";

/// Complete WGSL module (vertex + fragment) for `kind`.
pub fn program_source(kind: ProgramKind) -> String {
    let fragment = match kind {
        ProgramKind::DualFilterDownsample => DOWNSAMPLE_FS,
        ProgramKind::DualFilterUpsample => UPSAMPLE_FS,
        ProgramKind::BloomComposite => BLOOM_COMPOSITE_FS,
        ProgramKind::UnrealBloomComposite => UNREAL_COMPOSITE_FS,
        ProgramKind::Sobel => SOBEL_FS,
        ProgramKind::Pixelate => PIXELATE_FS,
        ProgramKind::ChromaticAberration => CHROMATIC_ABERRATION_FS,
    };
    format!("{FULLSCREEN_VS}{LUMINANCE_FN}{fragment}")
}
