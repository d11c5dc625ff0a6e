use glam::{Vec2, Vec4};
use xr_postfx::backend::{SoftwareRenderer, SolidScene};
use xr_postfx::config::{BloomConfig, BlurConfig, EffectConfig, PixelateConfig, SobelConfig, UnrealBloomConfig};
use xr_postfx::effects::{BloomEffect, BlurEffect, SinglePassEffect, UnrealBloomEffect};
use xr_postfx::renderer::HostRenderer;
use xr_postfx::{Effect, Extent, PostError, PostProcessEffect};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn blur_config(steps: usize, size: u32) -> BlurConfig {
    BlurConfig { steps, resolution: Extent::new(size, size) }
}

/// Scene output of a plain host render, for comparison.
fn plain_render(width: u32, height: u32, scene: &(dyn xr_postfx::backend::SoftwareScene + 'static)) -> SoftwareRenderer {
    let mut r = SoftwareRenderer::new(width, height);
    r.render_scene(scene, &()).unwrap();
    r
}

fn bright_disc(uv: Vec2) -> Vec4 {
    if uv.distance(Vec2::splat(0.5)) < 0.1 { Vec4::new(4.0, 4.0, 4.0, 1.0) } else { Vec4::new(0.0, 0.0, 0.0, 1.0) }
}

const DIM: SolidScene = SolidScene(Vec4::new(0.2, 0.2, 0.2, 1.0));

// ── Pyramid layout ───────────────────────────────────────────────────────────

#[test]
fn bloom_chain_halves_each_level() {
    let mut r = SoftwareRenderer::new(1024, 1024);
    let cfg = BloomConfig { resolution: Extent::new(1024, 1024), ..Default::default() };
    let bloom = BloomEffect::new(&mut r, &cfg).unwrap();
    let widths: Vec<u32> = bloom.pyramid().downsample_targets().extents().iter().map(|e| e.width).collect();
    assert_eq!(widths, vec![1024, 512, 256, 128, 64]);
    assert_eq!(bloom.pyramid().upsample_targets().extents(), bloom.pyramid().downsample_targets().extents());
}

#[test]
fn unreal_bloom_works_at_half_resolution() {
    let mut r = SoftwareRenderer::new(1024, 1024);
    let cfg = UnrealBloomConfig { resolution: Extent::new(1024, 1024), ..Default::default() };
    let unreal = UnrealBloomEffect::new(&mut r, &cfg).unwrap();
    assert_eq!(unreal.pyramid().downsample_targets().extent(0), Extent::new(512, 512));
    assert_eq!(unreal.mips(), 7);
    assert_eq!(unreal.blur_targets().len(), 5);
    assert!(unreal.blur_targets().extents().iter().all(|e| *e == Extent::new(128, 128)));
}

#[test]
fn unreal_blur_chain_shrinks_when_few_mips_remain() {
    let mut r = SoftwareRenderer::new(256, 256);
    let cfg = UnrealBloomConfig { mips: 4, target_mip: 2, ..Default::default() };
    let unreal = UnrealBloomEffect::new(&mut r, &cfg).unwrap();
    assert_eq!(unreal.blur_targets().len(), 2);
}

#[test]
fn tiny_outputs_clamp_every_level_to_one_pixel() {
    let mut r = SoftwareRenderer::new(1, 1);
    let mut blur = BlurEffect::new(&mut r, &blur_config(5, 1)).unwrap();
    assert!(blur.pyramid().downsample_targets().extents().iter().all(|e| *e == Extent::new(1, 1)));
    blur.render(&mut r, &DIM, &()).unwrap();
    assert!((r.output().get(0, 0).x - 0.2).abs() < 1e-4);
}

#[test]
fn zero_sized_request_is_clamped() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut blur = BlurEffect::new(&mut r, &blur_config(3, 16)).unwrap();
    blur.set_size(&mut r, 0, 0).unwrap();
    assert_eq!(blur.pyramid().downsample_targets().extent(0), Extent::new(1, 1));
}

// ── set_size ─────────────────────────────────────────────────────────────────

#[test]
fn set_size_with_unchanged_size_touches_nothing() {
    let mut r = SoftwareRenderer::new(64, 64);
    let mut bloom = BloomEffect::new(&mut r, &BloomConfig::default()).unwrap();
    bloom.set_size(&mut r, 64, 64).unwrap();
    let resized = r.stats().targets_resized;
    assert!(resized > 0);

    bloom.set_size(&mut r, 64, 64).unwrap();
    assert_eq!(r.stats().targets_resized, resized);
    assert_eq!(r.stats().targets_created, 10);
}

#[test]
fn set_size_keeps_target_ids() {
    let mut r = SoftwareRenderer::new(64, 64);
    let mut unreal = UnrealBloomEffect::new(&mut r, &UnrealBloomConfig::default()).unwrap();
    let before = unreal.blur_targets().level(0);
    unreal.set_size(&mut r, 200, 100).unwrap();
    assert_eq!(unreal.blur_targets().level(0), before);
    assert_eq!(unreal.blur_targets().extent(0), Extent::new(25, 12));
    assert_eq!(r.target_desc(before).unwrap().extent, Extent::new(25, 12));
}

#[test]
fn single_pass_resize_updates_scene_buffer() {
    let mut r = SoftwareRenderer::new(64, 64);
    let mut sobel = SinglePassEffect::sobel(&mut r, &SobelConfig::default()).unwrap();
    sobel.set_size(&mut r, 64, 32).unwrap();
    assert_eq!(sobel.extent(), Extent::new(64, 32));
    let desc = r.target_desc(sobel.scene_target()).unwrap();
    assert_eq!(desc.extent, Extent::new(64, 32));
    assert_eq!(desc.samples, 4);
    assert!(desc.depth_buffer);
}

// ── Rendering ────────────────────────────────────────────────────────────────

#[test]
fn blur_of_flat_image_is_flat() {
    let mut r = SoftwareRenderer::new(32, 32);
    let mut blur = BlurEffect::new(&mut r, &blur_config(4, 32)).unwrap();
    blur.render(&mut r, &DIM, &()).unwrap();
    let plain = plain_render(32, 32, &DIM);
    assert!(r.output().max_difference(plain.output()).unwrap() < 1e-4);
}

#[test]
fn blur_renders_scene_once_offscreen() {
    let mut r = SoftwareRenderer::new(32, 32);
    let mut blur = BlurEffect::new(&mut r, &blur_config(5, 32)).unwrap();
    blur.render(&mut r, &DIM, &()).unwrap();
    let stats = r.stats();
    assert_eq!(stats.scene_renders, 1);
    assert_eq!(stats.presentation_scene_renders, 0);
    // 4 downsamples, 3 upsamples into the chain, 1 final upsample.
    assert_eq!(stats.draws, 8);
}

#[test]
fn bloom_below_threshold_leaves_the_image_unchanged() {
    let mut r = SoftwareRenderer::new(32, 32);
    let cfg = BloomConfig { threshold: 0.8, resolution: Extent::new(32, 32), ..Default::default() };
    let mut bloom = BloomEffect::new(&mut r, &cfg).unwrap();
    bloom.render(&mut r, &DIM, &()).unwrap();
    let plain = plain_render(32, 32, &DIM);
    assert!(r.output().max_difference(plain.output()).unwrap() < 1e-5);
}

#[test]
fn single_step_bloom_draws_only_the_base() {
    for scene in [&DIM as &dyn xr_postfx::backend::SoftwareScene, &bright_disc] {
        let mut r = SoftwareRenderer::new(32, 32);
        let cfg = BloomConfig { threshold: 0.8, steps: 1, resolution: Extent::new(32, 32), ..Default::default() };
        let mut bloom = BloomEffect::new(&mut r, &cfg).unwrap();
        bloom.render(&mut r, scene, &()).unwrap();
        let plain = plain_render(32, 32, scene);
        assert!(r.output().max_difference(plain.output()).unwrap() < 1e-5);
    }
}

#[test]
fn single_mip_unreal_bloom_adds_nothing() {
    let mut r = SoftwareRenderer::new(32, 32);
    let cfg = UnrealBloomConfig {
        threshold: 0.8,
        mips: 1,
        target_mip: 0,
        resolution: Extent::new(32, 32),
        ..Default::default()
    };
    let mut unreal = UnrealBloomEffect::new(&mut r, &cfg).unwrap();
    unreal.render(&mut r, &DIM, &()).unwrap();
    let plain = plain_render(32, 32, &DIM);
    assert!(r.output().max_difference(plain.output()).unwrap() < 1e-5);
}

#[test]
fn bloom_spreads_light_around_bright_areas() {
    let mut r = SoftwareRenderer::new(64, 64);
    let cfg = BloomConfig { resolution: Extent::new(64, 64), ..Default::default() };
    let mut bloom = BloomEffect::new(&mut r, &cfg).unwrap();
    bloom.render(&mut r, &bright_disc, &()).unwrap();
    let plain = plain_render(64, 64, &bright_disc);

    assert!(r.output().average().x > plain.output().average().x);
    // Just outside the disc: black in the plain render, lit by the halo.
    assert_eq!(plain.output().get(32, 24).x, 0.0);
    assert!(r.output().get(32, 24).x > 0.0);
}

#[test]
fn unreal_bloom_below_threshold_matches_plain_render() {
    let mut r = SoftwareRenderer::new(32, 32);
    let cfg = UnrealBloomConfig { threshold: 0.9, resolution: Extent::new(32, 32), ..Default::default() };
    let mut unreal = UnrealBloomEffect::new(&mut r, &cfg).unwrap();
    unreal.render(&mut r, &DIM, &()).unwrap();
    let plain = plain_render(32, 32, &DIM);
    assert!(r.output().max_difference(plain.output()).unwrap() < 1e-5);
    assert_eq!(r.stats().presentation_scene_renders, 1);
}

#[test]
fn unreal_bloom_adds_glow() {
    let mut r = SoftwareRenderer::new(64, 64);
    let cfg = UnrealBloomConfig { strength: 1.0, resolution: Extent::new(64, 64), ..Default::default() };
    let mut unreal = UnrealBloomEffect::new(&mut r, &cfg).unwrap();
    unreal.render(&mut r, &bright_disc, &()).unwrap();
    let plain = plain_render(64, 64, &bright_disc);
    assert!(r.output().average().x > plain.output().average().x);
}

#[test]
fn pixelate_of_flat_image_is_flat() {
    let mut r = SoftwareRenderer::new(32, 32);
    let cfg = PixelateConfig { pixel_size: 4.0, resolution: Extent::new(32, 32) };
    let mut pixelate = SinglePassEffect::pixelate(&mut r, &cfg).unwrap();
    pixelate.render(&mut r, &DIM, &()).unwrap();
    let plain = plain_render(32, 32, &DIM);
    assert!(r.output().max_difference(plain.output()).unwrap() < 1e-5);
}

#[test]
fn sobel_finds_no_edges_in_flat_image() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut sobel = SinglePassEffect::sobel(&mut r, &SobelConfig { resolution: Extent::new(16, 16) }).unwrap();
    sobel.render(&mut r, &DIM, &()).unwrap();
    assert!(r.output().get(8, 8).x < 1e-5);
    assert_eq!(r.output().get(8, 8).w, 1.0);
}

#[test]
fn sobel_highlights_a_vertical_edge() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut sobel = SinglePassEffect::sobel(&mut r, &SobelConfig { resolution: Extent::new(16, 16) }).unwrap();
    let split = |uv: Vec2| if uv.x < 0.5 { Vec4::new(0.0, 0.0, 0.0, 1.0) } else { Vec4::ONE };
    sobel.render(&mut r, &split, &()).unwrap();
    assert!(r.output().get(8, 8).x > 0.5);
    assert!(r.output().get(2, 8).x < 1e-5);
}

// ── Disposal ─────────────────────────────────────────────────────────────────

#[test]
fn dispose_releases_everything_exactly_once() {
    let mut r = SoftwareRenderer::new(64, 64);
    let configs = [
        EffectConfig::Blur(BlurConfig::default()),
        EffectConfig::Bloom(BloomConfig::default()),
        EffectConfig::UnrealBloom(UnrealBloomConfig::default()),
        EffectConfig::Pixelate(PixelateConfig::default()),
    ];
    for cfg in &configs {
        let mut effect = Effect::from_config(&mut r, cfg).unwrap();
        assert!(r.live_targets() > 0);
        effect.dispose(&mut r);
        assert!(effect.is_disposed());
        effect.dispose(&mut r);
        assert_eq!(r.live_targets(), 0, "{} leaked targets", cfg.effect_name());
        assert_eq!(r.live_programs(), 0, "{} leaked programs", cfg.effect_name());
    }
    assert_eq!(r.stats().double_releases, 0);
}

#[test]
fn disposed_effect_refuses_to_render_or_resize() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut bloom = BloomEffect::new(&mut r, &BloomConfig::default()).unwrap();
    bloom.dispose(&mut r);
    assert!(matches!(bloom.render(&mut r, &DIM, &()), Err(PostError::Disposed("bloom"))));
    assert!(matches!(bloom.set_size(&mut r, 8, 8), Err(PostError::Disposed(_))));

    let mut pixelate = SinglePassEffect::pixelate(&mut r, &PixelateConfig::default()).unwrap();
    pixelate.dispose(&mut r);
    assert!(matches!(pixelate.set_size(&mut r, 8, 8), Err(PostError::Disposed("pixelate"))));
}

// ── Configuration ────────────────────────────────────────────────────────────

#[test]
fn zero_steps_is_rejected() {
    let mut r = SoftwareRenderer::new(16, 16);
    assert!(matches!(BlurEffect::new(&mut r, &blur_config(0, 16)), Err(PostError::InvalidConfig(_))));
    assert_eq!(r.live_targets(), 0);
}

#[test]
fn target_mip_outside_pyramid_is_rejected() {
    let mut r = SoftwareRenderer::new(16, 16);
    let cfg = UnrealBloomConfig { mips: 3, target_mip: 3, ..Default::default() };
    assert!(matches!(UnrealBloomEffect::new(&mut r, &cfg), Err(PostError::InvalidConfig(_))));
    assert_eq!(r.live_targets(), 0);
    assert_eq!(r.live_programs(), 0);
}

#[test]
fn changing_step_count_in_place_is_rejected() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut effect = Effect::from_config(&mut r, &EffectConfig::Bloom(BloomConfig::default())).unwrap();
    let more_steps = EffectConfig::Bloom(BloomConfig { steps: 6, ..Default::default() });
    assert!(matches!(effect.apply_config(&more_steps), Err(PostError::InvalidConfig(_))));

    let stronger = EffectConfig::Bloom(BloomConfig { strength: 2.5, ..Default::default() });
    effect.apply_config(&stronger).unwrap();
    assert_eq!(effect.as_bloom_mut().unwrap().strength, 2.5);
}

#[test]
fn preset_of_another_kind_is_rejected() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut effect = Effect::from_config(&mut r, &EffectConfig::Sobel(SobelConfig::default())).unwrap();
    let err = effect.apply_config(&EffectConfig::Pixelate(PixelateConfig::default())).unwrap_err();
    assert!(matches!(err, PostError::InvalidConfig(_)));
}

#[test]
fn tint_level_out_of_range_is_rejected() {
    let mut r = SoftwareRenderer::new(16, 16);
    let mut unreal = UnrealBloomEffect::new(&mut r, &UnrealBloomConfig::default()).unwrap();
    unreal.set_tint_color(4, [1.0, 0.5, 0.0]).unwrap();
    assert_eq!(unreal.tint_colors()[4], [1.0, 0.5, 0.0]);
    assert!(unreal.set_tint_color(5, [1.0; 3]).is_err());
}
