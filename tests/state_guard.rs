use glam::{Vec2, Vec4};
use xr_postfx::backend::{SoftwareRenderer, SoftwareScene, SolidScene};
use xr_postfx::config::{BloomConfig, BlurConfig, ChromaticAberrationConfig, UnrealBloomConfig};
use xr_postfx::effects::{BloomEffect, BlurEffect, SinglePassEffect, UnrealBloomEffect};
use xr_postfx::renderer::{
    Color, HostRenderer, RenderTargetDesc, RendererSnapshot, RendererStateGuard, TextureFormat, with_scaled_xr_viewports,
};
use xr_postfx::{Extent, PostError, PostProcessEffect, Viewport};

const SCENE: SolidScene = SolidScene(Vec4::new(0.5, 0.5, 0.5, 1.0));

/// Left eye black, right eye white.
struct EyeScene;

impl SoftwareScene for EyeScene {
    fn shade(&self, _uv: Vec2, eye: Option<usize>) -> Vec4 {
        if eye == Some(1) { Vec4::ONE } else { Vec4::new(0.0, 0.0, 0.0, 1.0) }
    }
}

/// A renderer with every guarded field away from its isolated value.
fn customised(width: u32, height: u32) -> SoftwareRenderer {
    let mut r = SoftwareRenderer::new(width, height);
    r.set_clear_color(Color([0.1, 0.2, 0.3]), 0.5);
    r.set_auto_clear(false);
    r.xr_mut().enabled = true;
    r
}

// ── Guard ────────────────────────────────────────────────────────────────────

#[test]
fn guard_restores_state_on_drop() {
    let mut r = customised(8, 8);
    let before = RendererSnapshot::capture(&r);
    let target = r
        .create_render_target(&RenderTargetDesc::new("scratch", Extent::new(4, 4), TextureFormat::Rgba16Float))
        .unwrap();
    {
        let mut guard = RendererStateGuard::enter(&mut r);
        guard.isolate();
        guard.set_render_target(Some(target)).unwrap();
        assert!(!guard.xr().enabled);
        assert!(!guard.auto_clear());
        assert_eq!(guard.clear_alpha(), 0.0);
    }
    assert_eq!(RendererSnapshot::capture(&r), before);
}

#[test]
fn restoring_a_released_target_binds_the_presentation_target() {
    let mut r = customised(8, 8);
    let target = r
        .create_render_target(&RenderTargetDesc::new("gone", Extent::new(4, 4), TextureFormat::Rgba16Float))
        .unwrap();
    r.set_render_target(Some(target)).unwrap();
    let snapshot = RendererSnapshot::capture(&r);
    r.release_render_target(target);

    snapshot.apply(&mut r);
    assert_eq!(r.render_target(), None);
    assert!(!r.auto_clear());
    assert_eq!(r.clear_alpha(), 0.5);
}

#[test]
fn caller_state_is_visible_inside_scope_only() {
    let mut r = customised(8, 8);
    let mut guard = RendererStateGuard::enter(&mut r);
    guard.isolate();
    let seen = guard.with_caller_state(|r| Ok((r.xr().enabled, r.auto_clear(), r.clear_alpha()))).unwrap();
    assert_eq!(seen, (true, false, 0.5));
    assert!(!guard.xr().enabled);
    assert_eq!(guard.clear_color(), Color::BLACK);
}

#[test]
fn guard_restores_state_after_effect_error() {
    let mut r = customised(32, 32);
    let bound = r
        .create_render_target(&RenderTargetDesc::new("host", Extent::new(32, 32), TextureFormat::Rgba8Unorm))
        .unwrap();
    r.set_render_target(Some(bound)).unwrap();
    let before = RendererSnapshot::capture(&r);

    let mut bloom = BloomEffect::new(&mut r, &BloomConfig::default()).unwrap();
    r.fail_draw_after(1);
    let err = bloom.render(&mut r, &SCENE, &()).unwrap_err();
    assert!(matches!(err, PostError::Backend(_)));
    assert_eq!(RendererSnapshot::capture(&r), before);
}

#[test]
fn every_effect_leaves_state_untouched() {
    let mut r = customised(32, 32);
    let before = RendererSnapshot::capture(&r);

    let mut blur = BlurEffect::new(&mut r, &BlurConfig::default()).unwrap();
    blur.render(&mut r, &SCENE, &()).unwrap();
    assert_eq!(RendererSnapshot::capture(&r), before);

    let mut unreal = UnrealBloomEffect::new(&mut r, &UnrealBloomConfig::default()).unwrap();
    unreal.render(&mut r, &SCENE, &()).unwrap();
    assert_eq!(RendererSnapshot::capture(&r), before);

    let mut aberration =
        SinglePassEffect::chromatic_aberration(&mut r, &ChromaticAberrationConfig::default()).unwrap();
    aberration.render(&mut r, &SCENE, &()).unwrap();
    assert_eq!(RendererSnapshot::capture(&r), before);
}

#[test]
fn effect_draws_into_the_target_bound_by_the_caller() {
    let mut r = SoftwareRenderer::new(16, 16);
    let host = r
        .create_render_target(&RenderTargetDesc::new("host", Extent::new(16, 16), TextureFormat::Rgba16Float))
        .unwrap();
    r.set_render_target(Some(host)).unwrap();

    let mut blur = BlurEffect::new(&mut r, &BlurConfig { steps: 3, resolution: Extent::new(16, 16) }).unwrap();
    blur.render(&mut r, &SCENE, &()).unwrap();
    assert!((r.target_image(host).unwrap().get(8, 8).x - 0.5).abs() < 1e-4);
    assert_eq!(r.output().get(8, 8), Vec4::ZERO);
}

// ── XR viewports ─────────────────────────────────────────────────────────────

#[test]
fn scaled_viewports_are_restored_on_error() {
    let mut r = SoftwareRenderer::new(64, 32);
    r.begin_xr_session(Extent::new(64, 32));
    let original = r.xr().camera.viewports().to_vec();

    let result: xr_postfx::Result<()> = with_scaled_xr_viewports(&mut r, 0.5, |r| {
        assert_eq!(r.xr().camera.viewports()[1], Viewport::new(16.0, 0.0, 16.0, 16.0));
        Err(PostError::Backend("boom".into()))
    });
    assert!(result.is_err());
    assert_eq!(r.xr().camera.viewports(), original.as_slice());
}

#[test]
fn scaled_viewports_are_restored_when_the_render_panics() {
    let mut r = SoftwareRenderer::new(64, 32);
    r.begin_xr_session(Extent::new(64, 32));
    let original = r.xr().camera.viewports().to_vec();

    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _: xr_postfx::Result<()> = with_scaled_xr_viewports(&mut r, 0.5, |_| panic!("scene render blew up"));
    }));
    assert!(unwound.is_err());
    assert_eq!(r.xr().camera.viewports(), original.as_slice());
}

#[test]
fn half_resolution_base_covers_both_eyes() {
    let mut r = SoftwareRenderer::new(64, 32);
    r.begin_xr_session(Extent::new(128, 64));
    let cfg = UnrealBloomConfig { threshold: 2.0, resolution: Extent::new(128, 64), ..Default::default() };
    let mut unreal = UnrealBloomEffect::new(&mut r, &cfg).unwrap();
    unreal.render(&mut r, &EyeScene, &()).unwrap();

    // Base level is 64x32; each eye fills half of it.
    let base = r.target_image(unreal.pyramid().downsample_targets().level(0)).unwrap();
    assert_eq!(base.extent(), Extent::new(64, 32));
    assert_eq!(base.get(0, 16).x, 0.0);
    assert_eq!(base.get(63, 16).x, 1.0);

    // Viewports are back to full size and the final image is stereo again.
    assert_eq!(r.xr().camera.viewports(), Viewport::stereo_pair(Extent::new(128, 64)).as_slice());
    assert!(r.xr().enabled);
    assert_eq!(r.output().get(0, 32).x, 0.0);
    assert_eq!(r.output().get(127, 32).x, 1.0);
}
