// Needs a GPU adapter; every test returns early when none is available.

use xr_postfx::backend::{FullscreenShaderScene, GpuRenderer};
use xr_postfx::config::{BlurConfig, PixelateConfig};
use xr_postfx::{Effect, EffectComposer, EffectConfig, Extent, FrameOutcome};

const ORANGE: &str = "
@fragment
fn fs_main(in: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.0, 1.0);
}
";

fn renderer(width: u32, height: u32) -> Option<GpuRenderer> {
    match GpuRenderer::new_headless(width, height) {
        Ok(r) => Some(r),
        Err(err) => {
            eprintln!("skipping gpu test: {err}");
            None
        }
    }
}

#[test]
fn blur_of_flat_scene_stays_flat() {
    let Some(mut r) = renderer(64, 64) else { return };
    let scene = FullscreenShaderScene::new(ORANGE);
    let mut composer = EffectComposer::default();
    let effect = Effect::from_config(&mut r, &EffectConfig::Blur(BlurConfig::default())).unwrap();
    composer.register_effect(&mut r, effect).unwrap();

    assert_eq!(composer.render(&mut r, &scene, &()).unwrap(), FrameOutcome::Handled);
    let image = r.read_target(None).unwrap();
    assert_eq!(image.dimensions(), (64, 64));
    let px = image.get_pixel(32, 32).0;
    assert!(px[0] > 240, "red {px:?}");
    assert!(px[2] < 16, "blue {px:?}");
}

#[test]
fn single_pass_effect_renders_and_resizes() {
    let Some(mut r) = renderer(32, 32) else { return };
    let scene = FullscreenShaderScene::new(ORANGE);
    let mut composer = EffectComposer::default();
    let cfg = EffectConfig::Pixelate(PixelateConfig { pixel_size: 4.0, resolution: Extent::new(32, 32) });
    let effect = Effect::from_config(&mut r, &cfg).unwrap();
    composer.register_effect(&mut r, effect).unwrap();
    assert_eq!(composer.render(&mut r, &scene, &()).unwrap(), FrameOutcome::Handled);

    r.set_output_size(48, 24);
    composer.resize(&mut r).unwrap();
    assert_eq!(composer.size(), Some(Extent::new(48, 24)));
    assert_eq!(composer.render(&mut r, &scene, &()).unwrap(), FrameOutcome::Handled);
    assert_eq!(r.read_target(None).unwrap().dimensions(), (48, 24));

    composer.dispose_all(&mut r);
}
