use xr_postfx::backend::SoftwareRenderer;
use xr_postfx::effects::{EffectFamily, SinglePassKind};
use xr_postfx::{Effect, EffectConfig, Extent, PostError, PostProcessEffect};

const PRESETS: &[(&str, &str)] = &[
    ("blur", r#"{ "type": "blur", "steps": 4 }"#),
    ("bloom", r#"{ "type": "bloom", "strength": 1.4, "threshold": 0.6 }"#),
    ("unreal_bloom", r#"{ "type": "unreal_bloom", "mips": 6, "target_mip": 1 }"#),
    ("sobel", r#"{ "type": "sobel" }"#),
    ("pixelate", r#"{ "type": "pixelate", "pixel_size": 4, "resolution": { "width": 64, "height": 32 } }"#),
    ("chromatic_aberration", r#"{ "type": "chromatic_aberration", "offset": 2.5, "angle": 0.3 }"#),
];

#[test]
fn every_preset_builds_its_effect() {
    let mut r = SoftwareRenderer::new(64, 64);
    for (name, json) in PRESETS {
        let cfg = EffectConfig::from_json(json).unwrap();
        assert_eq!(cfg.effect_name(), *name);
        let mut effect = Effect::from_config(&mut r, &cfg).unwrap();
        assert_eq!(effect.effect_name(), *name);
        effect.dispose(&mut r);
    }
    assert_eq!(r.live_targets(), 0);
}

#[test]
fn preset_values_reach_the_effect() {
    let mut r = SoftwareRenderer::new(64, 64);
    let cfg = EffectConfig::from_json(PRESETS[1].1).unwrap();
    let mut effect = Effect::from_config(&mut r, &cfg).unwrap();
    assert_eq!(effect.family(), EffectFamily::BlurPyramid);
    let bloom = effect.as_bloom_mut().unwrap();
    assert_eq!((bloom.strength, bloom.threshold, bloom.steps()), (1.4, 0.6, 5));

    let cfg = EffectConfig::from_json(PRESETS[2].1).unwrap();
    let mut effect = Effect::from_config(&mut r, &cfg).unwrap();
    let unreal = effect.as_unreal_bloom_mut().unwrap();
    assert_eq!((unreal.mips(), unreal.target_mip()), (6, 1));
    assert_eq!(unreal.blur_targets().len(), 5);
}

#[test]
fn single_pass_preset_uses_requested_resolution() {
    let mut r = SoftwareRenderer::new(64, 64);
    let cfg = EffectConfig::from_json(PRESETS[4].1).unwrap();
    let mut effect = Effect::from_config(&mut r, &cfg).unwrap();
    assert_eq!(effect.family(), EffectFamily::SinglePass);
    let pixelate = effect.as_single_pass_mut().unwrap();
    assert_eq!(pixelate.kind(), SinglePassKind::Pixelate);
    assert_eq!(pixelate.extent(), Extent::new(64, 32));
}

#[test]
fn invalid_layout_in_preset_fails_to_build() {
    let mut r = SoftwareRenderer::new(64, 64);
    let cfg = EffectConfig::from_json(r#"{ "type": "unreal_bloom", "mips": 2, "target_mip": 5 }"#).unwrap();
    assert!(matches!(Effect::from_config(&mut r, &cfg), Err(PostError::InvalidConfig(_))));
}

#[test]
fn malformed_json_is_a_config_error() {
    assert!(matches!(EffectConfig::from_json("{ \"type\": "), Err(PostError::Config(_))));
    assert!(matches!(
        EffectConfig::from_json(r#"{ "type": "blur", "steps": "many" }"#),
        Err(PostError::Config(_))
    ));
}

#[test]
fn preset_files_are_read_from_disk() {
    let path = std::env::temp_dir().join(format!("xr-postfx-preset-{}.json", std::process::id()));
    std::fs::write(&path, PRESETS[1].1).unwrap();
    let cfg = EffectConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(cfg.effect_name(), "bloom");

    let err = EffectConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, PostError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound), "{err}");
}
