// Headless demo: renders a procedural emissive scene through the effects on
// the CPU backend and writes one PNG per effect.
//
//   xr-postfx-demo [preset.json] [--stereo] [--out DIR]

use std::path::PathBuf;

use glam::{Vec2, Vec4};

use xr_postfx::backend::{SoftwareRenderer, SoftwareScene};
use xr_postfx::config::{
    BloomConfig, BlurConfig, ChromaticAberrationConfig, PixelateConfig, SobelConfig, UnrealBloomConfig,
};
use xr_postfx::{Effect, EffectComposer, EffectConfig, Extent, FrameOutcome, PostError, Result};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

// ── Scene ────────────────────────────────────────────────────────────────────

/// Dim backdrop with a few over-bright lamps.
struct LampScene;

impl SoftwareScene for LampScene {
    fn shade(&self, uv: Vec2, eye: Option<usize>) -> Vec4 {
        // Small horizontal parallax between the eyes.
        let shift = match eye {
            Some(0) => 0.01,
            Some(_) => -0.01,
            None => 0.0,
        };
        let p = uv + Vec2::new(shift, 0.0);
        let backdrop = Vec4::new(0.05 + 0.1 * p.y, 0.06, 0.12 - 0.05 * p.y, 1.0);
        let lamps = [
            (Vec2::new(0.3, 0.4), 0.06, Vec4::new(4.0, 2.5, 0.8, 0.0)),
            (Vec2::new(0.7, 0.35), 0.04, Vec4::new(0.6, 1.5, 4.0, 0.0)),
            (Vec2::new(0.55, 0.75), 0.08, Vec4::new(1.2, 3.0, 1.0, 0.0)),
        ];
        lamps.iter().fold(backdrop, |color, (centre, radius, emission)| {
            if p.distance(*centre) < *radius { color + *emission } else { color }
        })
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

struct Args {
    preset: Option<PathBuf>,
    stereo: bool,
    out_dir: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { preset: None, stereo: false, out_dir: PathBuf::from("out") };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stereo" => args.stereo = true,
            "--out" => {
                let dir = iter.next().ok_or_else(|| PostError::InvalidConfig("--out needs a directory".into()))?;
                args.out_dir = PathBuf::from(dir);
            }
            _ => args.preset = Some(PathBuf::from(arg)),
        }
    }
    Ok(args)
}

fn presets(args: &Args) -> Result<Vec<EffectConfig>> {
    if let Some(path) = &args.preset {
        return Ok(vec![EffectConfig::from_path(path)?]);
    }
    Ok(vec![
        EffectConfig::Blur(BlurConfig::default()),
        EffectConfig::Bloom(BloomConfig { threshold: 0.6, ..Default::default() }),
        EffectConfig::UnrealBloom(UnrealBloomConfig { strength: 0.8, ..Default::default() }),
        EffectConfig::Sobel(SobelConfig::default()),
        EffectConfig::Pixelate(PixelateConfig::default()),
        EffectConfig::ChromaticAberration(ChromaticAberrationConfig { offset: 3.0, ..Default::default() }),
    ])
}

fn renderer(stereo: bool) -> SoftwareRenderer {
    let mut renderer = SoftwareRenderer::new(WIDTH, HEIGHT);
    if stereo {
        renderer.begin_xr_session(Extent::new(WIDTH * 2, HEIGHT));
    }
    renderer
}

fn save(renderer: &SoftwareRenderer, out_dir: &std::path::Path, name: &str) -> Result<()> {
    let path = out_dir.join(format!("{name}.png"));
    renderer.output().to_rgba8().save(&path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn run() -> Result<()> {
    let args = parse_args()?;
    std::fs::create_dir_all(&args.out_dir)?;

    let mut plain = renderer(args.stereo);
    let mut composer = EffectComposer::default();
    composer.render(&mut plain, &LampScene, &())?;
    save(&plain, &args.out_dir, "original")?;

    for preset in presets(&args)? {
        let mut renderer = renderer(args.stereo);
        let mut composer = EffectComposer::default();
        let effect = Effect::from_config(&mut renderer, &preset)?;
        let id = composer.register_effect(&mut renderer, effect)?;

        let outcome = composer.render(&mut renderer, &LampScene, &())?;
        if outcome != FrameOutcome::Handled {
            log::warn!("{} fell back to the default render", preset.effect_name());
        }
        save(&renderer, &args.out_dir, preset.effect_name())?;
        composer.remove_effect(&mut renderer, id)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
