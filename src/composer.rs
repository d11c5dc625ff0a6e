//! Effect composer.
//!
//! Holds the registry of active effects and decides, once per frame, whether
//! the host renders normally or hands the frame to an effect. Only one effect
//! chain runs per frame: the earliest registered one. Resize and XR session
//! events are forwarded to every registered effect.

use crate::config::ComposerConfig;
use crate::effects::{Effect, PostProcessEffect};
use crate::error::{PostError, Result};
use crate::renderer::{Extent, HostRenderer, XrSessionEvent};

/// Handle of a registered effect. Never reused within one composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

/// What the frame hook did with the frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing to do: the host performs its default render.
    Default,
    /// An effect rendered the frame; the host must skip its default render.
    Handled,
    /// The effect failed. The host should render the frame normally.
    Fallback,
}

impl FrameOutcome {
    /// Whether the host still has to render the scene itself.
    pub fn needs_default_render(self) -> bool {
        !matches!(self, Self::Handled)
    }
}

pub struct EffectComposer {
    config: ComposerConfig,
    /// Insertion-ordered; the first entry drives the frame.
    effects: Vec<(EffectId, Effect)>,
    next_id: u64,
    /// Size last pushed to the effects.
    size: Option<Extent>,
}

impl Default for EffectComposer {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl EffectComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config, effects: Vec::new(), next_id: 0, size: None }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.effects.iter().map(|(id, _)| *id)
    }

    /// Effect that renders the next frame.
    pub fn active(&self) -> Option<EffectId> {
        self.effects.first().map(|(id, _)| *id)
    }

    /// Presentation size last pushed to the effects.
    pub fn size(&self) -> Option<Extent> {
        self.size
    }

    pub fn effect(&self, id: EffectId) -> Result<&Effect> {
        self.effects
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, e)| e)
            .ok_or(PostError::NotRegistered(id))
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Result<&mut Effect> {
        self.effects
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, e)| e)
            .ok_or(PostError::NotRegistered(id))
    }

    // ── Registry ──────────────────────────────────────────────────────────

    /// Add `effect` and immediately size it to the renderer's current output.
    ///
    /// On failure the effect is disposed, since nothing else owns it any more.
    pub fn register_effect<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, mut effect: Effect) -> Result<EffectId> {
        if self.config.exclusive
            && let Some(active) = self.active()
        {
            effect.dispose(renderer);
            return Err(PostError::EffectAlreadyActive(active));
        }

        let size = renderer.output_size();
        if let Err(err) = effect.set_size(renderer, size.width, size.height) {
            effect.dispose(renderer);
            return Err(err);
        }

        let id = EffectId(self.next_id);
        self.next_id += 1;
        log::debug!("registered {} effect as {:?} at {}x{}", effect.effect_name(), id, size.width, size.height);
        self.effects.push((id, effect));
        self.size = Some(size);
        if self.effects.len() > 1 {
            log::warn!(
                "{} effects registered; only {:?} renders each frame",
                self.effects.len(),
                self.active()
            );
        }
        Ok(id)
    }

    /// Remove an effect without disposing it. `None` when absent.
    pub fn unregister_effect(&mut self, id: EffectId) -> Option<Effect> {
        let index = self.effects.iter().position(|(i, _)| *i == id)?;
        let (_, effect) = self.effects.remove(index);
        log::debug!("unregistered {} effect {:?}", effect.effect_name(), id);
        Some(effect)
    }

    /// Remove and dispose an effect.
    pub fn remove_effect<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, id: EffectId) -> Result<()> {
        let mut effect = self.unregister_effect(id).ok_or(PostError::NotRegistered(id))?;
        effect.dispose(renderer);
        Ok(())
    }

    /// Remove and dispose every effect.
    pub fn dispose_all<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for (_, mut effect) in self.effects.drain(..) {
            effect.dispose(renderer);
        }
    }

    // ── Frame hook ────────────────────────────────────────────────────────

    /// Per-frame hook. Renders the frame through the active effect, or tells
    /// the host to render it normally.
    pub fn render_frame<R: HostRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scene: &R::Scene,
        camera: &R::Camera,
    ) -> FrameOutcome {
        if !self.config.enabled {
            return FrameOutcome::Default;
        }
        let Some((id, effect)) = self.effects.first_mut() else {
            return FrameOutcome::Default;
        };

        renderer.set_auto_clear(true);
        match effect.render(renderer, scene, camera) {
            Ok(()) => FrameOutcome::Handled,
            Err(err) => {
                log::error!("{} effect {:?} failed, falling back to default render: {err}", effect.effect_name(), id);
                FrameOutcome::Fallback
            }
        }
    }

    /// Run the frame hook and, when it did not handle the frame, the host's
    /// default render.
    pub fn render<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, scene: &R::Scene, camera: &R::Camera) -> Result<FrameOutcome> {
        let outcome = self.render_frame(renderer, scene, camera);
        if outcome.needs_default_render() {
            renderer.render_scene(scene, camera)?;
        }
        Ok(outcome)
    }

    // ── Resize / XR session ───────────────────────────────────────────────

    /// Push the renderer's current output size to every effect. Effects that
    /// already have that size skip the reallocation themselves, so effects
    /// registered at different sizes all end up matching the output.
    pub fn resize<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) -> Result<()> {
        let size = renderer.output_size();
        for (_, effect) in &mut self.effects {
            effect.set_size(renderer, size.width, size.height)?;
        }
        log::debug!("composer resized {} effects to {}x{}", self.effects.len(), size.width, size.height);
        self.size = Some(size);
        Ok(())
    }

    /// XR sessions change the output size (framebuffer vs canvas); resync.
    pub fn on_xr_session<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R, event: XrSessionEvent) -> Result<()> {
        log::debug!("xr session event {event:?}");
        self.resize(renderer)
    }
}
