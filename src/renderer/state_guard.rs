//! Renderer state guard.
//!
//! Multi-pass effects rebind targets, disable XR projection and change the
//! clear state of a renderer they share with the rest of the application.
//! [`RendererStateGuard`] snapshots that state on entry and writes it back
//! when dropped, so every exit path restores it: early `?` returns, errors
//! from the backend and unwinding panics alike.
//!
//! The guard holds the renderer's only mutable borrow for its lifetime, so
//! two effects can never interleave their state changes.

use std::ops::{Deref, DerefMut};

use super::{Color, HostRenderer, RenderTargetId, Viewport};
use crate::error::Result;

/// The five guarded fields of the host renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererSnapshot {
    pub render_target: Option<RenderTargetId>,
    pub clear_color: Color,
    pub clear_alpha: f32,
    pub auto_clear: bool,
    pub xr_enabled: bool,
}

impl RendererSnapshot {
    pub fn capture<R: HostRenderer + ?Sized>(renderer: &R) -> Self {
        Self {
            render_target: renderer.render_target(),
            clear_color: renderer.clear_color(),
            clear_alpha: renderer.clear_alpha(),
            auto_clear: renderer.auto_clear(),
            xr_enabled: renderer.xr().enabled,
        }
    }

    /// Write every field back. Infallible: an unknown target is logged and the
    /// presentation target bound instead.
    pub fn apply<R: HostRenderer + ?Sized>(&self, renderer: &mut R) {
        if let Err(err) = renderer.set_render_target(self.render_target) {
            log::warn!("could not rebind {:?} on restore: {err}", self.render_target);
            if let Err(err) = renderer.set_render_target(None) {
                log::error!("could not bind the presentation target on restore: {err}");
            }
        }
        self.apply_flags(renderer);
    }

    /// Write back everything except the render target binding.
    pub fn apply_flags<R: HostRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_clear_color(self.clear_color, self.clear_alpha);
        renderer.set_auto_clear(self.auto_clear);
        renderer.xr_mut().enabled = self.xr_enabled;
    }
}

/// Scoped ownership of the host renderer's global state.
///
/// Dereferences to the wrapped renderer. The snapshot taken by
/// [`RendererStateGuard::enter`] is applied back on drop.
pub struct RendererStateGuard<'a, R: HostRenderer + ?Sized> {
    renderer: &'a mut R,
    snapshot: RendererSnapshot,
}

impl<'a, R: HostRenderer + ?Sized> RendererStateGuard<'a, R> {
    /// Capture the current state. Nothing is changed yet, so the effect can
    /// still render the scene with the caller's XR setup.
    pub fn enter(renderer: &'a mut R) -> Self {
        let snapshot = RendererSnapshot::capture(&*renderer);
        Self { renderer, snapshot }
    }

    /// Switch to the isolated pass state: XR projection off, auto-clear off,
    /// transparent black clear color.
    pub fn isolate(&mut self) {
        self.renderer.xr_mut().enabled = false;
        self.renderer.set_auto_clear(false);
        self.renderer.set_clear_color(Color::BLACK, 0.0);
    }

    pub fn snapshot(&self) -> &RendererSnapshot {
        &self.snapshot
    }

    /// Target that was bound on entry (where the final composite goes).
    pub fn presentation_target(&self) -> Option<RenderTargetId> {
        self.snapshot.render_target
    }

    /// Run `f` with the caller's XR flag, auto-clear and clear color back in
    /// place, then isolate again. Used for a scene render onto the
    /// presentation target that must look exactly like the host's own.
    pub fn with_caller_state<T>(&mut self, f: impl FnOnce(&mut R) -> Result<T>) -> Result<T> {
        self.snapshot.apply_flags(&mut *self.renderer);
        let result = f(&mut *self.renderer);
        self.isolate();
        result
    }

    /// Bind the presentation target and, while an XR session presents,
    /// reset the viewport to the full target.
    pub fn bind_presentation(&mut self) -> Result<()> {
        let target = self.snapshot.render_target;
        self.renderer.set_render_target(target)?;
        if self.renderer.xr().presenting {
            let size = self.renderer.target_size(target)?;
            self.renderer.set_viewport(Viewport::full(size));
        }
        Ok(())
    }

    /// Restore now. Equivalent to dropping the guard.
    pub fn exit(self) {}
}

impl<R: HostRenderer + ?Sized> Deref for RendererStateGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &*self.renderer
    }
}

impl<R: HostRenderer + ?Sized> DerefMut for RendererStateGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut *self.renderer
    }
}

impl<R: HostRenderer + ?Sized> Drop for RendererStateGuard<'_, R> {
    fn drop(&mut self) {
        self.snapshot.apply(&mut *self.renderer);
    }
}

/// Per-eye viewports saved by [`with_scaled_xr_viewports`], written back on drop.
struct SavedViewports<'a, R: HostRenderer + ?Sized> {
    renderer: &'a mut R,
    saved: Vec<Viewport>,
}

impl<R: HostRenderer + ?Sized> Drop for SavedViewports<'_, R> {
    fn drop(&mut self) {
        for (vp, original) in self.renderer.xr_mut().camera.viewports_mut().iter_mut().zip(&self.saved) {
            *vp = *original;
        }
    }
}

/// Run `f` with every per-eye viewport of a presenting XR camera multiplied by
/// `factor`, then put the original viewports back on every exit path.
///
/// Does nothing extra for mono cameras, when no session presents, or when
/// `factor` is 1.
pub fn with_scaled_xr_viewports<R, T>(
    renderer: &mut R,
    factor: f32,
    f: impl FnOnce(&mut R) -> Result<T>,
) -> Result<T>
where
    R: HostRenderer + ?Sized,
{
    let scale = renderer.xr().presenting && factor != 1.0 && !renderer.xr().camera.viewports().is_empty();
    if !scale {
        return f(renderer);
    }

    let saved: Vec<Viewport> = renderer.xr().camera.viewports().to_vec();
    for vp in renderer.xr_mut().camera.viewports_mut() {
        *vp = vp.scaled(factor);
    }
    let mut restore = SavedViewports { renderer, saved };
    f(&mut *restore.renderer)
}
