// ── RenderTargetChain ─────────────────────────────────────────────────────────
//
// A fixed-length run of offscreen targets owned by one effect. The length is
// set at construction; afterwards only the dimensions change, and they change
// in place through `HostRenderer::resize_render_target`.

use super::utils::mip_extents;
use super::{Extent, HostRenderer, RenderTargetDesc, RenderTargetId, TextureFormat};
use crate::error::{PostError, Result};

/// How level sizes derive from the base resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainShape {
    /// Level `i` is the base halved `i` times (floor, clamped to 1).
    Halving,
    /// Every level has the size of mip `mip` of the base.
    Fixed { mip: usize },
}

/// Construction parameters of a chain.
#[derive(Clone, Debug)]
pub struct ChainDesc {
    pub label: &'static str,
    pub len: usize,
    pub shape: ChainShape,
    /// Scale applied to the requested size before the first level.
    pub resolution_factor: f32,
    pub format: TextureFormat,
    /// Give level 0 a depth buffer (it receives the scene render).
    pub depth_on_base: bool,
}

impl ChainDesc {
    /// Level sizes for a requested `width × height`.
    pub fn extents(&self, width: u32, height: u32) -> Vec<Extent> {
        match self.shape {
            ChainShape::Halving => mip_extents(width, height, self.resolution_factor, self.len),
            ChainShape::Fixed { mip } => {
                let e = Extent::scaled(width, height, self.resolution_factor).mip(mip);
                vec![e; self.len]
            }
        }
    }
}

#[derive(Debug)]
pub struct RenderTargetChain {
    desc: ChainDesc,
    targets: Vec<RenderTargetId>,
    extents: Vec<Extent>,
    released: bool,
}

impl RenderTargetChain {
    /// Allocate every level for a requested `width × height`.
    ///
    /// If an allocation fails, the levels created so far are released before
    /// the error is returned.
    pub fn new<R: HostRenderer + ?Sized>(
        renderer: &mut R,
        desc: ChainDesc,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        if !(desc.resolution_factor > 0.0 && desc.resolution_factor.is_finite()) {
            return Err(PostError::InvalidConfig(format!(
                "{}: resolution factor must be positive, got {}",
                desc.label, desc.resolution_factor
            )));
        }

        let extents = desc.extents(width, height);
        let mut targets = Vec::with_capacity(desc.len);
        for (i, extent) in extents.iter().enumerate() {
            let target_desc = RenderTargetDesc::new(desc.label, *extent, desc.format)
                .with_depth(desc.depth_on_base && i == 0);
            match renderer.create_render_target(&target_desc) {
                Ok(id) => targets.push(id),
                Err(err) => {
                    for id in targets {
                        renderer.release_render_target(id);
                    }
                    return Err(err);
                }
            }
        }
        log::debug!("{}: allocated {} levels, base {:?}", desc.label, targets.len(), extents.first());

        Ok(Self { desc, targets, extents, released: false })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn level(&self, i: usize) -> RenderTargetId {
        self.targets[i]
    }

    pub fn get(&self, i: usize) -> Option<RenderTargetId> {
        self.targets.get(i).copied()
    }

    pub fn extent(&self, i: usize) -> Extent {
        self.extents[i]
    }

    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    pub fn resolution_factor(&self) -> f32 {
        self.desc.resolution_factor
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Resize every level for a requested `width × height`.
    ///
    /// Returns `false` without touching the renderer when no level changes.
    pub fn set_size<R: HostRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        width: u32,
        height: u32,
    ) -> Result<bool> {
        if self.released {
            return Err(PostError::Disposed(self.desc.label));
        }
        let extents = self.desc.extents(width, height);
        if extents == self.extents {
            return Ok(false);
        }
        for (i, extent) in extents.iter().enumerate() {
            if self.extents[i] != *extent {
                renderer.resize_render_target(self.targets[i], *extent)?;
                self.extents[i] = *extent;
            }
        }
        log::debug!("{}: resized to base {:?}", self.desc.label, self.extents.first());
        Ok(true)
    }

    /// Release every level. A second call is a no-op and returns `false`.
    pub fn release<R: HostRenderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        if self.released {
            return false;
        }
        for id in &self.targets {
            renderer.release_render_target(*id);
        }
        self.released = true;
        true
    }
}
