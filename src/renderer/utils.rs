// ── Extent / viewport math ────────────────────────────────────────────────────
//
// Pixel sizes of render targets and the per-level sizes of a mip-like chain.
// Every size handed to a backend passes through `Extent::new`, so a zero
// dimension never reaches the graphics layer.

use serde::{Deserialize, Serialize};

// ── Extent ────────────────────────────────────────────────────────────────────

/// Width × height of a render target in pixels. Both are always ≥ 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    /// Builds an extent, clamping both dimensions to a minimum of 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    /// Base resolution of a chain: `round(size * factor)`, clamped to ≥ 1.
    pub fn scaled(width: u32, height: u32, factor: f32) -> Self {
        let w = (width as f32 * factor).round() as u32;
        let h = (height as f32 * factor).round() as u32;
        Self::new(w, h)
    }

    /// The next (coarser) mip: `floor(dim / 2)`, clamped to ≥ 1.
    pub fn halved(self) -> Self {
        Self::new(self.width / 2, self.height / 2)
    }

    /// Size of mip `level` below `self`.
    pub fn mip(self, level: usize) -> Self {
        (0..level).fold(self, |e, _| e.halved())
    }

    pub fn as_vec2(self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

/// Per-level extents of a halving chain of `len` levels built on
/// `width × height` at `factor`.
pub fn mip_extents(width: u32, height: u32, factor: f32, len: usize) -> Vec<Extent> {
    let mut extents = Vec::with_capacity(len);
    let mut current = Extent::scaled(width, height, factor);
    for _ in 0..len {
        extents.push(current);
        current = current.halved();
    }
    extents
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in target pixels.
///
/// Use `x`, `y` as the top-left origin and `width`, `height` as the extent.
/// Stereo hosts keep one viewport per eye on the XR camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal offset from the left edge of the target in pixels.
    pub x: f32,
    /// Vertical offset from the top edge of the target in pixels.
    pub y: f32,
    /// Width of the rectangle in pixels.
    pub width: f32,
    /// Height of the rectangle in pixels.
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering the whole of `extent`.
    pub fn full(extent: Extent) -> Self {
        Self::new(0.0, 0.0, extent.width as f32, extent.height as f32)
    }

    /// Multiplies every component by `factor` (origin and size alike).
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }

    /// Side-by-side stereo layout: left eye on the left half, right eye on the right.
    pub fn stereo_pair(extent: Extent) -> [Self; 2] {
        let half = extent.width as f32 / 2.0;
        let h = extent.height as f32;
        [Self::new(0.0, 0.0, half, h), Self::new(half, 0.0, half, h)]
    }

    /// Integer pixel bounds `(x0, y0, x1, y1)` clipped to `extent`.
    pub fn pixel_bounds(&self, extent: Extent) -> (u32, u32, u32, u32) {
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
        (
            clip(self.x, extent.width),
            clip(self.y, extent.height),
            clip(self.x + self.width, extent.width),
            clip(self.y + self.height, extent.height),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_clamps_zero_to_one() {
        assert_eq!(Extent::new(0, 0), Extent { width: 1, height: 1 });
        assert_eq!(Extent::new(0, 7), Extent { width: 1, height: 7 });
    }

    #[test]
    fn halving_floors_and_never_reaches_zero() {
        let e = Extent::new(5, 3);
        assert_eq!(e.halved(), Extent::new(2, 1));
        assert_eq!(e.halved().halved(), Extent::new(1, 1));
        assert_eq!(e.mip(10), Extent::new(1, 1));
    }

    #[test]
    fn scaled_rounds_like_the_base_resolution() {
        assert_eq!(Extent::scaled(1024, 1024, 0.5), Extent::new(512, 512));
        // 3 * 0.5 = 1.5 rounds away from zero.
        assert_eq!(Extent::scaled(3, 3, 0.5), Extent::new(2, 2));
        assert_eq!(Extent::scaled(1, 1, 0.25), Extent::new(1, 1));
    }

    #[test]
    fn mip_extents_match_floor_division() {
        let ext = mip_extents(1000, 600, 1.0, 6);
        for (i, e) in ext.iter().enumerate() {
            assert_eq!(e.width, (1000 >> i).max(1));
            assert_eq!(e.height, (600 >> i).max(1));
        }
    }

    #[test]
    fn viewport_scaling_is_uniform() {
        let v = Viewport::new(100.0, 0.0, 100.0, 80.0).scaled(0.5);
        assert_eq!(v, Viewport::new(50.0, 0.0, 50.0, 40.0));
    }

    #[test]
    fn stereo_pair_splits_width() {
        let [l, r] = Viewport::stereo_pair(Extent::new(200, 100));
        assert_eq!(l, Viewport::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(r, Viewport::new(100.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn pixel_bounds_clip_to_target() {
        let v = Viewport::new(-4.0, 2.0, 20.0, 100.0);
        assert_eq!(v.pixel_bounds(Extent::new(10, 10)), (0, 2, 10, 10));
    }
}
