//! Rendering surface shared by the pipeline stages.
//!
//! *The rest of the engine never owns a pixel buffer.*
//! The software backend fills an internal [`Frame`] of tone cells and
//! **loans** it to the caller's sink once per frame; the sink converts
//! tones to RGB through a [`Palette`](crate::world::texture::Palette)
//! only at the very edge.

use crate::world::texture::{Palette, TONE_MIN, Tone};

pub mod software;

/// Number of rows at the top of every frame reserved for post-process
/// overlay content (diagnostic text, breach banners). The world renderer
/// still draws there; overlays simply stamp on top.
pub const OVERLAY_ROWS: usize = 8;

/// Fixed-size 2D buffer of tone cells, row-major.
///
/// Exclusively owned by the render pipeline and overwritten wholesale
/// each frame; no partial state survives between frames.
pub struct Frame {
    w: usize,
    h: usize,
    cells: Vec<Tone>,
}

impl Frame {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            cells: vec![TONE_MIN; w * h],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Tone {
        self.cells[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tone: Tone) {
        self.cells[y * self.w + x] = tone;
    }

    pub fn fill(&mut self, tone: Tone) {
        self.cells.fill(tone);
    }

    #[inline]
    pub fn cells(&self) -> &[Tone] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Tone] {
        &mut self.cells
    }

    /// Convert the whole frame into `out` as packed 0x00RRGGBB.
    /// `out.len()` must equal `width * height`.
    pub fn blit(&self, palette: &Palette, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.cells.len());
        for (dst, &tone) in out.iter_mut().zip(&self.cells) {
            *dst = palette.rgb(tone);
        }
    }
}

/// Load-time renderer configuration, fixed for the renderer's lifetime.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Rays and sprites beyond this perpendicular distance are dropped.
    pub render_distance: f32,
    /// Grid units per one ramp step of distance fog.
    pub fog_step: f32,
    /// Texture names resolved against the set at construction for the
    /// floor/ceiling planes ("FLOOR"/"CEIL" in the builtin set).
    pub floor_tex: crate::world::texture::TextureId,
    pub ceil_tex: crate::world::texture::TextureId,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            render_distance: 32.0,
            fog_step: 4.0,
            floor_tex: 0,
            ceil_tex: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::texture::ACCENT;

    #[test]
    fn frame_roundtrips_cells() {
        let mut f = Frame::new(4, 3);
        assert_eq!(f.get(3, 2), TONE_MIN);
        f.set(1, 1, 9);
        assert_eq!(f.get(1, 1), 9);
        f.fill(2);
        assert!(f.cells().iter().all(|&t| t == 2));
    }

    #[test]
    fn blit_maps_accent_through_palette() {
        let mut f = Frame::new(2, 1);
        f.set(0, 0, ACCENT);
        let pal = Palette::default();
        let mut out = vec![0u32; 2];
        f.blit(&pal, &mut out);
        assert_eq!(out[0], pal.accent);
        assert_eq!(out[1], pal.shades[0]);
    }
}
