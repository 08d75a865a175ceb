//! Frame-buffer transforms for the effect catalog.
//!
//! Every transform works on the already-rendered frame only; world data
//! is never touched. Transforms take their randomness from a position
//! hash, not an RNG, so a frame is fully determined by the event state.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::renderer::{Frame, OVERLAY_ROWS};
use crate::world::texture::{ACCENT, SHADE_LEVELS, Tone, brighten, darken};

/// Per-application context handed to every transform.
pub struct FxCtx<'a> {
    /// Z-buffer of the frame being corrupted (depth blur input).
    pub zbuf: &'a [f32],
    /// Event strength in `[0, 1]`.
    pub strength: f32,
}

pub type Transform = fn(&mut Frame, &FxCtx);

/// Columns whose nearest wall is beyond this depth count as "far" for the
/// defocus proxy.
const FAR_DEPTH: f32 = 8.0;

/// Tones at or above this add brightness to their neighbourhood.
const BLOOM_THRESHOLD: Tone = 12;

/// Tones at or above this count as "solid" for ambient occlusion.
const SOLID_THRESHOLD: Tone = 10;

/*──────────────────────── individual transforms ─────────────────────*/

/// Cheap defocus: far columns blend toward the darkest shade.
pub fn depth_blur(frame: &mut Frame, ctx: &FxCtx) {
    let steps = 1 + (ctx.strength * 2.0) as u8;
    let w = frame.width().min(ctx.zbuf.len());
    for x in 0..w {
        if ctx.zbuf[x] <= FAR_DEPTH {
            continue;
        }
        for y in 0..frame.height() {
            let t = frame.get(x, y);
            frame.set(x, y, darken(t, steps));
        }
    }
}

/// Bright cells push a fixed extra brightness into their 4-neighbourhood,
/// clamped at the palette maximum.
pub fn bloom(frame: &mut Frame, ctx: &FxCtx) {
    let _ = ctx;
    let (w, h) = (frame.width(), frame.height());
    let snapshot: Vec<Tone> = frame.cells().to_vec();
    let bright =
        |x: usize, y: usize| snapshot[y * w + x] != ACCENT && snapshot[y * w + x] >= BLOOM_THRESHOLD;
    for y in 0..h {
        for x in 0..w {
            if !bright(x, y) {
                continue;
            }
            for (nx, ny) in neighbours(x, y, w, h) {
                let t = frame.get(nx, ny);
                frame.set(nx, ny, brighten(t, 1));
            }
        }
    }
}

/// Cells boxed in by ≥3 solid neighbours darken one step.
pub fn ambient_occlusion(frame: &mut Frame, ctx: &FxCtx) {
    let _ = ctx;
    let (w, h) = (frame.width(), frame.height());
    let snapshot: Vec<Tone> = frame.cells().to_vec();
    let solid = |x: usize, y: usize| {
        let t = snapshot[y * w + x];
        t == ACCENT || t >= SOLID_THRESHOLD
    };
    for y in 0..h {
        for x in 0..w {
            let n = neighbours(x, y, w, h)
                .into_iter()
                .filter(|&(nx, ny)| solid(nx, ny))
                .count();
            if n >= 3 {
                let t = frame.get(x, y);
                frame.set(x, y, darken(t, 1));
            }
        }
    }
}

/// A strength-sized patch of "too detailed" hash noise stamped over the
/// frame, as if a higher-fidelity texture bled through.
pub fn texture_leak(frame: &mut Frame, ctx: &FxCtx) {
    let (w, h) = (frame.width(), frame.height());
    if w < 2 || h < 2 {
        return; // no room for a patch
    }
    let salt = (ctx.strength * 255.0) as u32;
    let pw = ((w as f32 * 0.25 * (0.5 + ctx.strength)) as usize).clamp(2, w);
    let ph = ((h as f32 * 0.25 * (0.5 + ctx.strength)) as usize).clamp(2, h);
    let px = (hash2(salt, 1) as usize) % (w - pw + 1);
    let py = (hash2(salt, 2) as usize) % (h - ph + 1);
    for y in py..py + ph {
        for x in px..px + pw {
            let t = (hash2(x as u32 ^ salt, y as u32) as usize % SHADE_LEVELS) as Tone;
            frame.set(x, y, t);
        }
    }
}

/// Every Nth column and row forced to the accent tone, regardless of the
/// content underneath.
pub fn wireframe(frame: &mut Frame, ctx: &FxCtx) {
    let n = (2.0 + (1.0 - ctx.strength) * 6.0) as usize;
    let n = n.max(2);
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            if x % n == 0 || y % n == 0 {
                frame.set(x, y, ACCENT);
            }
        }
    }
}

/// Fixed diagnostic line in the reserved overlay region.
pub fn debug_text(frame: &mut Frame, ctx: &FxCtx) {
    let _ = ctx;
    draw_text(frame, 1, 1, "FRAME TRACE LIVE");
}

bitflags! {
    /// Sub-effects composited by a reality breach.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BreachParts: u8 {
        const WIREFRAME = 0x01;
        const BLOOM     = 0x02;
        const LEAK      = 0x04;
        const BANNER    = 0x08;
    }
}

/// Parts a breach always applies, in this order.
pub const BREACH_COMPOSITE: BreachParts = BreachParts::all();

/// Rare high-strength composite: several transforms plus a fixed banner
/// in the reserved region.
pub fn reality_breach(frame: &mut Frame, ctx: &FxCtx) {
    let parts = BREACH_COMPOSITE;
    if parts.contains(BreachParts::WIREFRAME) {
        wireframe(frame, ctx);
    }
    if parts.contains(BreachParts::BLOOM) {
        bloom(frame, ctx);
    }
    if parts.contains(BreachParts::LEAK) {
        texture_leak(frame, ctx);
    }
    if parts.contains(BreachParts::BANNER) {
        draw_text(frame, 1, 1, "REALITY BREACH");
    }
}

/*──────────────────────────── helpers ───────────────────────────────*/

#[inline]
fn neighbours(x: usize, y: usize, w: usize, h: usize) -> SmallVec<[(usize, usize); 4]> {
    let mut out = SmallVec::new();
    if x > 0 {
        out.push((x - 1, y));
    }
    if x + 1 < w {
        out.push((x + 1, y));
    }
    if y > 0 {
        out.push((x, y - 1));
    }
    if y + 1 < h {
        out.push((x, y + 1));
    }
    out
}

/// Small integer mix; good enough for visual noise, cheap, deterministic.
#[inline]
fn hash2(a: u32, b: u32) -> u32 {
    let mut v = a.wrapping_mul(0x9E37_79B9) ^ b.wrapping_mul(0x85EB_CA6B);
    v ^= v >> 16;
    v = v.wrapping_mul(0xC2B2_AE35);
    v ^ (v >> 13)
}

/// 3×5 bitmap glyphs for the overlay strings; one byte per row, low 3
/// bits used, MSB-first.
static GLYPHS: Lazy<HashMap<char, [u8; 5]>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert('A', [0b010, 0b101, 0b111, 0b101, 0b101]);
    m.insert('B', [0b110, 0b101, 0b110, 0b101, 0b110]);
    m.insert('C', [0b011, 0b100, 0b100, 0b100, 0b011]);
    m.insert('E', [0b111, 0b100, 0b110, 0b100, 0b111]);
    m.insert('F', [0b111, 0b100, 0b110, 0b100, 0b100]);
    m.insert('H', [0b101, 0b101, 0b111, 0b101, 0b101]);
    m.insert('I', [0b111, 0b010, 0b010, 0b010, 0b111]);
    m.insert('L', [0b100, 0b100, 0b100, 0b100, 0b111]);
    m.insert('M', [0b101, 0b111, 0b111, 0b101, 0b101]);
    m.insert('R', [0b110, 0b101, 0b110, 0b101, 0b101]);
    m.insert('T', [0b111, 0b010, 0b010, 0b010, 0b010]);
    m.insert('V', [0b101, 0b101, 0b101, 0b101, 0b010]);
    m.insert('Y', [0b101, 0b101, 0b010, 0b010, 0b010]);
    m.insert(' ', [0, 0, 0, 0, 0]);
    m
});

/// Stamp `text` in accent tone at cell (x, y); clipped to the overlay
/// region so banners never trample the playfield. Unknown characters
/// render as blanks.
fn draw_text(frame: &mut Frame, x: usize, y: usize, text: &str) {
    let max_y = OVERLAY_ROWS.min(frame.height());
    let mut cx = x;
    for ch in text.chars() {
        let glyph = GLYPHS.get(&ch).copied().unwrap_or([0; 5]);
        for (gy, row) in glyph.iter().enumerate() {
            let py = y + gy;
            if py >= max_y {
                continue;
            }
            for gx in 0..3 {
                if row & (0b100 >> gx) == 0 {
                    continue;
                }
                let px = cx + gx;
                if px < frame.width() {
                    frame.set(px, py, ACCENT);
                }
            }
        }
        cx += 4;
        if cx >= frame.width() {
            break;
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
