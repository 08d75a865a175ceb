// Tone palette, shade ramps and the texture bank.
// The renderer and grid logic interact through `TextureId` only.

use std::collections::HashMap;

/// One cell of the rendered frame: an index into the global shade table
/// (0 = darkest … `SHADE_LEVELS - 1` = brightest), or [`ACCENT`].
pub type Tone = u8;

/// Number of ordered shades in a [`Palette`].
pub const SHADE_LEVELS: usize = 16;

/// Sentinel tone outside the ordered shade range, reserved for overlay
/// content (wireframe lines, diagnostic text). Never darkened/brightened.
pub const ACCENT: Tone = 0xFF;

/// Darkest ordered tone.
pub const TONE_MIN: Tone = 0;
/// Brightest ordered tone.
pub const TONE_MAX: Tone = (SHADE_LEVELS - 1) as Tone;

/// Step a tone down, saturating at the darkest shade. Accent cells are
/// untouchable and pass through unchanged.
#[inline]
pub fn darken(tone: Tone, steps: u8) -> Tone {
    if tone == ACCENT {
        return tone;
    }
    tone.saturating_sub(steps)
}

/// Step a tone up, saturating at the brightest shade.
#[inline]
pub fn brighten(tone: Tone, steps: u8) -> Tone {
    if tone == ACCENT {
        return tone;
    }
    tone.saturating_add(steps).min(TONE_MAX)
}

/// Ordered shade table mapping a [`Tone`] to packed 0x00RRGGBB for the
/// output sink, plus the accent colour.
pub struct Palette {
    pub shades: [u32; SHADE_LEVELS],
    pub accent: u32,
}

impl Default for Palette {
    /// Neutral grey ramp with a magenta accent.
    fn default() -> Self {
        let mut shades = [0u32; SHADE_LEVELS];
        for (i, s) in shades.iter_mut().enumerate() {
            let v = (i * 255 / (SHADE_LEVELS - 1)) as u32;
            *s = (v << 16) | (v << 8) | v;
        }
        Palette {
            shades,
            accent: 0x00_FF_30_C0,
        }
    }
}

impl Palette {
    #[inline]
    pub fn rgb(&self, tone: Tone) -> u32 {
        if tone == ACCENT {
            self.accent
        } else {
            self.shades[(tone as usize).min(SHADE_LEVELS - 1)]
        }
    }
}

/// Four-tone colour ramp: `[dark, mid, light, bright]`.
///
/// Texture samples index this ramp; distance fog and side shading move
/// the index down, saturating at the dark end (never wrapping).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ramp(pub [Tone; 4]);

impl Ramp {
    /// Clamp `level` into the ramp and return the tone.
    #[inline]
    pub fn tone(&self, level: i32) -> Tone {
        self.0[level.clamp(0, 3) as usize]
    }

    /// Mid-grey default used by the checkerboard fallback.
    pub const GREY: Ramp = Ramp([2, 5, 9, 13]);
}

/// Sample value marking a fully transparent texel (sprites only; the
/// compositor leaves the underlying frame cell untouched).
pub const TRANSPARENT: u8 = 0;

/// Highest legal sample value; `1..=MAX_SAMPLE` map to ramp levels `0..=3`.
pub const MAX_SAMPLE: u8 = 4;

/// Runtime handle for a texture in a [`TextureSet`].
///
/// *Guaranteed* to remain stable for the lifetime of the set.
pub type TextureId = u16;

/// `TextureId` whose samples are the checkerboard fallback.
/// Always = 0 because [`TextureSet::with_fallback`] inserts it first.
pub const FALLBACK: TextureId = 0;

/// Fixed-size grid of ramp samples plus the ramp they index.
///
/// Samples are `0` (transparent) or `1..=4` (ramp level + 1); anything
/// larger is rejected at construction so per-pixel code never range-checks.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub samples: Vec<u8>,
    pub ramp: Ramp,
}

impl Texture {
    pub fn new(
        name: impl Into<String>,
        w: usize,
        h: usize,
        samples: Vec<u8>,
        ramp: Ramp,
    ) -> Result<Self, TextureError> {
        let name = name.into();
        if samples.len() != w * h {
            return Err(TextureError::BadSize {
                name,
                expected: w * h,
                found: samples.len(),
            });
        }
        if let Some(&bad) = samples.iter().find(|&&s| s > MAX_SAMPLE) {
            return Err(TextureError::BadSample { name, value: bad });
        }
        Ok(Texture {
            name,
            w,
            h,
            samples,
            ramp,
        })
    }

    /// Raw sample at (u, v). Callers keep coordinates in range.
    #[inline]
    pub fn sample(&self, u: usize, v: usize) -> u8 {
        self.samples[v * self.w + u]
    }

    /// Shade sample (u, v): ramp tone stepped down by `steps_down`
    /// (distance fog + side penalty), saturating at the ramp's dark end.
    /// `None` for transparent texels.
    #[inline]
    pub fn shade(&self, u: usize, v: usize, steps_down: i32) -> Option<Tone> {
        let s = self.sample(u, v);
        if s == TRANSPARENT {
            return None;
        }
        Some(self.ramp.tone(s as i32 - 1 - steps_down))
    }
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        let mut samples = vec![0u8; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                samples[y * 8 + x] = if (x ^ y) & 1 == 0 { 4 } else { 1 };
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            w: 8,
            h: 8,
            samples,
            ramp: Ramp::GREY,
        }
    }
}

/// Things that can go wrong when building or using a texture set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in set")]
    Duplicate(String),

    /// Requested ID is outside `0 .. set.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Sample vector length does not match `w * h`.
    #[error("texture `{name}`: expected {expected} samples, got {found}")]
    BadSize {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A sample value does not index the 4-tone ramp.
    #[error("texture `{name}`: sample value {value} exceeds ramp range")]
    BadSample { name: String, value: u8 },
}

/// Append-only repository of textures.
///
/// * Stores exactly one copy of every name.
/// * ID **0** is always the checkerboard fallback.
///
/// Immutable once the world is loaded; the render pass only reads it.
pub struct TextureSet {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureSet {
    /// Create a set whose id 0 is the given fallback texture, inserted
    /// under the fixed name `"FALLBACK"`.
    pub fn with_fallback(fallback: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("FALLBACK".into(), FALLBACK);
        Self {
            by_name,
            data: vec![fallback],
        }
    }

    pub fn with_checker() -> Self {
        Self::with_fallback(Texture::default())
    }

    /// Number of textures stored (including the fallback).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only the fallback

    /// Obtain the id for a loaded texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Fallback-safe borrow for render paths: a bad id resolves to the
    /// checkerboard instead of aborting the frame.
    #[inline]
    pub fn texture_or_fallback(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Procedurally generated 8×8 textures for the built-in tile registry
    /// (`BRICK`, `STONE`, `DOOR`, `FLOOR`, `CEIL`, `WRAITH`).
    pub fn with_builtins() -> Self {
        let mut set = Self::with_checker();

        // brick: mortar lines every 4th row, offset joints
        let mut brick = vec![3u8; 64];
        for y in 0..8 {
            for x in 0..8 {
                let joint = if (y / 4) & 1 == 0 { 2 } else { 6 };
                if y % 4 == 0 || x == joint {
                    brick[y * 8 + x] = 1;
                }
            }
        }
        // stone: blocky two-level pattern
        let mut stone = vec![2u8; 64];
        for y in 0..8 {
            for x in 0..8 {
                if ((x / 2) ^ (y / 2)) & 1 == 0 {
                    stone[y * 8 + x] = 3;
                }
            }
        }
        // door: bright frame around a mid panel
        let mut door = vec![3u8; 64];
        for y in 0..8 {
            for x in 0..8 {
                if x == 0 || x == 7 || y == 0 || y == 7 {
                    door[y * 8 + x] = 4;
                } else if (2..=5).contains(&x) && (2..=5).contains(&y) {
                    door[y * 8 + x] = 2;
                }
            }
        }
        // floor / ceiling: sparse speckle
        let mut floor = vec![2u8; 64];
        let mut ceil = vec![1u8; 64];
        for y in 0..8 {
            for x in 0..8 {
                if (x * 3 + y * 5) % 11 == 0 {
                    floor[y * 8 + x] = 3;
                    ceil[y * 8 + x] = 2;
                }
            }
        }
        // wraith billboard: bright diamond on transparent ground
        let mut wraith = vec![TRANSPARENT; 64];
        for y in 0..8i32 {
            for x in 0..8i32 {
                let d = (x - 3).abs().max((x - 4).abs()) + (y - 3).abs().max((y - 4).abs());
                if d <= 4 {
                    wraith[(y * 8 + x) as usize] = if d <= 2 { 4 } else { 3 };
                }
            }
        }

        let ok: Result<(), TextureError> = (|| {
            set.insert("BRICK", Texture::new("BRICK", 8, 8, brick, Ramp([1, 4, 7, 11]))?)?;
            set.insert("STONE", Texture::new("STONE", 8, 8, stone, Ramp([2, 5, 8, 12]))?)?;
            set.insert("DOOR", Texture::new("DOOR", 8, 8, door, Ramp([3, 6, 10, 14]))?)?;
            set.insert("FLOOR", Texture::new("FLOOR", 8, 8, floor, Ramp([1, 3, 6, 9]))?)?;
            set.insert("CEIL", Texture::new("CEIL", 8, 8, ceil, Ramp([0, 2, 4, 7]))?)?;
            set.insert(
                "WRAITH",
                Texture::new("WRAITH", 8, 8, wraith, Ramp([4, 8, 12, 15]))?,
            )?;
            Ok(())
        })();
        // every sample above is in range; construction cannot fail
        debug_assert!(ok.is_ok());
        set
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
