use glam::Vec2;

use crate::world::texture::TextureId;

/// One billboard in grid space.
///
/// Created and destroyed by external game logic; the renderer only reads
/// an immutable snapshot slice per frame. List order is the tie-break for
/// sprites at exactly equal depth, so callers get deterministic output.
#[derive(Clone, Copy, Debug)]
pub struct Sprite {
    pub pos: Vec2,
    pub tex: TextureId,
}

impl Sprite {
    pub fn new(pos: Vec2, tex: TextureId) -> Self {
        Self { pos, tex }
    }
}
