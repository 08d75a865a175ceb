pub mod camera;
pub mod grid;
pub mod sprite;
pub mod texture;

pub use camera::Camera;
pub use grid::{Grid, LoadError, Tile, TileDef};
pub use sprite::Sprite;
pub use texture::{Palette, Ramp, Texture, TextureId, TextureSet, Tone};
