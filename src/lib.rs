//! glitchcast — a grid raycaster with a corrupting post-process stage.
//!
//! The per-frame pipeline, run synchronously to completion:
//!
//! 1. [`renderer::software::Software::render`] casts one DDA ray per
//!    column against the [`world::Grid`], fills floor/ceiling rows, and
//!    composites billboard [`world::Sprite`]s against the per-column
//!    z-buffer.
//! 2. [`glitch::Pipeline::apply`] perturbs the finished frame in place,
//!    driven by an external intensity stage and an explicit RNG handle.
//! 3. The caller borrows the frame (or an RGB blit of it) and hands it to
//!    whatever sink it likes; see `src/bin/walk.rs` for a minifb window.
//!
//! Grid and texture data are immutable after load; the frame and
//! z-buffer are overwritten wholesale every frame. The only state that
//! survives between frames is the glitch pipeline's active-event list.

pub mod glitch;
pub mod renderer;
pub mod world;

pub use glitch::{Intensity, Pipeline};
pub use renderer::{Frame, RenderConfig, software::Software};
pub use world::{Camera, Grid, LoadError, Sprite, TextureSet};
