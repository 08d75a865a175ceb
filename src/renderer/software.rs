//! ---------------------------------------------------------------------------
//! Software (CPU) column renderer for the grid world
//!
//! Per frame, strictly in this order and to completion:
//!   1. floor/ceiling rows (trigonometric projection)
//!   2. one DDA ray per column → wall slice + z-buffer entry
//!   3. billboard sprites, depth-tested against the z-buffer
//!
//! The frame buffer and z-buffer are owned here and overwritten wholesale
//! every frame; nothing of a previous frame leaks into the next one.
//! ---------------------------------------------------------------------------

use glam::Vec2;

use crate::{
    renderer::{Frame, RenderConfig},
    world::{camera::Camera, grid::Grid, sprite::Sprite, texture::TextureSet},
};

pub mod planes;
pub mod raycast;
pub mod sprites;

use raycast::{Side, cast_column};

/// Depth floor used only for projection math; reported hit distances are
/// untouched (a boundary camera still sees distance 0).
const MIN_DEPTH: f32 = 1e-4;

/// Eye height above the floor, in wall heights.
const EYE_Z: f32 = 0.5;

/// Column renderer owning all per-frame scratch.
pub struct Software {
    cfg: RenderConfig,
    frame: Frame,
    /// Nearest-wall perpendicular distance per column; `f32::INFINITY`
    /// where the ray ran out of render distance.
    zbuf: Vec<f32>,
    /// Per-column ray directions, refreshed from the camera each frame.
    ray_dirs: Vec<Vec2>,
    /// RGB scratch for `submit`.
    rgb: Vec<u32>,

    focal: f32,
    half_h: f32,
    half_w: f32,
}

impl Software {
    pub fn new(cfg: RenderConfig) -> Self {
        let (w, h) = (cfg.width, cfg.height);
        Self {
            cfg,
            frame: Frame::new(w, h),
            zbuf: vec![f32::INFINITY; w],
            ray_dirs: vec![Vec2::ZERO; w],
            rgb: vec![0; w * h],
            focal: 0.0,
            half_h: h as f32 * 0.5,
            half_w: w as f32 * 0.5,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    /// Finished frame of the most recent `render` call.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Mutable access for the post-process stage.
    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    /// Z-buffer of the most recent `render` call (read-only; the depth
    /// blur effect samples it).
    pub fn zbuffer(&self) -> &[f32] {
        &self.zbuf
    }

    /// Split borrow for the post-process stage: the frame to mutate plus
    /// the z-buffer it may read.
    pub fn frame_and_zbuffer(&mut self) -> (&mut Frame, &[f32]) {
        (&mut self.frame, &self.zbuf)
    }

    /// Run the full wall + plane + sprite pass for one frame.
    ///
    /// Camera and sprite list are read-only snapshots for the duration of
    /// the call; per-sprite anomalies are skipped, never errored.
    pub fn render(
        &mut self,
        camera: &Camera,
        grid: &Grid,
        textures: &TextureSet,
        sprites: &[Sprite],
    ) {
        self.begin_frame(camera);
        self.draw_planes(camera, textures);
        self.draw_walls(camera, grid, textures);
        self.composite_sprites(camera, textures, sprites);
    }

    /// Blit the finished frame through `palette` and **loan** it to
    /// `submit(&[u32], width, height)`, run exactly once.
    pub fn submit<F>(&mut self, palette: &crate::world::texture::Palette, submit: F)
    where
        F: FnOnce(&[u32], usize, usize),
    {
        self.frame.blit(palette, &mut self.rgb);
        submit(&self.rgb, self.cfg.width, self.cfg.height);
    }

    /*──────────────────────── frame stages ──────────────────────────*/

    fn begin_frame(&mut self, camera: &Camera) {
        self.frame.fill(crate::world::texture::TONE_MIN);
        self.zbuf.fill(f32::INFINITY);
        self.focal = camera.focal(self.cfg.width);
        for (col, d) in self.ray_dirs.iter_mut().enumerate() {
            *d = camera.ray_dir(col, self.cfg.width);
        }
    }

    fn draw_walls(&mut self, camera: &Camera, grid: &Grid, textures: &TextureSet) {
        let h = self.cfg.height;
        for x in 0..self.cfg.width {
            let Some(hit) =
                cast_column(camera, grid, x, self.cfg.width, self.cfg.render_distance)
            else {
                continue; // open space; z-buffer stays at infinity
            };
            self.zbuf[x] = hit.distance;

            let tex = textures.texture_or_fallback(grid.texture_of(hit.tile));

            let depth = hit.distance.max(MIN_DEPTH);
            let scale = self.focal / depth;
            let y_top = self.half_h - EYE_Z * scale;
            let y_bot = self.half_h + (1.0 - EYE_Z) * scale;

            let y0 = y_top.max(0.0) as usize;
            let y1 = (y_bot.min(h as f32 - 1.0)) as usize;
            if y0 > y1 {
                continue;
            }

            let tex_x = ((hit.tex_u * tex.w as f32) as usize).min(tex.w - 1);
            let v_step = tex.h as f32 / (y_bot - y_top).max(1.0);
            let mut v_f = (y0 as f32 - y_top) * v_step;

            let shade_down = self.fog_steps(hit.distance)
                + if hit.side == Side::Horizontal { 1 } else { 0 };

            for y in y0..=y1 {
                let tex_y = (v_f as usize).min(tex.h - 1);
                if let Some(tone) = tex.shade(tex_x, tex_y, shade_down) {
                    self.frame.set(x, y, tone);
                }
                v_f += v_step;
            }
        }
    }

    /// Ramp steps lost to distance fog at `dist`.
    #[inline]
    fn fog_steps(&self, dist: f32) -> i32 {
        (dist / self.cfg.fog_step) as i32
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::DEFAULT_TILESET;
    use glam::vec2;
    use std::f32::consts::FRAC_PI_2;

    fn fixture() -> (Grid, TextureSet, RenderConfig) {
        let set = TextureSet::with_builtins();
        let rows = ["#####", "#   #", "#   #", "#####"];
        let grid = Grid::load(&rows, &DEFAULT_TILESET, &set).unwrap();
        let cfg = RenderConfig {
            width: 41,
            height: 30,
            render_distance: 16.0,
            fog_step: 4.0,
            floor_tex: set.id("FLOOR").unwrap(),
            ceil_tex: set.id("CEIL").unwrap(),
        };
        (grid, set, cfg)
    }

    #[test]
    fn zbuffer_is_filled_for_every_column() {
        let (grid, set, cfg) = fixture();
        let mut sw = Software::new(cfg);
        let cam = Camera::new(vec2(2.5, 2.0), 0.0, FRAC_PI_2);
        sw.render(&cam, &grid, &set, &[]);
        // closed room: every column sees a wall within range
        assert!(sw.zbuffer().iter().all(|d| d.is_finite()));
        // center column faces the east wall face at x=4, 1.5 units away
        assert!((sw.zbuffer()[20] - 1.5).abs() < 1e-3);
    }

    #[test]
    fn nearer_walls_draw_taller_slices() {
        let (grid, set, cfg) = fixture();
        let mut far_sw = Software::new(cfg.clone());
        let mut near_sw = Software::new(cfg);

        let far = Camera::new(vec2(1.2, 2.0), 0.0, FRAC_PI_2);
        let near = Camera::new(vec2(3.5, 2.0), 0.0, FRAC_PI_2);
        far_sw.render(&far, &grid, &set, &[]);
        near_sw.render(&near, &grid, &set, &[]);

        assert!(near_sw.zbuffer()[20] < far_sw.zbuffer()[20]);
        // screen size is inversely proportional to distance
        let slice_px = |sw: &Software| sw.config().height as f32 / sw.zbuffer()[20];
        assert!(slice_px(&near_sw) > slice_px(&far_sw));
        assert_ne!(far_sw.frame().cells(), near_sw.frame().cells());
    }

    #[test]
    fn render_is_deterministic_across_instances() {
        let (grid, set, cfg) = fixture();
        let cam = Camera::new(vec2(2.2, 1.8), 0.4, FRAC_PI_2);
        let spr = [Sprite::new(vec2(3.0, 2.0), set.id("WRAITH").unwrap())];

        let mut a = Software::new(cfg.clone());
        a.render(&cam, &grid, &set, &spr);
        let first = a.frame().cells().to_vec();

        // fresh renderer, same inputs: identical buffer, no hidden state
        let mut b = Software::new(cfg);
        b.render(&cam, &grid, &set, &spr);
        assert_eq!(first, b.frame().cells());

        // and re-rendering on the same instance is also stable
        a.render(&cam, &grid, &set, &spr);
        assert_eq!(first, a.frame().cells());
    }

    #[test]
    fn open_columns_leave_infinite_depth() {
        let set = TextureSet::with_builtins();
        // wide open strip, east wall far beyond render distance
        let rows = ["                                        "; 3];
        let grid = Grid::load(&rows, &DEFAULT_TILESET, &set).unwrap();
        let cfg = RenderConfig {
            width: 41,
            height: 30,
            render_distance: 8.0,
            fog_step: 4.0,
            floor_tex: set.id("FLOOR").unwrap(),
            ceil_tex: set.id("CEIL").unwrap(),
        };
        let mut sw = Software::new(cfg);
        let cam = Camera::new(vec2(2.0, 1.5), 0.0, FRAC_PI_2);
        sw.render(&cam, &grid, &set, &[]);
        assert!(sw.zbuffer()[20].is_infinite());
    }
}
