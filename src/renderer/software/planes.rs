//! Floor and ceiling rows.
//!
//! Planes are unbounded, so there is no cell walk here: for each screen
//! row below (floor) or above (ceiling) the horizon, straight trigonometry
//! gives the world-space distance at which a ray through that row meets
//! the plane, and the texture is sampled by world (x, y) modulo its size.

use crate::{
    renderer::software::{EYE_Z, Software},
    world::{camera::Camera, texture::TextureSet},
};

impl Software {
    /// Fill every row of the frame from the floor/ceiling textures.
    /// Walls and sprites overwrite the middle afterwards.
    pub(super) fn draw_planes(&mut self, camera: &Camera, textures: &TextureSet) {
        let w = self.cfg.width;
        let h = self.cfg.height;
        let floor = textures.texture_or_fallback(self.cfg.floor_tex);
        let ceil = textures.texture_or_fallback(self.cfg.ceil_tex);
        let pos = camera.pos();

        // rows below the horizon; each mirrors onto one ceiling row
        for y in (h / 2)..h {
            let p = (y as f32 + 0.5) - self.half_h;
            if p <= 0.0 {
                continue;
            }
            // perpendicular distance at which this row meets the plane
            let row_dist = self.focal * EYE_Z / p;
            let fog = self.fog_steps(row_dist);
            let y_ceil = h - 1 - y;

            for x in 0..w {
                let world = pos + self.ray_dirs[x] * row_dist;
                let u = world.x.rem_euclid(1.0);
                let v = world.y.rem_euclid(1.0);

                let fu = ((u * floor.w as f32) as usize).min(floor.w - 1);
                let fv = ((v * floor.h as f32) as usize).min(floor.h - 1);
                if let Some(tone) = floor.shade(fu, fv, fog) {
                    self.frame.set(x, y, tone);
                }

                let cu = ((u * ceil.w as f32) as usize).min(ceil.w - 1);
                let cv = ((v * ceil.h as f32) as usize).min(ceil.h - 1);
                if let Some(tone) = ceil.shade(cu, cv, fog) {
                    self.frame.set(x, y_ceil, tone);
                }
            }
        }
    }
}
