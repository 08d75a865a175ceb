//! Billboard sprite compositing.
//!
//! Sprites are projected with the same perspective divide as walls, then
//! depth-tested per column against the z-buffer: a sprite pixel is drawn
//! only where its depth is **strictly less** than the nearest wall. Among
//! themselves sprites are painter-sorted back-to-front; the sort is
//! stable, so two sprites at exactly equal depth keep their snapshot
//! order and output stays deterministic.

use crate::{
    renderer::software::{EYE_Z, Software},
    world::{camera::Camera, sprite::Sprite, texture::TextureSet},
};

/// Sprites closer than this to the camera plane are rejected rather than
/// projected through a near-zero divisor.
const NEAR: f32 = 0.05;

/// Billboards span one wall height in world units.
const SPRITE_SIZE: f32 = 1.0;

/// One projected billboard, ready for the column loop.
#[derive(Clone, Copy)]
struct VisSprite {
    x0: i32, // inclusive
    x1: i32, // inclusive
    y0: i32,
    y1: i32,
    depth: f32,
    tex: crate::world::texture::TextureId,
}

impl Software {
    /// Project `sprites` and composite them onto the current frame.
    /// Out-of-frustum or degenerate sprites are silently skipped.
    pub(super) fn composite_sprites(
        &mut self,
        camera: &Camera,
        textures: &TextureSet,
        sprites: &[Sprite],
    ) {
        let w = self.cfg.width as i32;
        let h = self.cfg.height as i32;

        let mut vis: Vec<VisSprite> = Vec::with_capacity(sprites.len());
        for s in sprites {
            let rel = camera.to_cam(s.pos);
            let depth = rel.y;
            if depth < NEAR || depth > self.cfg.render_distance {
                continue; // behind the camera plane or out of range
            }
            let scale = self.focal / depth;
            let xc = self.half_w + rel.x * scale;
            let half_px = SPRITE_SIZE * 0.5 * scale;

            let x0 = (xc - half_px).floor() as i32;
            let x1 = (xc + half_px).ceil() as i32 - 1;
            if x1 < 0 || x0 >= w || x1 < x0 {
                continue; // completely off-screen
            }

            // anchored on the floor, spanning one wall height
            let y_bot = self.half_h + (1.0 - EYE_Z) * scale;
            let y_top = y_bot - SPRITE_SIZE * scale;

            vis.push(VisSprite {
                x0,
                x1,
                y0: y_top.floor() as i32,
                y1: y_bot.ceil() as i32 - 1,
                depth,
                tex: s.tex,
            });
        }

        // far-to-near painter order; stable sort keeps snapshot order for
        // exactly equal depths
        vis.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for spr in &vis {
            let tex = textures.texture_or_fallback(spr.tex);
            let span_x = (spr.x1 - spr.x0 + 1) as f32;
            let span_y = (spr.y1 - spr.y0 + 1) as f32;
            if span_x <= 0.0 || span_y <= 0.0 {
                continue;
            }
            let u_step = tex.w as f32 / span_x;
            let v_step = tex.h as f32 / span_y;
            let fog = self.fog_steps(spr.depth);

            let x_start = spr.x0.max(0);
            let x_end = spr.x1.min(w - 1);
            let y_start = spr.y0.max(0);
            let y_end = spr.y1.min(h - 1);

            for x in x_start..=x_end {
                // strict test: a sprite exactly as far as the wall loses
                if spr.depth >= self.zbuf[x as usize] {
                    continue;
                }
                let u = (((x - spr.x0) as f32 * u_step) as usize).min(tex.w - 1);
                for y in y_start..=y_end {
                    let v = (((y - spr.y0) as f32 * v_step) as usize).min(tex.h - 1);
                    // transparent texels leave the wall/floor pixel alone
                    if let Some(tone) = tex.shade(u, v, fog) {
                        self.frame.set(x as usize, y as usize, tone);
                    }
                }
            }
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use crate::renderer::{RenderConfig, software::Software};
    use crate::world::{
        camera::Camera,
        grid::{DEFAULT_TILESET, Grid},
        sprite::Sprite,
        texture::{Ramp, Texture, TextureSet},
    };
    use glam::vec2;
    use std::f32::consts::FRAC_PI_2;

    fn solid_tex(set: &mut TextureSet, name: &str, ramp: Ramp) -> crate::world::texture::TextureId {
        set.insert(name, Texture::new(name, 2, 2, vec![4; 4], ramp).unwrap())
            .unwrap()
    }

    fn fixture() -> (Grid, TextureSet, RenderConfig) {
        let mut set = TextureSet::with_builtins();
        solid_tex(&mut set, "BRIGHT", Ramp([12, 13, 14, 15]));
        solid_tex(&mut set, "DIM", Ramp([0, 1, 2, 3]));
        let rows = [
            "##########",
            "#        #",
            "#        #",
            "#        #",
            "##########",
        ];
        let grid = Grid::load(&rows, &DEFAULT_TILESET, &set).unwrap();
        let cfg = RenderConfig {
            width: 41,
            height: 30,
            render_distance: 16.0,
            fog_step: 16.0, // effectively no fog; keeps tones exact
            floor_tex: set.id("FLOOR").unwrap(),
            ceil_tex: set.id("CEIL").unwrap(),
        };
        (grid, set, cfg)
    }

    fn center_tone(sw: &Software) -> u8 {
        sw.frame().get(20, 15)
    }

    #[test]
    fn nearer_sprite_wins_shared_columns() {
        let (grid, set, cfg) = fixture();
        let cam = Camera::new(vec2(1.5, 2.5), 0.0, FRAC_PI_2);
        let near = Sprite::new(vec2(3.5, 2.5), set.id("BRIGHT").unwrap());
        let far = Sprite::new(vec2(5.5, 2.5), set.id("DIM").unwrap());

        let mut sw = Software::new(cfg.clone());
        sw.render(&cam, &grid, &set, &[far, near]);
        assert_eq!(center_tone(&sw), 15, "near sprite must cover the far one");

        // snapshot order must not matter when depths differ
        let mut sw2 = Software::new(cfg);
        sw2.render(&cam, &grid, &set, &[near, far]);
        assert_eq!(center_tone(&sw2), 15);
    }

    #[test]
    fn equal_depth_resolves_by_insertion_order() {
        let (grid, set, cfg) = fixture();
        let cam = Camera::new(vec2(1.5, 2.5), 0.0, FRAC_PI_2);
        let a = Sprite::new(vec2(4.5, 2.5), set.id("BRIGHT").unwrap());
        let b = Sprite::new(vec2(4.5, 2.5), set.id("DIM").unwrap());

        // stable back-to-front draw: the later snapshot entry lands on top
        let mut sw = Software::new(cfg.clone());
        sw.render(&cam, &grid, &set, &[a, b]);
        assert_eq!(center_tone(&sw), 3);

        let mut sw2 = Software::new(cfg);
        sw2.render(&cam, &grid, &set, &[b, a]);
        assert_eq!(center_tone(&sw2), 15);
    }

    #[test]
    fn sprite_behind_wall_is_occluded() {
        let (_, set, cfg) = fixture();
        let rows = ["#####", "#   #", "# % #", "#   #", "#####"];
        let grid = Grid::load(&rows, &DEFAULT_TILESET, &set).unwrap();
        let cam = Camera::new(vec2(1.5, 2.5), 0.0, FRAC_PI_2);
        // hidden behind the free-standing stone block
        let spr = Sprite::new(vec2(3.8, 2.5), set.id("BRIGHT").unwrap());

        let mut with = Software::new(cfg.clone());
        with.render(&cam, &grid, &set, &[spr]);
        let mut without = Software::new(cfg);
        without.render(&cam, &grid, &set, &[]);
        // columns covered by the block show no sprite at all where the
        // block is nearer; compare a column straight through the block
        let x = 20;
        for y in 0..with.frame().height() {
            if with.zbuffer()[x] <= cam.to_cam(spr.pos).y {
                assert_eq!(with.frame().get(x, y), without.frame().get(x, y));
            }
        }
    }

    #[test]
    fn sprite_exactly_at_wall_depth_is_not_drawn() {
        let (grid, set, cfg) = fixture();
        let cam = Camera::new(vec2(1.5, 2.5), 0.0, FRAC_PI_2);
        let mut sw = Software::new(cfg.clone());
        sw.render(&cam, &grid, &set, &[]);
        let wall_depth = sw.zbuffer()[20];
        let baseline = sw.frame().cells().to_vec();

        // place the sprite at exactly the wall's perpendicular depth
        let spr = Sprite::new(
            vec2(1.5 + wall_depth, 2.5),
            set.id("BRIGHT").unwrap(),
        );
        let mut sw2 = Software::new(cfg);
        sw2.render(&cam, &grid, &set, &[spr]);
        // occlusion is strict-less-than: no pixel may change
        assert_eq!(baseline, sw2.frame().cells());
    }

    #[test]
    fn sprite_behind_camera_is_skipped() {
        let (grid, set, cfg) = fixture();
        let cam = Camera::new(vec2(5.0, 2.5), 0.0, FRAC_PI_2);
        let behind = Sprite::new(vec2(2.0, 2.5), set.id("BRIGHT").unwrap());

        let mut with = Software::new(cfg.clone());
        with.render(&cam, &grid, &set, &[behind]);
        let mut without = Software::new(cfg);
        without.render(&cam, &grid, &set, &[]);
        assert_eq!(with.frame().cells(), without.frame().cells());
    }

    #[test]
    fn transparent_texels_preserve_background() {
        let (grid, set, cfg) = fixture();
        let cam = Camera::new(vec2(1.5, 2.5), 0.0, FRAC_PI_2);
        // WRAITH has transparent corners
        let spr = Sprite::new(vec2(3.5, 2.5), set.id("WRAITH").unwrap());

        let mut with = Software::new(cfg.clone());
        with.render(&cam, &grid, &set, &[spr]);
        let mut without = Software::new(cfg);
        without.render(&cam, &grid, &set, &[]);

        // the sprite is visible somewhere
        assert_ne!(with.frame().cells(), without.frame().cells());
        // the sprite's top-left corner texel is transparent: the cell at
        // its projected position still shows the background
        let diff: Vec<usize> = with
            .frame()
            .cells()
            .iter()
            .zip(without.frame().cells())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        // changed cells form a diamond, not the full bounding square
        let w = with.frame().width();
        let min_x = diff.iter().map(|i| i % w).min().unwrap();
        let min_y = diff.iter().map(|i| i / w).min().unwrap();
        let bb_corner = min_y * w + min_x;
        assert!(
            !diff.contains(&bb_corner),
            "transparent corner texel must not be composited"
        );
    }
}
