//! Per-column grid raycasting (DDA).
//!
//! One ray per screen column walks cell boundaries along whichever axis
//! reaches the next integer boundary first. The reported distance is the
//! **perpendicular** distance to the camera plane, which is what keeps
//! wall projection free of fish-eye distortion: `Camera::ray_dir` hands
//! out directions whose forward component is exactly 1, so the ray
//! parameter at a boundary crossing already IS that distance.

use crate::world::{
    camera::Camera,
    grid::{Grid, Tile},
};

/// Which face of the cell the ray entered through. Horizontal faces take
/// one extra shade step, faking directional light without any lighting
/// computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// East/west face (the ray crossed an x boundary).
    Vertical,
    /// North/south face (the ray crossed a y boundary).
    Horizontal,
}

/// Transient result of one column cast. Not persisted across frames.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Perpendicular distance to the camera plane, `>= 0`.
    pub distance: f32,
    pub tile: Tile,
    pub side: Side,
    /// Fractional position along the hit face, `[0, 1)`.
    pub tex_u: f32,
}

/// Cast the ray for `col` of a `width`-column viewport against `grid`.
///
/// Returns `None` when no solid tile lies within `render_distance`; the
/// step loop is explicitly bounded so a malformed map can never spin.
/// A camera standing on a solid cell (e.g. exactly on the boundary of a
/// wall it faces) reports an immediate hit at distance 0 rather than a
/// NaN or a division blow-up.
pub fn cast_column(
    camera: &Camera,
    grid: &Grid,
    col: usize,
    width: usize,
    render_distance: f32,
) -> Option<RayHit> {
    let pos = camera.pos();
    let dir = camera.ray_dir(col, width);

    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    let start = grid.tile_at(map_x, map_y);
    if start.is_solid() {
        let side = if dir.x.abs() >= dir.y.abs() {
            Side::Vertical
        } else {
            Side::Horizontal
        };
        let along = match side {
            Side::Vertical => pos.y,
            Side::Horizontal => pos.x,
        };
        return Some(RayHit {
            distance: 0.0,
            tile: start,
            side,
            tex_u: along.rem_euclid(1.0),
        });
    }

    // distance along the ray between consecutive boundaries of each axis
    let delta_x = if dir.x == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / dir.x).abs()
    };
    let delta_y = if dir.y == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / dir.y).abs()
    };

    // ray parameter at the first boundary crossing of each axis
    let (step_x, mut side_x) = if dir.x < 0.0 {
        (-1, (pos.x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if dir.y < 0.0 {
        (-1, (pos.y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - pos.y) * delta_y)
    };

    // Hard iteration bound: every step advances one side distance by at
    // least min(delta), so this covers render_distance on both axes.
    let tight = delta_x.min(delta_y);
    let max_steps = if tight.is_finite() {
        (2.0 * render_distance / tight) as usize + 2
    } else {
        1
    };

    for _ in 0..max_steps {
        let (t, side) = if side_x < side_y {
            let t = side_x;
            side_x += delta_x;
            map_x += step_x;
            (t, Side::Vertical)
        } else {
            let t = side_y;
            side_y += delta_y;
            map_y += step_y;
            (t, Side::Horizontal)
        };

        if t > render_distance {
            return None;
        }

        let tile = grid.tile_at(map_x, map_y);
        if tile.is_solid() {
            // world coordinate along the hit face
            let along = match side {
                Side::Vertical => pos.y + t * dir.y,
                Side::Horizontal => pos.x + t * dir.x,
            };
            let mut u = along.rem_euclid(1.0);
            // flip so textures read left-to-right when facing the wall
            if (side == Side::Vertical && dir.x > 0.0)
                || (side == Side::Horizontal && dir.y < 0.0)
            {
                u = (1.0 - u).rem_euclid(1.0);
            }
            return Some(RayHit {
                distance: t,
                tile,
                side,
                tex_u: u,
            });
        }
    }
    None
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
