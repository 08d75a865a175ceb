use glam::{Vec2, vec2};

/// Player view-point in grid space.
///
/// * Only **yaw** (heading) exists – the grid world never tilts up/down.
/// * Mutated once per frame by the external controller; the render pass
///   treats it as a read-only snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec2, // grid units
    yaw: f32,  // radians (0 = +X, counter-clockwise)
    fov: f32,  // horizontal FoV (radians, typical 60–90°)
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`, with horizontal FoV `fov`.
    pub fn new(pos: Vec2, yaw: f32, fov: f32) -> Self {
        Self { pos, yaw, fov }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Transform a grid-space point `p` into camera-local coords:
    ///  .x = lateral offset (+ right)
    ///  .y = depth along forward axis
    #[inline]
    pub fn to_cam(&self, p: Vec2) -> Vec2 {
        let d = p - self.pos;
        let (s, c) = self.yaw.sin_cos();
        // rotate by -yaw: camera forward becomes +depth
        vec2(d.x * s - d.y * c, d.x * c + d.y * s)
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s) // 0 rad = +X, CCW positive
    }

    /// Unit vector pointing to the camera's right.
    ///
    /// Clockwise perpendicular of `forward`, matching the lateral axis of
    /// [`Camera::to_cam`]; walls and sprites must agree on handedness.
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        // (x, y) -> (y, -x)
        let f = self.forward();
        Vec2::new(f.y, -f.x)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe).
    pub fn step(&mut self, forward: f32, side: f32) {
        let f = self.forward();
        let r = self.right();
        self.pos += f * forward + r * side;
    }

    /// Rotate around the vertical axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    /*───────────────── projection / ray helpers ─────────────────────*/

    /// Pixel-per-grid-unit scale for viewport width `w`.
    ///
    /// ```text
    /// focal = w / (2 * tan(fov/2))
    /// ```
    #[inline]
    pub fn focal(self, w: usize) -> f32 {
        (w as f32) * 0.5 / (self.fov * 0.5).tan()
    }

    /// Ray direction for screen column `col` of a `width`-column viewport.
    ///
    /// Columns sweep the FoV left to right; the returned vector is NOT
    /// normalised — its forward component is exactly 1, so a ray parameter
    /// `t` in `pos + dir * t` IS the perpendicular distance to the camera
    /// plane. This is what keeps wall projection fish-eye free.
    #[inline]
    pub fn ray_dir(self, col: usize, width: usize) -> Vec2 {
        let span = (width.max(2) - 1) as f32;
        let lateral = (2.0 * col as f32) / span - 1.0;
        self.forward() + self.right() * (lateral * (self.fov * 0.5).tan())
    }
}

/*====================================================================*/
/*                                Tests                               */
/*====================================================================*/
