//! Interactive viewer for the glitchcast renderer.
//!
//! ```bash
//! cargo run --release -- --width 960 --height 600 --seed 1
//! ```
//!
//! WASD / arrow keys move and turn, `0`/`1`/`2` set the corruption
//! stage, Escape quits.

use clap::Parser;
use minifb::{Key, Window, WindowOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

use glam::vec2;
use glitchcast::{
    Camera, Grid, Intensity, Pipeline, RenderConfig, Software, Sprite, TextureSet,
    world::grid::DEFAULT_TILESET, world::texture::Palette,
};

const MAP: &[&str] = &[
    "################",
    "#      %       #",
    "#  ##  %   ##  #",
    "#  #+      ##  #",
    "#              #",
    "#   %%%+%%%    #",
    "#   %      %   #",
    "#   %      %   #",
    "#   %%%%%%%%   #",
    "#              #",
    "################",
];

#[derive(Parser)]
#[command(about = "walk around a corrupting grid world")]
struct Args {
    /// Window and framebuffer width in pixels.
    #[arg(long, default_value_t = 960)]
    width: usize,

    /// Window and framebuffer height in pixels.
    #[arg(long, default_value_t = 600)]
    height: usize,

    /// RNG seed for the post-process pipeline.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Starting corruption stage (0, 1 or 2).
    #[arg(long, default_value_t = 0)]
    intensity: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let textures = TextureSet::with_builtins();
    let grid = Grid::load(MAP, &DEFAULT_TILESET, &textures)?;

    let wraith = textures.id("WRAITH").expect("builtin sprite texture");
    let sprites = [
        Sprite::new(vec2(5.5, 4.5), wraith),
        Sprite::new(vec2(10.5, 1.5), wraith),
        Sprite::new(vec2(7.5, 9.5), wraith),
    ];

    let cfg = RenderConfig {
        width: args.width,
        height: args.height,
        render_distance: 24.0,
        fog_step: 3.0,
        floor_tex: textures.id("FLOOR").unwrap_or(0),
        ceil_tex: textures.id("CEIL").unwrap_or(0),
    };
    let mut renderer = Software::new(cfg);
    let mut pipeline = Pipeline::default();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let palette = Palette::default();

    let mut camera = Camera::new(vec2(2.0, 2.0), 0.8, 75_f32.to_radians());
    let mut intensity = Intensity::from_stage(args.intensity);

    let mut win = Window::new(
        "glitchcast",
        args.width,
        args.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(30);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO; // cumulated render time
    let mut acc_frames = 0usize; // frames in the current window
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* --------------- camera input ------------------------------------ */
        let mut forward = 0.0;
        let mut side = 0.0;
        let mut turn = 0.0;
        if win.is_key_down(Key::W) || win.is_key_down(Key::Up) {
            forward += 0.12;
        }
        if win.is_key_down(Key::S) || win.is_key_down(Key::Down) {
            forward -= 0.12;
        }
        if win.is_key_down(Key::A) {
            side -= 0.10;
        }
        if win.is_key_down(Key::D) {
            side += 0.10;
        }
        if win.is_key_down(Key::Left) {
            turn += 0.05;
        }
        if win.is_key_down(Key::Right) {
            turn -= 0.05;
        }
        if win.is_key_down(Key::Key0) {
            intensity = Intensity::Calm;
        }
        if win.is_key_down(Key::Key1) {
            intensity = Intensity::Uneasy;
        }
        if win.is_key_down(Key::Key2) {
            intensity = Intensity::Breach;
        }

        camera.turn(turn);
        // crude collision: only step onto empty tiles
        let mut probe = camera;
        probe.step(forward, side);
        let p = probe.pos();
        if !grid.tile_at(p.x as i32, p.y as i32).is_solid() {
            camera = probe;
        }

        /* --------------- render + corrupt -------------------------------- */
        renderer.render(&camera, &grid, &textures, &sprites);
        let (frame, zbuf) = renderer.frame_and_zbuffer();
        pipeline.apply(frame, zbuf, intensity, 1.0, &mut rng);

        let mut result = Ok(());
        renderer.submit(&palette, |rgb, w, h| {
            result = win.update_with_buffer(rgb, w, h);
        });
        result?;

        /* --------------- frame-time report ------------------------------- */
        acc_time += t0.elapsed();
        acc_frames += 1;
        if last_print.elapsed() >= Duration::from_secs(1) && acc_frames > 0 {
            println!(
                "frame {:5.2} ms  ({} active effects)",
                acc_time.as_secs_f64() * 1000.0 / acc_frames as f64,
                pipeline.active().len()
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
