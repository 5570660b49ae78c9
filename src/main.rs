use anyhow::Context;
use clap::Parser;
use game::{Game, GameState};
use rayscape::{Config, FrameController, MapFile};
use sdl2::event::Event;
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod game;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

/// Walk around a tile map with the arrow keys (or WASD). M toggles the
/// minimap, Escape pauses.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Map file to load instead of the built-in one
    #[arg(long)]
    map: Option<PathBuf>,

    /// Viewport width in pixels (default: map width)
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels (default: map height)
    #[arg(long)]
    height: Option<u32>,

    /// Pixels per wall strip; one ray is cast per strip
    #[arg(long)]
    strip_width: Option<u32>,

    /// Larger values narrow the field of view
    #[arg(long)]
    focal_length: Option<f64>,

    /// World units walked per frame
    #[arg(long)]
    move_speed: Option<f64>,

    /// Half-angle tangent turned per frame
    #[arg(long)]
    rotation_speed: Option<f64>,

    #[arg(long)]
    fps: Option<u32>,
}

impl Args {
    fn config(&self, map: &MapFile) -> Config {
        let base = Config::for_grid(&map.grid);
        Config {
            viewport_width: self.width.unwrap_or(base.viewport_width),
            viewport_height: self.height.unwrap_or(base.viewport_height),
            strip_width: self.strip_width.unwrap_or(base.strip_width),
            focal_length: self.focal_length.unwrap_or(base.focal_length),
            move_speed: self.move_speed.unwrap_or(base.move_speed),
            rotation_speed: self.rotation_speed.unwrap_or(base.rotation_speed),
            target_fps: self.fps.unwrap_or(base.target_fps),
            ..base
        }
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("RAYSCAPE_LOG");
    let args = Args::parse();

    let map = match &args.map {
        Some(path) => MapFile::load(path)
            .with_context(|| format!("could not load map {}", path.display()))?,
        None => MapFile::builtin().context("built-in map is broken")?,
    };
    let config = args.config(&map);
    let (width, height) = (config.viewport_width, config.viewport_height);
    let controller = FrameController::from_map(config, map)?;

    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;

    log::info!("initializing window");
    let mut window = video
        .window(game::TITLE, width, height)
        .position_centered()
        .build()?;
    window.set_resizable(false);
    log::info!("creating canvas");
    let canvas = window.into_canvas().build()?;
    log::info!("pumping events");
    let mut events = sdl_ctx.event_pump().ah()?;

    log::info!("initializing game state");
    let mut game = Game::new(canvas, controller);
    let delta = Duration::from_millis(game.config().frame_millis());

    'main_loop: loop {
        let prev = Instant::now();

        // handle events
        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. } => break 'main_loop,
                Event::KeyDown {
                    keycode: Some(k),
                    repeat: false,
                    ..
                } => game.key_down(k),
                Event::KeyUp {
                    keycode: Some(k), ..
                } => game.key_up(k),
                _ => {}
            }
        }

        if game.state() == GameState::Exit {
            break;
        }

        // draw game
        if let Err(err) = game.draw() {
            log::error!("error while in game state {:?}: {err}", game.state());
            return Err(err);
        }
        game.canvas.present();

        let diff = prev.elapsed();
        if diff < delta {
            std::thread::sleep(delta - diff);
        }
    }

    log::info!("quitting after {} frames", game.frames());
    Ok(())
}
