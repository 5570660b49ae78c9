use crate::StringToAnyhow;
use rayscape::{Config, Frame, FrameController, Intent, Rgb, Surface, Tile};
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::rect::{Point, Rect};
use sdl2::render::{BlendMode, Canvas};
use sdl2::video::Window;

pub(crate) const TITLE: &str = "rayscape";

// length of the heading line on the minimap, world units
const HEADING_LENGTH: f64 = 30.;
const PLAYER_SIZE: u32 = 4;

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum GameState {
    Playing,
    Minimap,
    Paused,
    Exit,
}

fn sdl_color(rgb: Rgb) -> Color {
    Color::RGB(rgb.0, rgb.1, rgb.2)
}

/// Draws frames onto an SDL canvas.
struct CanvasSurface<'c> {
    canvas: &'c mut Canvas<Window>,
    minimap: bool,
}

impl CanvasSurface<'_> {
    fn draw_view(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        let Config {
            viewport_width: width,
            viewport_height: height,
            strip_width,
            ceiling,
            floor,
            ..
        } = *frame.config;

        // DRAW CEILING
        self.canvas.set_draw_color(sdl_color(ceiling));
        self.canvas
            .fill_rect(Rect::new(0, 0, width, height / 2))
            .ah()?;

        // DRAW FLOOR
        self.canvas.set_draw_color(sdl_color(floor));
        self.canvas
            .fill_rect(Rect::new(0, height as i32 / 2, width, height - height / 2))
            .ah()?;

        // DRAW WALLS
        for column in frame.columns {
            let Some(mut color) = column.color() else {
                continue;
            };
            if let Some(fog) = frame.fog {
                color = color.mix(fog.color, column.fog);
            }

            let (top, bottom) = column.span(height);
            if bottom <= top {
                continue;
            }
            self.canvas.set_draw_color(sdl_color(color));
            self.canvas
                .fill_rect(Rect::new(
                    (column.column as u32 * strip_width) as i32,
                    top as i32,
                    strip_width,
                    bottom - top,
                ))
                .ah()?;
        }

        Ok(())
    }

    fn draw_minimap(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        let scale = frame.config.minimap_scale;
        let to_screen = |x: f64, y: f64| Point::new((x * scale) as i32, (y * scale) as i32);

        // darken the view underneath
        self.canvas.set_blend_mode(BlendMode::Blend);
        self.canvas.set_draw_color(Color::RGBA(0, 0, 0, 0x77));
        self.canvas.fill_rect(None).ah()?;
        self.canvas.set_blend_mode(BlendMode::None);

        let cell = ((frame.grid.tile_size() * scale).ceil() as u32).max(1);
        for (col, row, tile) in frame.grid.tiles() {
            let Tile::Solid(material) = tile else {
                continue;
            };
            let origin = frame.grid.cell_origin(col, row);
            let corner = to_screen(origin.x, origin.y);
            self.canvas
                .set_draw_color(sdl_color(rayscape::projection::material_color(material)));
            self.canvas
                .fill_rect(Rect::new(corner.x(), corner.y(), cell, cell))
                .ah()?;
        }

        let position = frame.player.position();
        let eye = to_screen(position.x, position.y);

        self.canvas.set_draw_color(Color::RGB(0xff, 0, 0));
        for hit in frame.hits.iter().filter(|hit| !hit.is_miss()) {
            self.canvas
                .draw_line(eye, to_screen(hit.point.x, hit.point.y))
                .ah()?;
        }

        let heading = position + frame.player.orientation() * HEADING_LENGTH;
        self.canvas.set_draw_color(Color::BLUE);
        self.canvas
            .fill_rect(Rect::from_center(eye, PLAYER_SIZE, PLAYER_SIZE))
            .ah()?;
        self.canvas
            .draw_line(eye, to_screen(heading.x, heading.y))
            .ah()?;

        Ok(())
    }
}

impl Surface for CanvasSurface<'_> {
    fn present(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        self.draw_view(frame)?;
        if self.minimap {
            self.draw_minimap(frame)?;
        }
        Ok(())
    }
}

/// Held keys and the game state they drive. Kept apart from the canvas so
/// key handling can be exercised without a window.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) struct Controls {
    pub intent: Intent,
    pub state: GameState,
    // where Escape came from, restored on resume
    resume_to: GameState,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            intent: Intent::default(),
            state: GameState::Playing,
            resume_to: GameState::Playing,
        }
    }
}

impl Controls {
    /// Key went down (repeats are filtered out by the caller). Returns
    /// whether the game state changed.
    pub fn key_down(&mut self, key: Keycode) -> bool {
        let before = self.state;

        if self.state == GameState::Paused {
            self.state = self.resume_to;
            // Escape toggles, every other key also does its usual job
            if key == Keycode::Escape {
                return true;
            }
        }

        match key {
            Keycode::Up | Keycode::W => self.intent.walk = 1,
            Keycode::Down | Keycode::S => self.intent.walk = -1,
            Keycode::Right | Keycode::D => self.intent.turn = 1,
            Keycode::Left | Keycode::A => self.intent.turn = -1,
            // minimap toggle
            Keycode::M => {
                self.state = if self.state == GameState::Minimap {
                    GameState::Playing
                } else {
                    GameState::Minimap
                };
            }
            // pause game
            Keycode::Escape => {
                self.intent = Intent::default();
                self.resume_to = self.state;
                self.state = GameState::Paused;
            }
            Keycode::Q => self.state = GameState::Exit,
            _ => {}
        }

        self.state != before
    }

    pub fn key_up(&mut self, key: Keycode) {
        match key {
            Keycode::Up | Keycode::W | Keycode::Down | Keycode::S => self.intent.walk = 0,
            Keycode::Right | Keycode::D | Keycode::Left | Keycode::A => self.intent.turn = 0,
            _ => {}
        }
    }
}

pub(crate) struct Game {
    controller: FrameController,
    controls: Controls,
    pub canvas: Canvas<Window>,
}

impl Game {
    pub fn new(canvas: Canvas<Window>, controller: FrameController) -> Self {
        Self {
            controller,
            controls: Controls::default(),
            canvas,
        }
    }

    pub fn config(&self) -> &Config {
        self.controller.config()
    }

    pub fn frames(&self) -> u64 {
        self.controller.frames()
    }

    pub fn state(&self) -> GameState {
        self.controls.state
    }

    fn update_title(&mut self) {
        let title = match self.controls.state {
            GameState::Paused => format!("{TITLE} - paused, press any key"),
            _ => TITLE.to_string(),
        };
        if let Err(err) = self.canvas.window_mut().set_title(&title) {
            log::warn!("could not set window title: {err}");
        }
    }

    pub fn key_down(&mut self, key: Keycode) {
        if self.controls.key_down(key) {
            log::debug!("game state is now {:?}", self.controls.state);
            self.update_title();
        }
    }

    pub fn key_up(&mut self, key: Keycode) {
        self.controls.key_up(key);
    }

    /// Advance and draw one frame, or redraw the frozen one while paused.
    pub fn draw(&mut self) -> anyhow::Result<()> {
        match self.controls.state {
            GameState::Playing | GameState::Minimap => {
                let mut surface = CanvasSurface {
                    canvas: &mut self.canvas,
                    minimap: self.controls.state == GameState::Minimap,
                };
                self.controller.tick(self.controls.intent, &mut surface)
            }
            GameState::Paused => self.pause_draw(),
            GameState::Exit => Ok(()),
        }
    }

    fn pause_draw(&mut self) -> anyhow::Result<()> {
        let frame = self.controller.frame();
        CanvasSurface {
            canvas: &mut self.canvas,
            minimap: false,
        }
        .present(&frame)?;

        self.canvas.set_blend_mode(BlendMode::Blend);
        self.canvas.set_draw_color(Color::RGBA(0, 0, 0, 0xDD));
        self.canvas.fill_rect(None).ah()?;
        self.canvas.set_blend_mode(BlendMode::None);

        Ok(())
    }
}
