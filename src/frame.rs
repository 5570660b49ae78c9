use crate::config::Config;
use crate::map::{MapFile, TileGrid};
use crate::player::Player;
use crate::projection::{ColumnDescriptor, Fog, Projection};
use crate::ray::{Fan, RayHit};
use anyhow::Context;

/// Held-key state sampled once per frame. Both axes are -1, 0 or +1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Intent {
    /// +1 turns right, -1 turns left.
    pub turn: i8,
    /// +1 walks forward, -1 walks backward.
    pub walk: i8,
}

impl Intent {
    pub fn new(turn: i8, walk: i8) -> Self {
        Self {
            turn: turn.signum(),
            walk: walk.signum(),
        }
    }
}

/// Everything a drawing surface needs for one frame.
pub struct Frame<'a> {
    pub config: &'a Config,
    pub grid: &'a TileGrid,
    pub player: &'a Player,
    /// One per ray, left to right.
    pub hits: &'a [RayHit],
    /// One per ray, left to right.
    pub columns: &'a [ColumnDescriptor],
    pub fog: Option<Fog>,
}

/// Something that can show a frame: a window, a recorder in tests.
pub trait Surface {
    fn present(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;
}

/// Runs the per-frame pipeline: move the player, cast the fan, project.
pub struct FrameController {
    config: Config,
    grid: TileGrid,
    player: Player,
    projection: Projection,
    fan: Fan,
    fog: Option<Fog>,
    hits: Vec<RayHit>,
    columns: Vec<ColumnDescriptor>,
    frames: u64,
}

impl FrameController {
    pub fn new(
        config: Config,
        grid: TileGrid,
        player: Player,
        fog: Option<Fog>,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;
        if !grid.is_enclosed() {
            log::warn!("map border is not fully solid, rays may leave through the gaps");
        }

        let fan = Fan::new(
            config.first_ray_tangent(),
            config.ray_step_tangent(),
            config.ray_count(),
        );
        let projection = Projection::new(&config, &grid, fog);
        log::debug!(
            "{} rays over a {}x{} viewport, projection plane at {}",
            fan.count(),
            config.viewport_width,
            config.viewport_height,
            projection.plane_distance()
        );

        Ok(Self {
            hits: Vec::with_capacity(fan.count()),
            columns: Vec::with_capacity(fan.count()),
            config,
            grid,
            player,
            projection,
            fan,
            fog,
            frames: 0,
        })
    }

    /// Spawn the player where the map says, with speeds from `config`.
    pub fn from_map(config: Config, map: MapFile) -> anyhow::Result<Self> {
        let player = Player::new(
            map.spawn,
            map.facing,
            config.move_speed,
            config.rotation_speed,
            &map.grid,
        )
        .context("could not place player")?;
        Self::new(config, map.grid, player, map.fog)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Frames computed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Compute a frame without presenting it.
    pub fn step(&mut self, intent: Intent) -> Frame<'_> {
        self.player.update(intent.turn, intent.walk, &self.grid);

        let origin = self.player.position();
        self.fan
            .cast_all(origin, self.player.rotation(), &self.grid, &mut self.hits);
        self.projection.project(
            &self.hits,
            origin,
            self.player.orientation(),
            &mut self.columns,
        );

        self.frames += 1;
        log::trace!(
            "frame {} at {origin} facing {}",
            self.frames,
            self.player.orientation()
        );

        self.frame()
    }

    /// The most recently computed frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            config: &self.config,
            grid: &self.grid,
            player: &self.player,
            hits: &self.hits,
            columns: &self.columns,
            fog: self.fog,
        }
    }

    /// Compute a frame and hand it to `surface`.
    pub fn tick(&mut self, intent: Intent, surface: &mut impl Surface) -> anyhow::Result<()> {
        let frame = self.step(intent);
        surface.present(&frame)
    }
}
