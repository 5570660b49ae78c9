//! Grid ray caster with trigonometry-free rotation.
//!
//! Each frame the player is moved, one ray per screen column is marched
//! through a [`TileGrid`](map::TileGrid), and every hit is projected into a
//! wall strip. Drawing is left to a [`Surface`](frame::Surface).

pub mod config;
pub mod error;
pub mod frame;
pub mod map;
pub mod player;
pub mod projection;
pub mod ray;
pub mod vector;

pub use config::Config;
pub use error::{ConfigError, MapError};
pub use frame::{Frame, FrameController, Intent, Surface};
pub use map::{MapFile, Material, Tile, TileGrid};
pub use player::Player;
pub use projection::{ColumnDescriptor, Fog, Projection, Rgb};
pub use ray::{cast, Fan, RayHit};
pub use vector::{unit_from_half_tangent, Rotate, RotationMatrix2};
