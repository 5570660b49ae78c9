use crate::error::ConfigError;
use crate::map::TileGrid;
use crate::projection::Rgb;

/// Largest accepted turn rate, a quarter turn per tick. The half-angle
/// parametrization degrades towards a half turn and overflows for huge
/// tangents.
pub const MAX_ROTATION_SPEED: f64 = 1.;

/// Session constants. Everything here is read once at start-up.
#[derive(Clone, PartialEq, Debug)]
pub struct Config {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Width of one wall strip in pixels; one ray is cast per strip.
    pub strip_width: u32,
    /// Stands in for the field of view: the view spans half-angle tangents
    /// `-1/focal_length ..= 1/focal_length`.
    pub focal_length: f64,
    /// World units per tick.
    pub move_speed: f64,
    /// Half-angle tangent per tick.
    pub rotation_speed: f64,
    pub minimap_scale: f64,
    pub target_fps: u32,
    pub ceiling: Rgb,
    pub floor: Rgb,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport_width: 960,
            viewport_height: 704,
            strip_width: 8,
            focal_length: 3.5,
            move_speed: 4.,
            rotation_speed: 0.03,
            minimap_scale: 0.25,
            target_fps: 30,
            ceiling: Rgb(0x41, 0x41, 0x41),
            floor: Rgb(0x81, 0x81, 0x81),
        }
    }
}

impl Config {
    /// Defaults with the viewport sized to the grid, one pixel per world
    /// unit.
    pub fn for_grid(grid: &TileGrid) -> Self {
        Self {
            viewport_width: grid.width().round() as u32,
            viewport_height: grid.height().round() as u32,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::EmptyViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if self.strip_width == 0 {
            return Err(ConfigError::ZeroStripWidth);
        }
        if self.strip_width > self.viewport_width {
            return Err(ConfigError::StripWiderThanViewport {
                strip: self.strip_width,
                width: self.viewport_width,
            });
        }

        for (name, value) in [
            ("focal length", self.focal_length),
            ("move speed", self.move_speed),
            ("rotation speed", self.rotation_speed),
            ("minimap scale", self.minimap_scale),
        ] {
            if !(value.is_finite() && value > 0.) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.rotation_speed > MAX_ROTATION_SPEED {
            return Err(ConfigError::RotationTooFast {
                value: self.rotation_speed,
                max: MAX_ROTATION_SPEED,
            });
        }

        Ok(())
    }

    pub fn ray_count(&self) -> usize {
        (self.viewport_width / self.strip_width.max(1)) as usize
    }

    /// Half-angle tangent of the leftmost ray relative to the view direction.
    pub fn first_ray_tangent(&self) -> f64 {
        -1. / self.focal_length
    }

    /// Half-angle tangent between neighbouring rays.
    pub fn ray_step_tangent(&self) -> f64 {
        (2. / self.focal_length) / self.ray_count().max(1) as f64
    }

    pub fn projection_plane_distance(&self) -> f64 {
        (self.viewport_width as f64 / 2.) * (self.focal_length / 2.)
    }

    /// Frame budget in milliseconds.
    pub fn frame_millis(&self) -> u64 {
        1_000 / self.target_fps.max(1) as u64
    }
}
