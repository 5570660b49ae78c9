//! Grid DDA ray casting.
//!
//! A ray is marched twice: once across the horizontal grid lines
//! (`y = k * tile_size`) and once across the vertical ones
//! (`x = k * tile_size`). Each march jumps straight from one line crossing
//! to the next and probes the cell just past the line; the nearer of the
//! two first solid cells is the wall the ray sees.

use crate::map::{Material, Tile, TileGrid};
use crate::vector::{unit_from_half_tangent, Rotate, RotationMatrix2};
use glam::DVec2;

/// Where a ray stopped.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RayHit {
    pub point: DVec2,
    /// `None` only for a degenerate ray that found no wall at all.
    pub material: Option<Material>,
    /// Whether the wall was hit on a vertical grid line (an east or west
    /// face).
    pub vertical: bool,
}

impl RayHit {
    /// Fallback for a ray that neither march stopped: the furthest point
    /// along the ray, clamped to the grid.
    pub fn miss(origin: DVec2, direction: DVec2, grid: &TileGrid) -> Self {
        let bounds = DVec2::new(grid.width(), grid.height());
        let reach = grid.width() + grid.height();
        Self {
            point: (origin + direction * reach).clamp(DVec2::ZERO, bounds),
            material: None,
            vertical: false,
        }
    }

    pub fn is_miss(&self) -> bool {
        self.material.is_none()
    }

    pub fn distance_squared(&self, origin: DVec2) -> f64 {
        self.point.distance_squared(origin)
    }

    /// Distance along the unit `forward` axis; see
    /// [`perpendicular_distance`](crate::projection::perpendicular_distance).
    pub fn perpendicular_distance(&self, origin: DVec2, forward: DVec2) -> f64 {
        crate::projection::perpendicular_distance(origin, forward, self.point)
    }
}

/// Which family of grid lines a march crosses.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Lines {
    /// `y = k * tile_size`
    Horizontal,
    /// `x = k * tile_size`
    Vertical,
}

impl Lines {
    /// Split a vector into (across the lines, along the lines).
    fn split(self, v: DVec2) -> (f64, f64) {
        match self {
            Lines::Horizontal => (v.y, v.x),
            Lines::Vertical => (v.x, v.y),
        }
    }

    fn join(self, across: f64, along: f64) -> DVec2 {
        match self {
            Lines::Horizontal => DVec2::new(along, across),
            Lines::Vertical => DVec2::new(across, along),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Crossing {
    point: DVec2,
    material: Material,
}

/// Walk the crossings of one line family until a solid cell or the edge of
/// the grid. `None` if the ray runs parallel to the lines or leaves the grid.
fn march(origin: DVec2, direction: DVec2, grid: &TileGrid, lines: Lines) -> Option<Crossing> {
    let (origin_across, origin_along) = lines.split(origin);
    let (dir_across, dir_along) = lines.split(direction);
    let (extent_across, extent_along) = lines.split(DVec2::new(grid.width(), grid.height()));

    // parallel to this family, the other march is definitive
    if dir_across == 0. {
        return None;
    }

    let tile = grid.tile_size();
    let forward = dir_across > 0.;
    // probe just behind a line when walking towards smaller coordinates so
    // the sample lands in the cell being entered
    let probe = if forward { 0. } else { (tile / 2.).min(1.) };

    let mut across = (origin_across / tile).floor() * tile;
    if forward {
        across += tile;
    }
    let mut along = origin_along + (across - origin_across) * dir_along / dir_across;

    let step_across = if forward { tile } else { -tile };
    // sign follows the ray, magnitude follows the slope
    let step_along = tile * dir_along / dir_across.abs();

    while (0.0..=extent_across).contains(&across) && (0.0..=extent_along).contains(&along) {
        let sample = lines.join(across - probe, along);
        if let Tile::Solid(material) = grid.content_at(sample.x, sample.y) {
            return Some(Crossing {
                point: lines.join(across, along),
                material,
            });
        }

        across += step_across;
        along += step_along;
    }

    None
}

/// Cast one ray from `origin` along the unit `direction`.
///
/// Equal distances resolve to the vertical-line hit.
pub fn cast(origin: DVec2, direction: DVec2, grid: &TileGrid) -> RayHit {
    let horizontal = march(origin, direction, grid, Lines::Horizontal);
    let vertical = march(origin, direction, grid, Lines::Vertical);

    let distance = |crossing: &Option<Crossing>| {
        crossing.map_or(f64::INFINITY, |c| c.point.distance_squared(origin))
    };

    let (crossing, was_vertical) = if distance(&vertical) <= distance(&horizontal) {
        (vertical, true)
    } else {
        (horizontal, false)
    };

    match crossing {
        Some(Crossing { point, material }) => RayHit {
            point,
            material: Some(material),
            vertical: was_vertical,
        },
        None => {
            log::warn!("ray from {origin} towards {direction} hit nothing, is the map enclosed?");
            RayHit::miss(origin, direction, grid)
        }
    }
}

/// The left-to-right fan of rays for one frame.
///
/// The first ray is the view direction turned by `first_tangent`, every
/// following one is turned by `step_tangent` more. `view` is the rotation
/// that takes `+x` to the view direction.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Fan {
    first: DVec2,
    step: RotationMatrix2,
    count: usize,
}

impl Fan {
    pub fn new(first_tangent: f64, step_tangent: f64, count: usize) -> Self {
        Self {
            first: unit_from_half_tangent(first_tangent),
            step: RotationMatrix2::from_half_tangent(step_tangent),
            count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Ray directions for the given view rotation, leftmost first.
    pub fn directions(&self, view: &RotationMatrix2) -> impl Iterator<Item = DVec2> + '_ {
        let mut direction = self.first;
        direction.rotate_by(view);
        (0..self.count).map(move |_| {
            let current = direction;
            direction.rotate_by(&self.step);
            current
        })
    }

    /// Cast every ray of the fan into `out`, which is cleared first.
    pub fn cast_all(
        &self,
        origin: DVec2,
        view: &RotationMatrix2,
        grid: &TileGrid,
        out: &mut Vec<RayHit>,
    ) {
        out.clear();
        out.extend(
            self.directions(view)
                .map(|direction| cast(origin, direction, grid)),
        );
    }
}
