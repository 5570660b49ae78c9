use crate::config::Config;
use crate::map::{Material, TileGrid};
use crate::ray::RayHit;
use glam::DVec2;

/// Brightness of walls hit on a horizontal grid line, relative to walls
/// hit on a vertical one.
pub const HORIZONTAL_SHADE: f64 = 200. / 255.;
pub const VERTICAL_SHADE: f64 = 1.;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn scaled(self, factor: f64) -> Self {
        let f = factor.clamp(0., 1.);
        let channel = |c: u8| (c as f64 * f).round() as u8;
        Rgb(channel(self.0), channel(self.1), channel(self.2))
    }

    /// Linear blend towards `other`; `amount` 0 keeps `self`, 1 gives `other`.
    pub fn mix(self, other: Rgb, amount: f64) -> Self {
        let a = amount.clamp(0., 1.);
        let channel = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * a).round() as u8;
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

/// Depth fog: walls fade fully into `color` at `dof` tiles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Fog {
    pub dof: u8,
    pub color: Rgb,
}

/// Full-brightness color of a wall material.
pub fn material_color(material: Material) -> Rgb {
    match material.code() {
        1 => Rgb(255, 0, 0),
        2 => Rgb(0, 255, 0),
        3 => Rgb(0, 0, 255),
        4 => Rgb(255, 255, 0),
        5 => Rgb(0, 255, 255),
        6 => Rgb(255, 0, 255),
        7 => Rgb(255, 128, 0),
        8 => Rgb(255, 255, 255),
        9 => Rgb(128, 64, 32),
        _ if material == Material::BOUNDARY => Rgb(96, 96, 96),
        _ => Rgb(160, 160, 160),
    }
}

/// One wall strip of the 3D view.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ColumnDescriptor {
    pub column: usize,
    /// Projected wall height in screen pixels, not clamped to the viewport.
    pub height: f64,
    pub material: Option<Material>,
    pub shade: f64,
    /// How far the strip is blended into the fog color, 0 to 1.
    pub fog: f64,
}

impl ColumnDescriptor {
    /// Shaded palette color; `None` for a degenerate ray.
    pub fn color(&self) -> Option<Rgb> {
        self.material
            .map(|material| material_color(material).scaled(self.shade))
    }

    /// Top and bottom pixel rows of the strip, centred on the horizon and
    /// clamped to the viewport.
    pub fn span(&self, viewport_height: u32) -> (u32, u32) {
        let horizon = viewport_height as f64 / 2.;
        let half = self.height.max(0.) / 2.;
        let top = (horizon - half).clamp(0., viewport_height as f64);
        let bottom = (horizon + half).clamp(0., viewport_height as f64);
        (top as u32, bottom as u32)
    }
}

/// Distance from `origin` to `point` measured along the unit `forward`
/// axis, which is what removes the fish-eye bulge.
pub fn perpendicular_distance(origin: DVec2, forward: DVec2, point: DVec2) -> f64 {
    (point - origin).dot(forward)
}

/// Maps ray hits to wall strips.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Projection {
    tile_size: f64,
    plane_distance: f64,
    viewport_height: f64,
    fog: Option<Fog>,
}

impl Projection {
    pub fn new(config: &Config, grid: &TileGrid, fog: Option<Fog>) -> Self {
        Self {
            tile_size: grid.tile_size(),
            plane_distance: config.projection_plane_distance(),
            viewport_height: config.viewport_height as f64,
            fog,
        }
    }

    pub fn plane_distance(&self) -> f64 {
        self.plane_distance
    }

    pub fn column(
        &self,
        column: usize,
        hit: &RayHit,
        origin: DVec2,
        forward: DVec2,
    ) -> ColumnDescriptor {
        let Some(material) = hit.material else {
            return ColumnDescriptor {
                column,
                height: 0.,
                material: None,
                shade: 0.,
                fog: 0.,
            };
        };

        let corrected = hit.perpendicular_distance(origin, forward);
        let height = if corrected > 0. {
            (self.tile_size / corrected) * self.plane_distance
        } else {
            // standing on the wall line
            self.viewport_height
        };

        let fog = self.fog.map_or(0., |fog| {
            let reach = fog.dof as f64 * self.tile_size;
            if reach > 0. {
                (hit.distance_squared(origin).sqrt() / reach).clamp(0., 1.)
            } else {
                1.
            }
        });

        ColumnDescriptor {
            column,
            height,
            material: Some(material),
            shade: if hit.vertical {
                VERTICAL_SHADE
            } else {
                HORIZONTAL_SHADE
            },
            fog,
        }
    }

    /// Project a left-to-right fan of hits into `out`, which is cleared
    /// first.
    pub fn project(
        &self,
        hits: &[RayHit],
        origin: DVec2,
        forward: DVec2,
        out: &mut Vec<ColumnDescriptor>,
    ) {
        out.clear();
        out.extend(
            hits.iter()
                .enumerate()
                .map(|(column, hit)| self.column(column, hit, origin, forward)),
        );
    }
}
