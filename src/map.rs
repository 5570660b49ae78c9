use crate::error::MapError;
use crate::projection::{Fog, Rgb};
use glam::DVec2;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::num::NonZeroU8;
use std::path::Path;

/// Map shipped with the binary, used when no `--map` is given.
pub const DEFAULT_MAP: &str = include_str!("../map/default.map");

pub const DEFAULT_TILE_SIZE: f64 = 64.;

fn parse_hex_color(hex: &str) -> Result<Rgb, MapError> {
    let bad = || MapError::HexColor(hex.into());
    if hex.len() != 7
        || !hex.starts_with('#')
        || !hex[1..].bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(bad());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    Ok(Rgb(
        channel(1..3).map_err(|_| bad())?,
        channel(3..5).map_err(|_| bad())?,
        channel(5..7).map_err(|_| bad())?,
    ))
}

/// Wall class of a solid tile. Never zero; `255` is reserved for
/// [`Material::BOUNDARY`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Material(NonZeroU8);

impl Material {
    /// What everything outside the grid is made of.
    pub const BOUNDARY: Self = Self(NonZeroU8::MAX);

    pub fn new(code: u8) -> Option<Self> {
        NonZeroU8::new(code).map(Self)
    }

    pub fn code(self) -> u8 {
        self.0.get()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Solid(Material),
}

impl Tile {
    pub fn from_code(code: u8) -> Self {
        match Material::new(code) {
            Some(material) => Tile::Solid(material),
            None => Tile::Empty,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Solid(material) => material.code(),
        }
    }

    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid(_))
    }

    pub fn material(self) -> Option<Material> {
        match self {
            Tile::Empty => None,
            Tile::Solid(material) => Some(material),
        }
    }
}

/// Immutable grid of square tiles. World space spans
/// `[0, cols * tile_size) × [0, rows * tile_size)`; everything outside it
/// is solid.
#[derive(Clone, PartialEq, Debug)]
pub struct TileGrid {
    tile_size: f64,
    cols: usize,
    rows: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build a grid from authored material codes, one inner `Vec` per row.
    pub fn new(tile_size: f64, rows: Vec<Vec<u8>>) -> Result<Self, MapError> {
        if !(tile_size.is_finite() && tile_size > 0.) {
            return Err(MapError::TileSize(tile_size));
        }

        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(cols * rows.len());
        for (row, codes) in rows.iter().enumerate() {
            if codes.len() != cols {
                return Err(MapError::Ragged {
                    row,
                    found: codes.len(),
                    expected: cols,
                });
            }

            for &code in codes {
                if code == Material::BOUNDARY.code() {
                    return Err(MapError::ReservedMaterial(code));
                }
                tiles.push(Tile::from_code(code));
            }
        }

        Ok(Self {
            tile_size,
            cols,
            rows: rows.len(),
            tiles,
        })
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// World-space width.
    pub fn width(&self) -> f64 {
        self.cols as f64 * self.tile_size
    }

    /// World-space height.
    pub fn height(&self) -> f64 {
        self.rows as f64 * self.tile_size
    }

    /// Tile by cell index; `None` outside the grid.
    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.tiles.get(row * self.cols + col).copied()
    }

    /// Cell containing a world point. Uses floor division, so `-0.5` is in
    /// cell `-1` (outside) rather than cell `0`.
    fn cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = (x / self.tile_size).floor();
        let row = (y / self.tile_size).floor();

        // written so that NaN falls through to `None`
        if col >= 0. && row >= 0. && col < self.cols as f64 && row < self.rows as f64 {
            Some((col as usize, row as usize))
        } else {
            None
        }
    }

    pub fn content_at(&self, x: f64, y: f64) -> Tile {
        self.cell(x, y)
            .and_then(|(col, row)| self.tile(col, row))
            .unwrap_or(Tile::Solid(Material::BOUNDARY))
    }

    pub fn is_solid_at(&self, x: f64, y: f64) -> bool {
        self.content_at(x, y).is_solid()
    }

    /// World-space top left corner of a cell.
    pub fn cell_origin(&self, col: usize, row: usize) -> DVec2 {
        DVec2::new(col as f64, row as f64) * self.tile_size
    }

    /// World-space centre of a cell.
    pub fn cell_center(&self, col: usize, row: usize) -> DVec2 {
        self.cell_origin(col, row) + DVec2::splat(self.tile_size / 2.)
    }

    /// Every cell as `(col, row, tile)`, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(idx, tile)| (idx % self.cols, idx / self.cols, *tile))
    }

    /// Whether every cell on the outer ring is solid.
    pub fn is_enclosed(&self) -> bool {
        self.tiles().all(|(col, row, tile)| {
            let border = col == 0 || row == 0 || col + 1 == self.cols || row + 1 == self.rows;
            !border || tile.is_solid()
        })
    }
}

/// A parsed map file: the grid plus where and how the player starts.
///
/// The format is a sequence of sections, each opened by a directive line
/// and closed by a blank line:
///
/// ```text
/// !!!!META
/// tile,size=64
/// facing,x=0,y=1
/// fog,dof=8,color=#000000
///
/// !!!!MAIN
/// 11111
/// 1*001
/// 11111
/// ```
///
/// In `MAIN`, `0`, `.` and space are empty, `1`-`9` are wall materials and
/// `*` is the (empty) spawn cell.
#[derive(Clone, PartialEq, Debug)]
pub struct MapFile {
    pub grid: TileGrid,
    pub spawn: DVec2,
    pub facing: DVec2,
    pub fog: Option<Fog>,
}

#[derive(Default)]
struct MapBuilder {
    tile_size: Option<f64>,
    facing: Option<DVec2>,
    fog: Option<Fog>,
    rows: Vec<Vec<u8>>,
    spawn: Option<(usize, usize)>,
}

impl MapFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        log::info!("loading map at {}", path.display());
        Self::parse(&read_to_string(path)?)
    }

    /// The map embedded in the crate.
    pub fn builtin() -> Result<Self, MapError> {
        Self::parse(DEFAULT_MAP)
    }

    pub fn parse(src: &str) -> Result<Self, MapError> {
        let mut lines = src.lines();
        let mut builder = MapBuilder::default();

        while let Some(line) = lines.by_ref().next() {
            match line.trim_end() {
                "" => continue,
                "!!!!META" => builder.parse_meta(&mut lines)?,
                "!!!!MAIN" => builder.parse_main(&mut lines)?,
                other => return Err(MapError::UnknownDirective(other.into())),
            }
        }

        builder.build()
    }
}

impl MapBuilder {
    fn parse_meta<'lines>(
        &mut self,
        lines: impl Iterator<Item = &'lines str>,
    ) -> Result<(), MapError> {
        for line in lines {
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }

            let malformed = || MapError::MalformedMeta(line.into());
            let mut chunks = line.split(',');
            let directive = chunks.next().unwrap_or_default();
            let params = chunks
                .map(|param| param.split_once('='))
                .collect::<Option<HashMap<_, _>>>()
                .ok_or_else(malformed)?;
            let float = |key: &str| -> Result<Option<f64>, MapError> {
                params
                    .get(key)
                    .map(|value| value.trim().parse::<f64>().map_err(|_| malformed()))
                    .transpose()
            };

            match directive {
                "tile" => {
                    self.tile_size = Some(float("size")?.ok_or_else(malformed)?);
                }
                "facing" => {
                    let facing = DVec2::new(
                        float("x")?.unwrap_or_default(),
                        float("y")?.unwrap_or_default(),
                    );
                    self.facing = Some(facing);
                }
                "fog" => {
                    self.fog = Some(Fog {
                        dof: params
                            .get("dof")
                            .unwrap_or(&"4")
                            .trim()
                            .parse()
                            .map_err(|_| malformed())?,
                        color: parse_hex_color(params.get("color").unwrap_or(&"#000000"))?,
                    });
                }
                other => return Err(MapError::UnknownMeta(other.into())),
            }
        }

        Ok(())
    }

    fn parse_main<'lines>(
        &mut self,
        lines: impl Iterator<Item = &'lines str>,
    ) -> Result<(), MapError> {
        for line in lines {
            if line.is_empty() {
                break;
            }

            let row = self.rows.len();
            let mut codes = Vec::with_capacity(line.len());
            for (col, tile) in line.chars().enumerate() {
                codes.push(match tile {
                    ' ' | '.' | '0' => 0,
                    '*' => {
                        if self.spawn.replace((col, row)).is_some() {
                            return Err(MapError::DuplicateSpawn);
                        }
                        0
                    }
                    '1'..='9' => tile as u8 - b'0',
                    other => return Err(MapError::InvalidTile(other)),
                });
            }
            self.rows.push(codes);
        }

        Ok(())
    }

    fn build(self) -> Result<MapFile, MapError> {
        let grid = TileGrid::new(self.tile_size.unwrap_or(DEFAULT_TILE_SIZE), self.rows)?;
        let (col, row) = self.spawn.ok_or(MapError::NoSpawn)?;
        let facing = self.facing.unwrap_or(DVec2::Y).normalize_or_zero();
        if facing == DVec2::ZERO {
            return Err(MapError::ZeroFacing);
        }

        log::debug!(
            "parsed {}x{} map, tile size {}, spawn cell ({col}, {row})",
            grid.cols(),
            grid.rows(),
            grid.tile_size()
        );

        Ok(MapFile {
            spawn: grid.cell_center(col, row),
            grid,
            facing,
            fog: self.fog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> TileGrid {
        TileGrid::new(64., vec![vec![1, 1, 1], vec![1, 0, 2], vec![1, 3, 1]]).unwrap()
    }

    #[test]
    fn content_round_trips_authored_grid() {
        let authored = vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 4, 1],
            vec![1, 0, 9, 0, 1],
            vec![1, 1, 1, 1, 1],
        ];
        let grid = TileGrid::new(16., authored.clone()).unwrap();

        for (row, codes) in authored.iter().enumerate() {
            for (col, &code) in codes.iter().enumerate() {
                let centre = grid.cell_center(col, row);
                let corner = grid.cell_origin(col, row);
                let far_corner = corner + DVec2::splat(15.999);
                for point in [centre, corner, far_corner] {
                    let tile = grid.content_at(point.x, point.y);
                    assert_eq!(tile.code(), code, "cell ({col}, {row}) at {point}");
                    assert_eq!(tile.is_solid(), code != 0);
                }
            }
        }
    }

    #[test]
    fn out_of_bounds_is_boundary() {
        let grid = ring();
        let boundary = Tile::Solid(Material::BOUNDARY);
        for (x, y) in [
            (-0.5, 10.),
            (10., -0.5),
            (-64., -64.),
            (192., 10.),
            (10., 192.),
            (1e9, 1e9),
            (f64::NAN, 10.),
            (f64::INFINITY, 10.),
        ] {
            assert_eq!(grid.content_at(x, y), boundary, "({x}, {y})");
            assert!(grid.is_solid_at(x, y));
        }
    }

    #[test]
    fn floor_division_for_negative_coordinates() {
        // truncation would map -0.5 into cell 0, which is empty here
        let grid = TileGrid::new(1., vec![vec![0, 0], vec![0, 0]]).unwrap();
        assert_eq!(grid.content_at(0., 0.), Tile::Empty);
        assert_eq!(grid.content_at(-0.5, 0.5), Tile::Solid(Material::BOUNDARY));
        assert_eq!(grid.content_at(0.5, -0.5), Tile::Solid(Material::BOUNDARY));
        assert_eq!(grid.content_at(-0., 0.), Tile::Empty);
    }

    #[test]
    fn grid_line_belongs_to_the_cell_after_it() {
        let grid = ring();
        // x = 64 is the left edge of column 1
        assert_eq!(grid.content_at(64., 100.), Tile::Empty);
        assert_eq!(grid.content_at(63.999, 100.), Tile::from_code(1));
        assert_eq!(grid.content_at(128., 100.), Tile::from_code(2));
        // the far edge of the grid is already outside
        assert_eq!(grid.content_at(192., 100.), Tile::Solid(Material::BOUNDARY));
    }

    #[test]
    fn dimensions() {
        let grid = ring();
        assert_eq!((grid.cols(), grid.rows()), (3, 3));
        assert_eq!(grid.width(), 192.);
        assert_eq!(grid.height(), 192.);
        assert!(grid.is_enclosed());
        assert_eq!(grid.tiles().count(), 9);
        assert_eq!(grid.tile(1, 2), Some(Tile::from_code(3)));
        assert_eq!(grid.tile(3, 0), None);

        let open = TileGrid::new(1., vec![vec![1, 1], vec![0, 1]]).unwrap();
        assert!(!open.is_enclosed());
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(matches!(TileGrid::new(64., vec![]), Err(MapError::Empty)));
        assert!(matches!(TileGrid::new(64., vec![vec![]]), Err(MapError::Empty)));
        assert!(matches!(
            TileGrid::new(64., vec![vec![1, 1], vec![1]]),
            Err(MapError::Ragged {
                row: 1,
                found: 1,
                expected: 2
            })
        ));
        assert!(matches!(
            TileGrid::new(0., vec![vec![1]]),
            Err(MapError::TileSize(_))
        ));
        assert!(matches!(
            TileGrid::new(64., vec![vec![255]]),
            Err(MapError::ReservedMaterial(255))
        ));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#102030").unwrap(), Rgb(0x10, 0x20, 0x30));
        assert_eq!(parse_hex_color("#ffFFff").unwrap(), Rgb(255, 255, 255));
        for bad in ["102030", "#12345", "#1234567", "#gg0000", "#00é00", "#+f+f+f", "#-10000"] {
            assert!(matches!(parse_hex_color(bad), Err(MapError::HexColor(_))), "{bad}");
        }
    }

    #[test]
    fn parses_map_file() {
        let map = MapFile::parse(
            "!!!!META\ntile,size=32\nfacing,x=-2,y=0\nfog,dof=6,color=#112233\n\n!!!!MAIN\n1111\n1*.1\n1 51\n1111\n",
        )
        .unwrap();

        assert_eq!(map.grid.tile_size(), 32.);
        assert_eq!((map.grid.cols(), map.grid.rows()), (4, 4));
        assert_eq!(map.spawn, DVec2::new(48., 48.));
        assert_eq!(map.facing, DVec2::new(-1., 0.));
        assert_eq!(
            map.fog,
            Some(Fog {
                dof: 6,
                color: Rgb(0x11, 0x22, 0x33)
            })
        );
        assert_eq!(map.grid.tile(2, 2), Some(Tile::from_code(5)));
        assert_eq!(map.grid.tile(1, 2), Some(Tile::Empty));
    }

    #[test]
    fn signed_fog_color_is_rejected() {
        let result = MapFile::parse("!!!!META\nfog,color=#+f+f+f\n\n!!!!MAIN\n111\n1*1\n111\n");
        assert!(matches!(result, Err(MapError::HexColor(_))));
    }

    #[test]
    fn map_file_defaults() {
        let map = MapFile::parse("!!!!MAIN\n111\n1*1\n111").unwrap();
        assert_eq!(map.grid.tile_size(), DEFAULT_TILE_SIZE);
        assert_eq!(map.facing, DVec2::Y);
        assert_eq!(map.fog, None);
    }

    #[test]
    fn map_file_errors() {
        let cases: [(&str, fn(&MapError) -> bool); 8] = [
            ("!!!!NOPE\n", |e| matches!(e, MapError::UnknownDirective(_))),
            ("!!!!META\nsky,color=#000000\n", |e| {
                matches!(e, MapError::UnknownMeta(_))
            }),
            ("!!!!META\ntile,64\n", |e| matches!(e, MapError::MalformedMeta(_))),
            ("!!!!META\nfog,color=black\n", |e| matches!(e, MapError::HexColor(_))),
            ("!!!!MAIN\n1x1\n", |e| matches!(e, MapError::InvalidTile('x'))),
            ("!!!!MAIN\n***\n", |e| matches!(e, MapError::DuplicateSpawn)),
            ("!!!!MAIN\n111\n101\n111\n", |e| matches!(e, MapError::NoSpawn)),
            ("!!!!META\nfacing,x=0,y=0\n\n!!!!MAIN\n*\n", |e| {
                matches!(e, MapError::ZeroFacing)
            }),
        ];

        for (src, check) in cases {
            let err = MapFile::parse(src).unwrap_err();
            assert!(check(&err), "{src:?} gave {err}");
        }
    }

    #[test]
    fn builtin_map_is_enclosed() {
        let map = MapFile::builtin().unwrap();
        assert_eq!((map.grid.cols(), map.grid.rows()), (15, 11));
        assert!(map.grid.is_enclosed());
        assert_eq!(map.spawn, DVec2::new(480., 96.));
        assert!(!map.grid.is_solid_at(map.spawn.x, map.spawn.y));
    }
}
