use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map has no tiles")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("tile size must be positive and finite, got {0}")]
    TileSize(f64),

    #[error("material code {0} is reserved for the map boundary")]
    ReservedMaterial(u8),

    #[error("invalid tile in map: {0:?}")]
    InvalidTile(char),

    #[error("unrecognized directive: {0}")]
    UnknownDirective(String),

    #[error("unrecognized meta directive: {0}")]
    UnknownMeta(String),

    #[error("incorrectly formatted meta: {0}")]
    MalformedMeta(String),

    #[error("not a hex string: {0}")]
    HexColor(String),

    #[error("more than one spawn in map")]
    DuplicateSpawn,

    #[error("no spawn in map")]
    NoSpawn,

    #[error("spawn at ({x}, {y}) is inside a solid tile")]
    SolidSpawn { x: f64, y: f64 },

    #[error("facing direction must be a non-zero vector")]
    ZeroFacing,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("strip width must be at least one pixel")]
    ZeroStripWidth,

    #[error("strip width {strip} is wider than the viewport ({width})")]
    StripWiderThanViewport { strip: u32, width: u32 },

    #[error("viewport must not be empty ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("rotation speed {value} is above the limit of {max} per tick")]
    RotationTooFast { value: f64, max: f64 },
}
