//! Error type shared by every stage of the conversion pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during image conversion
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Palette {0} contains no valid colors")]
    EmptyPalette(String),

    #[error("Palette has {colors} colors but a {bits}-bit word can only index {capacity}")]
    PaletteTooLarge {
        colors: usize,
        bits: u32,
        capacity: usize,
    },

    #[error("Image {path} is {width}x{height}, expected {expected_width}x{expected_height}")]
    GeometryMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Not enough tiles in tile sheet: found {found}, need {needed}")]
    InsufficientTiles { found: usize, needed: usize },

    #[error(
        "Address {address} for tile {tile} row {row} col {col} is outside memory depth {depth}"
    )]
    AddressOverflow {
        address: usize,
        depth: usize,
        tile: usize,
        row: u32,
        col: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConversionError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConversionError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ConversionError> = std::result::Result<T, E>;
