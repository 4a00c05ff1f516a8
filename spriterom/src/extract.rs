//! Tile and sprite extraction from source images.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use log::{debug, info, warn};
use serde::Serialize;

use crate::color::Rgb;
use crate::config::{Config, ExtractMode, ResizeFilter, Source};
use crate::error::{ConversionError, Result};

/// Represents a single tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    /// Position of the tile in memory order
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Row-major pixels, always `width * height` of them
    pub pixels: Vec<Rgb>,
    /// Image the tile was cut from
    pub source: PathBuf,
}

impl Tile {
    /// Copy a `width x height` block starting at `(x0, y0)`
    fn from_region(
        img: &RgbImage,
        index: usize,
        (x0, y0): (u32, u32),
        (width, height): (u32, u32),
        source: &Path,
    ) -> Self {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(Rgb::from(*img.get_pixel(x0 + x, y0 + y)));
            }
        }

        Tile {
            index,
            width,
            height,
            pixels,
            source: source.to_path_buf(),
        }
    }

    pub fn pixel(&self, row: u32, col: u32) -> Rgb {
        self.pixels[(row * self.width + col) as usize]
    }

    /// Pixels one row at a time
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.width as usize)
    }
}

/// Decode an image as RGB, optionally resizing it first. Alpha is dropped.
pub fn read_image(path: &Path, resize: Option<(ResizeFilter, u32, u32)>) -> Result<RgbImage> {
    let img: DynamicImage = image::open(path).map_err(|source| ConversionError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let img = match resize {
        Some((filter, width, height)) if img.width() != width || img.height() != height => {
            debug!(
                "Resizing {} from {}x{} to {}x{}",
                path.display(),
                img.width(),
                img.height(),
                width,
                height
            );
            img.resize_exact(width, height, filter.into())
        }
        _ => img,
    };

    Ok(img.to_rgb8())
}

/// Cut the first `count` tiles out of a sheet, row-major.
///
/// Partial tiles along the right and bottom edges are ignored.
pub fn tiles_from_sheet(
    img: &RgbImage,
    source: &Path,
    tile_width: u32,
    tile_height: u32,
    count: usize,
) -> Result<Vec<Tile>> {
    let tiles_x = img.width() / tile_width;
    let tiles_y = img.height() / tile_height;
    let found = (tiles_x * tiles_y) as usize;

    if found < count {
        return Err(ConversionError::InsufficientTiles {
            found,
            needed: count,
        });
    }

    Ok((0..count)
        .map(|index| {
            let tx = index as u32 % tiles_x;
            let ty = index as u32 / tiles_x;
            Tile::from_region(
                img,
                index,
                (tx * tile_width, ty * tile_height),
                (tile_width, tile_height),
                source,
            )
        })
        .collect())
}

/// List the PNG files of a directory in name order, keeping at most `max`
pub fn sprite_files(dir: &Path, max: usize) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ConversionError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConversionError::io(dir, e))?.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if files.len() > max {
        for ignored in &files[max..] {
            warn!(
                "Ignoring {}: only {} sprites fit in memory",
                ignored.display(),
                max
            );
        }
        files.truncate(max);
    }

    Ok(files)
}

/// Build the tile for sprite `index` from a decoded sprite file
pub fn tile_from_sprite(
    img: &RgbImage,
    path: &Path,
    index: usize,
    config: &Config,
) -> Result<Tile> {
    if img.width() != config.sprite_width || img.height() != config.sprite_height {
        return Err(ConversionError::GeometryMismatch {
            path: path.to_path_buf(),
            width: img.width(),
            height: img.height(),
            expected_width: config.sprite_width,
            expected_height: config.sprite_height,
        });
    }

    let size = match config.extract_mode {
        ExtractMode::Full => (config.sprite_width, config.sprite_height),
        ExtractMode::TopLeftBlock => (config.tile_width, config.tile_height),
    };
    Ok(Tile::from_region(img, index, (0, 0), size, path))
}

/// Extract the tiles named by the configuration, in memory order
pub fn extract(config: &Config) -> Result<Vec<Tile>> {
    match &config.source {
        Source::Sheet { path } => {
            let resize = config
                .resize
                .map(|filter| (filter, config.tile_width, config.tile_height));
            let img = read_image(path, resize)?;
            let tiles = tiles_from_sheet(
                &img,
                path,
                config.tile_width,
                config.tile_height,
                config.tile_count,
            )?;
            info!(
                "Extracted {} {}x{} tiles from {}",
                tiles.len(),
                config.tile_width,
                config.tile_height,
                path.display()
            );
            Ok(tiles)
        }
        Source::Directory { path } => {
            let files = sprite_files(path, config.tile_count)?;
            info!(
                "Found {} sprites in {}. Filling remaining with fill value.",
                files.len(),
                path.display()
            );

            let resize = config
                .resize
                .map(|filter| (filter, config.sprite_width, config.sprite_height));
            files
                .iter()
                .enumerate()
                .map(|(index, file)| {
                    let img = read_image(file, resize)?;
                    tile_from_sprite(&img, file, index, config)
                })
                .collect()
        }
    }
}
