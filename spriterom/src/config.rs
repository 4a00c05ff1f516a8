//! Run configuration.
//!
//! Every geometry and memory constant is declared here up front, never derived
//! from the size of the input images, so the address layout of a run is fully
//! determined before any pixel is read.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};
use crate::format::OutputFormat;
use crate::layout::{AddressFormula, Layout, PixelFormat, TileGeometry, MAX_WORD_BITS};

/// Where the tiles come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// One image cut into a grid of tiles, row-major
    Sheet { path: PathBuf },
    /// A directory of PNG files, one sprite per file, sorted by name
    Directory { path: PathBuf },
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Source::Sheet { path } | Source::Directory { path } => path,
        }
    }

    /// Same kind of source, different location
    pub fn with_path(&self, path: PathBuf) -> Self {
        match self {
            Source::Sheet { .. } => Source::Sheet { path },
            Source::Directory { .. } => Source::Directory { path },
        }
    }
}

/// Which part of a sprite file becomes the tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// The whole sprite; sprite and tile sizes must be equal
    #[default]
    Full,
    /// Only the `tile_width x tile_height` block in the top-left corner
    TopLeftBlock,
}

/// Resampling filter used when resizing sources to the declared geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Named configurations for the memories of the video core
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Sprite ROM: up to 16 sprite files, top-left 8x8 block of each 32x32
    /// file, 32-bit RGB words, `(sprite << 6) | (y << 3) | x`
    Sprites,
    /// Tile ROM: 256 8x8 tiles from a sheet, 32-bit RGB words, MIF output
    TileSheet,
    /// One 32x32 image quantized to a fixed palette, 8-bit indices
    PaletteTile,
}

/// Configuration for the image conversion process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input image or sprite directory
    pub source: Source,
    /// Palette file; when set, words hold palette indices instead of RGB
    pub palette_file: Option<PathBuf>,
    /// Output memory image path
    pub output_file: PathBuf,
    /// Output JSON report path (optional)
    pub output_json: Option<PathBuf>,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Required width of each sprite file (directory sources)
    pub sprite_width: u32,
    /// Required height of each sprite file (directory sources)
    pub sprite_height: u32,
    /// Which part of each sprite file is stored
    pub extract_mode: ExtractMode,
    /// Tiles taken from a sheet, or the maximum number of sprite files
    pub tile_count: usize,
    /// Resize sources to the declared geometry before extraction
    pub resize: Option<ResizeFilter>,
    /// Number of words in the target memory
    pub depth: usize,
    /// Storage width of one memory word in bits
    pub word_width_bits: u32,
    /// Value of every word no tile writes
    pub fill_value: u32,
    /// Address of each tile pixel
    pub address_formula: AddressFormula,
    /// Serialization of the memory image
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config::preset(Preset::Sprites)
    }
}

impl Config {
    /// Configuration of one of the known memories
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Sprites => Config {
                source: Source::Directory {
                    path: "images".into(),
                },
                palette_file: None,
                output_file: "sprites.hex".into(),
                output_json: None,
                tile_width: 8,
                tile_height: 8,
                sprite_width: 32,
                sprite_height: 32,
                extract_mode: ExtractMode::TopLeftBlock,
                tile_count: 16,
                resize: None,
                depth: 49152,
                word_width_bits: 32,
                fill_value: 0,
                address_formula: AddressFormula::BitPacked {
                    row_bits: 3,
                    col_bits: 3,
                },
                output_format: OutputFormat::Hex,
            },
            Preset::TileSheet => Config {
                source: Source::Sheet {
                    path: "tilesheet.png".into(),
                },
                palette_file: None,
                output_file: "img_table.mif".into(),
                output_json: None,
                tile_width: 8,
                tile_height: 8,
                sprite_width: 8,
                sprite_height: 8,
                extract_mode: ExtractMode::Full,
                tile_count: 256,
                resize: None,
                depth: 256 * 8 * 8,
                word_width_bits: 32,
                fill_value: 0,
                address_formula: AddressFormula::Linear,
                output_format: OutputFormat::Mif,
            },
            Preset::PaletteTile => Config {
                source: Source::Sheet {
                    path: "tile.png".into(),
                },
                palette_file: Some("palette.hex".into()),
                output_file: "tile_palette.hex".into(),
                output_json: None,
                tile_width: 32,
                tile_height: 32,
                sprite_width: 32,
                sprite_height: 32,
                extract_mode: ExtractMode::Full,
                tile_count: 1,
                resize: Some(ResizeFilter::Lanczos3),
                depth: 32 * 32,
                word_width_bits: 8,
                fill_value: 0,
                address_formula: AddressFormula::Linear,
                output_format: OutputFormat::IndexGrid { columns: 32 },
            },
        }
    }

    /// Read a JSON configuration.
    ///
    /// Missing fields take the values of the `sprites` preset. That preset
    /// extracts the top-left block of each file, so a config with a `sheet`
    /// source must set `"extract_mode": "full"` explicitly.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| ConversionError::io(path, e))?;
        let config: Config = serde_json::from_slice(&bytes)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get the number of pixels in a single tile
    pub fn tile_size(&self) -> usize {
        (self.tile_width * self.tile_height) as usize
    }

    pub fn geometry(&self) -> TileGeometry {
        TileGeometry::new(self.tile_width, self.tile_height)
    }

    /// What the memory words hold
    pub fn pixel_format(&self) -> PixelFormat {
        if self.palette_file.is_some() {
            PixelFormat::Index
        } else {
            PixelFormat::Rgb24
        }
    }

    /// Memory layout described by this configuration
    pub fn layout(&self) -> Layout {
        Layout {
            geometry: self.geometry(),
            formula: self.address_formula,
            depth: self.depth,
            fill_value: self.fill_value,
            word_bits: self.word_width_bits,
            pixel_format: self.pixel_format(),
        }
    }

    /// Number of index values a memory word can hold
    pub fn index_capacity(&self) -> usize {
        1usize << self.word_width_bits.min(usize::BITS - 1)
    }

    /// Check that the constants describe a consistent memory
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ConversionError::InvalidConfig(msg));

        if self.tile_width == 0 || self.tile_height == 0 {
            return invalid(format!(
                "tile size {}x{} must not be empty",
                self.tile_width, self.tile_height
            ));
        }
        if self.tile_count == 0 {
            return invalid("tile count must be at least 1".to_string());
        }
        if self.depth == 0 {
            return invalid("memory depth must be at least 1".to_string());
        }
        if !(1..=MAX_WORD_BITS).contains(&self.word_width_bits) {
            return invalid(format!(
                "word width {} must be between 1 and {} bits",
                self.word_width_bits, MAX_WORD_BITS
            ));
        }
        if self.pixel_format() == PixelFormat::Rgb24 && self.word_width_bits < 24 {
            return invalid(format!(
                "RGB words need 24 bits, word width is {}",
                self.word_width_bits
            ));
        }

        if let AddressFormula::BitPacked { row_bits, col_bits } = self.address_formula {
            if row_bits + col_bits >= usize::BITS {
                return invalid(format!("{} address bits is too many", row_bits + col_bits));
            }
            if (self.tile_width as u64) > 1 << col_bits || (self.tile_height as u64) > 1 << row_bits
            {
                return invalid(format!(
                    "{}x{} tiles do not fit in {} column bits and {} row bits",
                    self.tile_width, self.tile_height, col_bits, row_bits
                ));
            }
        }

        if let OutputFormat::IndexGrid { columns: 0 } = self.output_format {
            return invalid("index grid needs at least one column".to_string());
        }

        match &self.source {
            Source::Sheet { .. } => {
                if self.extract_mode != ExtractMode::Full {
                    return invalid(format!(
                        "tile sheets are always extracted in full, but extract_mode is {:?}; \
                         set \"extract_mode\": \"full\" (the sprites preset default is \
                         top_left_block)",
                        self.extract_mode
                    ));
                }
                if self.resize.is_some() && self.tile_count != 1 {
                    return invalid(
                        "resizing a tile sheet is only supported for a single tile".to_string(),
                    );
                }
            }
            Source::Directory { .. } => match self.extract_mode {
                ExtractMode::Full => {
                    if self.sprite_width != self.tile_width
                        || self.sprite_height != self.tile_height
                    {
                        return invalid(format!(
                            "full extraction needs {}x{} sprites to match {}x{} tiles",
                            self.sprite_width,
                            self.sprite_height,
                            self.tile_width,
                            self.tile_height
                        ));
                    }
                }
                ExtractMode::TopLeftBlock => {
                    if self.sprite_width < self.tile_width
                        || self.sprite_height < self.tile_height
                    {
                        return invalid(format!(
                            "{}x{} sprites are smaller than the {}x{} block",
                            self.sprite_width,
                            self.sprite_height,
                            self.tile_width,
                            self.tile_height
                        ));
                    }
                }
            },
        }

        Ok(())
    }
}
