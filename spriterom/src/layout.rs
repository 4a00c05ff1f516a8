//! Memory layout: where each pixel of each tile lands in the target memory.
//!
//! The encoder owns a dense buffer covering the whole address range, starts
//! every word at the fill value and then writes tile pixels at the addresses
//! produced by an [`AddressFormula`].

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{ConversionError, Result};
use crate::palette::Palette;

/// Pixel size of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGeometry {
    pub width: u32,
    pub height: u32,
}

impl TileGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        TileGeometry { width, height }
    }

    /// Number of pixels in one tile
    pub fn pixels(&self) -> usize {
        (self.width * self.height) as usize
    }
}

/// Mapping from `(tile, row, col)` to a memory address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressFormula {
    /// Tiles stored back to back: `tile * (w * h) + row * w + col`
    Linear,
    /// Hardware bit fields: `(tile << (row_bits + col_bits)) | (row << col_bits) | col`
    BitPacked { row_bits: u32, col_bits: u32 },
}

impl AddressFormula {
    /// Address of one pixel
    pub fn address(&self, geometry: TileGeometry, tile: usize, row: u32, col: u32) -> usize {
        match *self {
            AddressFormula::Linear => {
                tile * geometry.pixels() + (row * geometry.width + col) as usize
            }
            AddressFormula::BitPacked { row_bits, col_bits } => {
                (tile << (row_bits + col_bits)) | ((row as usize) << col_bits) | col as usize
            }
        }
    }

    /// Distance in words between the first pixels of consecutive tiles
    pub fn tile_stride(&self, geometry: TileGeometry) -> usize {
        match *self {
            AddressFormula::Linear => geometry.pixels(),
            AddressFormula::BitPacked { row_bits, col_bits } => 1 << (row_bits + col_bits),
        }
    }

    /// Inverse of [`address`](Self::address).
    ///
    /// Returns `None` for addresses that no pixel maps to, such as the unused
    /// columns of a bit-packed layout whose tiles are narrower than `2^col_bits`.
    pub fn locate(&self, geometry: TileGeometry, address: usize) -> Option<(usize, u32, u32)> {
        let (tile, row, col) = match *self {
            AddressFormula::Linear => {
                let offset = address % geometry.pixels();
                (
                    address / geometry.pixels(),
                    (offset / geometry.width as usize) as u32,
                    (offset % geometry.width as usize) as u32,
                )
            }
            AddressFormula::BitPacked { row_bits, col_bits } => (
                address >> (row_bits + col_bits),
                ((address >> col_bits) & ((1 << row_bits) - 1)) as u32,
                (address & ((1 << col_bits) - 1)) as u32,
            ),
        };
        (row < geometry.height && col < geometry.width).then_some((tile, row, col))
    }
}

/// What the words of a memory image hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// `(R << 16) | (G << 8) | B`
    Rgb24,
    /// Palette index
    Index,
}

/// Everything the encoder needs to know about the target memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub geometry: TileGeometry,
    pub formula: AddressFormula,
    pub depth: usize,
    pub fill_value: u32,
    pub word_bits: u32,
    pub pixel_format: PixelFormat,
}

/// Dense contents of the target memory, one word per address in `0..depth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    words: Vec<u32>,
    word_bits: u32,
    pixel_format: PixelFormat,
}

impl MemoryImage {
    /// A memory of `depth` words, all set to `fill_value`
    pub fn filled(
        depth: usize,
        fill_value: u32,
        word_bits: u32,
        pixel_format: PixelFormat,
    ) -> Self {
        MemoryImage {
            words: vec![fill_value; depth],
            word_bits,
            pixel_format,
        }
    }

    pub fn depth(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn word(&self, address: usize) -> Option<u32> {
        self.words.get(address).copied()
    }

    pub fn word_bits(&self) -> u32 {
        self.word_bits
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Hex digits needed for a full storage word
    pub fn word_digits(&self) -> usize {
        self.word_bits.div_ceil(4) as usize
    }

    /// Bytes needed for a full storage word
    pub fn word_bytes(&self) -> usize {
        self.word_bits.div_ceil(8) as usize
    }

    /// Hex digits of the meaningful part of a word
    pub fn payload_digits(&self) -> usize {
        match self.pixel_format {
            PixelFormat::Rgb24 => 6,
            PixelFormat::Index => self.word_digits(),
        }
    }

    /// Color a word stands for. Indices outside the palette (or index words
    /// without a palette) read as black.
    pub fn expand(&self, word: u32, palette: Option<&Palette>) -> Rgb {
        match self.pixel_format {
            PixelFormat::Rgb24 => Rgb::from_word(word),
            PixelFormat::Index => palette
                .and_then(|p| p.color(word as usize))
                .unwrap_or(Rgb::BLACK),
        }
    }
}

/// Widest storage word a memory image holds
pub const MAX_WORD_BITS: u32 = 32;

fn word_fits(word: u32, bits: u32) -> bool {
    bits >= 32 || word >> bits == 0
}

/// Lay out tile words in memory.
///
/// `tiles[i]` holds the row-major words of tile `i`. Every pixel is written to
/// the address given by the layout's formula; addresses no tile touches keep
/// the fill value.
pub fn encode(tiles: &[Vec<u32>], layout: &Layout) -> Result<MemoryImage> {
    let geometry = layout.geometry;
    if !(1..=MAX_WORD_BITS).contains(&layout.word_bits) {
        return Err(ConversionError::InvalidConfig(format!(
            "word width of {} bits is outside 1..={}",
            layout.word_bits, MAX_WORD_BITS
        )));
    }
    if !word_fits(layout.fill_value, layout.word_bits) {
        return Err(ConversionError::InvalidConfig(format!(
            "fill value {:#X} does not fit in a {}-bit word",
            layout.fill_value, layout.word_bits
        )));
    }

    let mut memory = MemoryImage::filled(
        layout.depth,
        layout.fill_value,
        layout.word_bits,
        layout.pixel_format,
    );

    for (tile_index, tile) in tiles.iter().enumerate() {
        if tile.len() != geometry.pixels() {
            return Err(ConversionError::InvalidConfig(format!(
                "tile {} has {} pixels, expected {}",
                tile_index,
                tile.len(),
                geometry.pixels()
            )));
        }

        for row in 0..geometry.height {
            for col in 0..geometry.width {
                let word = tile[(row * geometry.width + col) as usize];
                let address = layout.formula.address(geometry, tile_index, row, col);

                if address >= layout.depth {
                    return Err(ConversionError::AddressOverflow {
                        address,
                        depth: layout.depth,
                        tile: tile_index,
                        row,
                        col,
                    });
                }
                if !word_fits(word, layout.word_bits) {
                    return Err(ConversionError::InvalidConfig(format!(
                        "word {:#X} for tile {} does not fit in {} bits",
                        word, tile_index, layout.word_bits
                    )));
                }

                memory.words[address] = word;
            }
        }
    }

    Ok(memory)
}
