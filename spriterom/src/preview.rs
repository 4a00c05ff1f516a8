//! Diagnostic views of a finished memory image.
//!
//! Nothing here feeds back into encoding; these functions only read a
//! [`MemoryImage`] and show what the hardware would display.

use image::RgbImage;
use itertools::Itertools;

use crate::color::Rgb;
use crate::layout::{Layout, MemoryImage};
use crate::palette::Palette;

/// Characters from dark to bright
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

fn ramp_char(color: Rgb) -> char {
    let index = (color.brightness() * ASCII_RAMP.len() as f32) as usize;
    ASCII_RAMP[index.min(ASCII_RAMP.len() - 1)] as char
}

/// ASCII art of the image, `columns` words per line
pub fn ascii_art(image: &MemoryImage, palette: Option<&Palette>, columns: usize) -> String {
    image
        .words()
        .chunks(columns.max(1))
        .map(|row| {
            row.iter()
                .map(|word| ramp_char(image.expand(*word, palette)))
                .collect::<String>()
        })
        .join("\n")
}

/// The first `rows` lines of an index grid as `RRGGBB` strings, at most
/// `max_columns` per line, for checking indices against the palette by eye
pub fn hex_sample(
    image: &MemoryImage,
    palette: &Palette,
    columns: usize,
    rows: usize,
    max_columns: usize,
) -> Vec<String> {
    image
        .words()
        .chunks(columns.max(1))
        .take(rows)
        .map(|row| {
            let mut line = row
                .iter()
                .take(max_columns)
                .map(|word| image.expand(*word, Some(palette)).to_hex())
                .join(" ");
            if row.len() > max_columns {
                line.push_str("...");
            }
            line
        })
        .collect()
}

/// Reassemble the first `tile_count` tiles of the memory into one picture,
/// `tiles_per_row` tiles across.
///
/// Pixels are fetched through the layout's address formula, the same way the
/// video core reads its tile memory. Pixels whose address lies past the end of
/// the memory are drawn black.
pub fn render_tiles(
    image: &MemoryImage,
    layout: &Layout,
    palette: Option<&Palette>,
    tile_count: usize,
    tiles_per_row: usize,
) -> RgbImage {
    let geometry = layout.geometry;
    let tiles_per_row = tiles_per_row.clamp(1, tile_count.max(1));
    let tile_rows = tile_count.div_ceil(tiles_per_row).max(1);

    RgbImage::from_fn(
        geometry.width * tiles_per_row as u32,
        geometry.height * tile_rows as u32,
        |x, y| {
            let tile_row = (y / geometry.height) as usize;
            let tile = tile_row * tiles_per_row + (x / geometry.width) as usize;
            let row = y % geometry.height;
            let col = x % geometry.width;

            let color = if tile < tile_count {
                let address = layout.formula.address(geometry, tile, row, col);
                image
                    .word(address)
                    .map(|word| image.expand(word, palette))
                    .unwrap_or(Rgb::BLACK)
            } else {
                Rgb::BLACK
            };
            color.into()
        },
    )
}
