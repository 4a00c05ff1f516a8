//! Fixed color palettes and nearest-color quantization.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::color::Rgb;
use crate::error::{ConversionError, Result};
use crate::hextext;

/// Represents an ordered palette of colors.
///
/// The position of a color is its identity: duplicates are allowed and the
/// palette is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Build a palette from a list of colors
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        if colors.is_empty() {
            return Err(ConversionError::EmptyPalette("<inline>".to_string()));
        }
        Ok(Palette { colors })
    }

    /// Read a palette file.
    ///
    /// Format expected: `RR GG BB [ignored...]` per line, `//` comments.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConversionError::io(path, e))?;
        let palette = Self::parse(&text, &path.display().to_string())?;
        info!(
            "Loaded palette with {} colors from {}",
            palette.len(),
            path.display()
        );
        Ok(palette)
    }

    /// Parse palette text. Malformed lines are skipped with a warning;
    /// `name` is only used in messages.
    pub fn parse(text: &str, name: &str) -> Result<Self> {
        let mut colors = Vec::new();

        for (line_no, tokens) in hextext::token_lines(text) {
            if tokens.len() < 3 {
                warn!(
                    "{}:{}: expected at least 3 hex values, skipping '{}'",
                    name,
                    line_no,
                    tokens.join(" ")
                );
                continue;
            }
            match hextext::parse_bytes(&tokens[..3]) {
                Ok(rgb) => colors.push(Rgb::new(rgb[0], rgb[1], rgb[2])),
                Err(e) => warn!(
                    "{}:{}: could not parse '{}' ({}), skipping",
                    name,
                    line_no,
                    tokens.join(" "),
                    e
                ),
            }
        }

        if colors.is_empty() {
            return Err(ConversionError::EmptyPalette(name.to_string()));
        }
        Ok(Palette { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false, a palette holds at least one color
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Color stored at `index`
    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Find the index of the palette color closest to `pixel`.
    ///
    /// Ties resolve to the lowest index.
    pub fn closest_index(&self, pixel: Rgb) -> usize {
        let mut min_distance = u32::MAX;
        let mut min_index = 0;

        for (i, color) in self.colors.iter().enumerate() {
            let distance = pixel.distance_squared(*color);
            if distance < min_distance {
                min_distance = distance;
                min_index = i;
                if distance == 0 {
                    break;
                }
            }
        }

        min_index
    }

    /// Quantize a run of pixels to palette indices
    pub fn quantize(&self, pixels: &[Rgb]) -> Vec<usize> {
        pixels.iter().map(|p| self.closest_index(*p)).collect()
    }
}
