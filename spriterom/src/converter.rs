//! Image conversion module for converting images to memory images
//!
//! This module drives a run end to end: load the palette, extract tiles,
//! quantize or pack the pixels, lay them out in memory and write the outputs.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, log_enabled, Level};
use serde::Serialize;

use crate::config::Config;
use crate::error::{ConversionError, Result};
use crate::extract::{self, Tile};
use crate::format::{self, write_atomic};
use crate::layout::{self, MemoryImage};
use crate::palette::Palette;
use crate::preview;

/// Summary of a run, written as JSON on request
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub config: Config,
    /// Image each tile came from, in tile order
    pub sources: Vec<PathBuf>,
    pub palette_colors: Option<usize>,
    pub tiles_encoded: usize,
    pub words_written: usize,
    pub depth: usize,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct Conversion {
    pub image: MemoryImage,
    pub palette: Option<Palette>,
    pub tiles: Vec<Tile>,
    pub report: RunReport,
}

/// Main struct for the image conversion process
pub struct ImageConverter {
    config: Config,
}

impl ImageConverter {
    /// Create a new image converter with the given configuration
    pub fn new(config: Config) -> Self {
        ImageConverter { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Main execution function to run the entire conversion process.
    ///
    /// Nothing is written to disk; see [`write_outputs`](Self::write_outputs).
    pub fn convert(&self) -> Result<Conversion> {
        self.config.validate()?;

        // Read the palette first so a bad palette fails before any image is decoded
        let palette = self.load_palette()?;

        // Extract tiles from the source
        let tiles = extract::extract(&self.config)?;

        // Quantize to palette indices, or pack raw colors
        let tile_words = self.tile_words(&tiles, palette.as_ref());

        // Lay the tiles out in memory
        let image = layout::encode(&tile_words, &self.config.layout())?;

        if log_enabled!(Level::Debug) {
            if let Some(palette) = &palette {
                let columns = self.config.tile_width as usize;
                for line in preview::hex_sample(&image, palette, columns, 10, 10) {
                    debug!("{}", line);
                }
            }
        }

        let report = RunReport {
            config: self.config.clone(),
            sources: tiles.iter().map(|t| t.source.clone()).collect(),
            palette_colors: palette.as_ref().map(Palette::len),
            tiles_encoded: tiles.len(),
            words_written: tiles.len() * self.config.tile_size(),
            depth: image.depth(),
        };

        Ok(Conversion {
            image,
            palette,
            tiles,
            report,
        })
    }

    /// Read the palette if the configuration names one
    fn load_palette(&self) -> Result<Option<Palette>> {
        let Some(path) = &self.config.palette_file else {
            return Ok(None);
        };

        let palette = Palette::load(path)?;
        let capacity = self.config.index_capacity();
        if palette.len() > capacity {
            return Err(ConversionError::PaletteTooLarge {
                colors: palette.len(),
                bits: self.config.word_width_bits,
                capacity,
            });
        }
        Ok(Some(palette))
    }

    /// Memory words of every tile, row-major
    fn tile_words(&self, tiles: &[Tile], palette: Option<&Palette>) -> Vec<Vec<u32>> {
        tiles
            .iter()
            .map(|tile| match palette {
                Some(palette) => palette
                    .quantize(&tile.pixels)
                    .into_iter()
                    .map(|index| index as u32)
                    .collect(),
                None => tile.pixels.iter().map(|p| p.to_word()).collect(),
            })
            .collect()
    }

    /// Write the memory image and, if requested, the JSON report
    pub fn write_outputs(&self, conversion: &Conversion) -> Result<()> {
        format::write_image_file(
            &conversion.image,
            self.config.output_format,
            &self.config.output_file,
        )?;

        if let Some(json_path) = &self.config.output_json {
            self.write_json_file(json_path, &conversion.report)?;
        }

        Ok(())
    }

    /// Write JSON output file
    fn write_json_file(&self, path: &Path, report: &RunReport) -> Result<()> {
        let json = serde_json::to_vec_pretty(report)?;
        write_atomic(path, |out| out.write_all(&json))?;
        info!("Wrote report {}", path.display());
        Ok(())
    }
}
