//! Convert PNG sprites and tile sheets into memory initialization files for
//! the tile and sprite memories of an FPGA video core.
//!
//! A run loads an optional palette, cuts tiles out of the source images,
//! quantizes or packs their pixels, lays them out in a dense memory image and
//! serializes it as hex, MIF, binary or an index grid.

pub mod color;
pub mod config;
pub mod converter;
pub mod error;
pub mod extract;
pub mod format;
pub mod hextext;
pub mod layout;
pub mod palette;
pub mod preview;

pub use config::{Config, Preset};
pub use converter::{Conversion, ImageConverter, RunReport};
pub use error::{ConversionError, Result};
