//! Color types and utilities for image processing.
//!
//! This module contains color-related functionality including:
//! - `Rgb`, the 8-bit-per-channel color every stage works with
//! - Euclidean color distance
//! - Packing colors into 24-bit memory words

use std::fmt;

use image::Rgb as ImageRgb;
use serde::{Deserialize, Serialize};

/// Mask of the 24 color bits in a packed memory word
pub const RGB_WORD_MASK: u32 = 0x00FF_FFFF;

/// An 8-bit-per-channel RGB color
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Pack into a memory word as `(R << 16) | (G << 8) | B`
    pub fn to_word(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpack the low 24 bits of a memory word
    pub fn from_word(word: u32) -> Self {
        let word = word & RGB_WORD_MASK;
        Rgb::new((word >> 16) as u8, (word >> 8) as u8, word as u8)
    }

    /// Squared Euclidean distance in RGB space.
    ///
    /// Ordering by this value is the same as ordering by the real distance,
    /// without any floating point rounding.
    #[inline]
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Euclidean distance in RGB space
    pub fn distance(self, other: Rgb) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Perceived brightness in 0.0..=1.0 (ITU-R BT.601 weights)
    pub fn brightness(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    /// Uppercase `RRGGBB` hex string
    pub fn to_hex(self) -> String {
        hex::encode_upper([self.r, self.g, self.b])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl From<ImageRgb<u8>> for Rgb {
    fn from(pixel: ImageRgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Rgb::new(r, g, b)
    }
}

impl From<Rgb> for ImageRgb<u8> {
    fn from(color: Rgb) -> Self {
        ImageRgb([color.r, color.g, color.b])
    }
}
