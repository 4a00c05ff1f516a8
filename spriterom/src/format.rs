//! Serializers for memory images.
//!
//! Every format walks the image in address order, so two images with the same
//! words always serialize to the same bytes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use tempfile::Builder;

use crate::error::{ConversionError, Result};
use crate::layout::MemoryImage;

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputFormat {
    /// One zero-padded hex word per line
    Hex,
    /// Raw big-endian words, no delimiters
    Binary,
    /// Quartus memory initialization file
    Mif,
    /// Space separated hex words, `columns` per line
    IndexGrid { columns: usize },
}

impl OutputFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Hex | OutputFormat::IndexGrid { .. } => "hex",
            OutputFormat::Binary => "bin",
            OutputFormat::Mif => "mif",
        }
    }
}

/// Write `image` to `out` in the given format
pub fn write_image<W: Write>(
    image: &MemoryImage,
    format: OutputFormat,
    mut out: W,
) -> io::Result<()> {
    match format {
        OutputFormat::Hex => write_hex(image, &mut out)?,
        OutputFormat::Binary => write_binary(image, &mut out)?,
        OutputFormat::Mif => write_mif(image, &mut out)?,
        OutputFormat::IndexGrid { columns } => write_index_grid(image, columns, &mut out)?,
    }
    out.flush()
}

/// Serialize `image` into memory
pub fn to_bytes(image: &MemoryImage, format: OutputFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_image(image, format, &mut bytes);
    bytes
}

fn write_hex<W: Write>(image: &MemoryImage, out: &mut W) -> io::Result<()> {
    let digits = image.word_digits();
    for word in image.words() {
        writeln!(out, "{:0digits$X}", word)?;
    }
    Ok(())
}

fn write_binary<W: Write>(image: &MemoryImage, out: &mut W) -> io::Result<()> {
    let skip = 4usize.saturating_sub(image.word_bytes());
    for word in image.words() {
        out.write_all(&word.to_be_bytes()[skip..])?;
    }
    Ok(())
}

fn write_mif<W: Write>(image: &MemoryImage, out: &mut W) -> io::Result<()> {
    writeln!(out, "WIDTH={};", image.word_bits())?;
    writeln!(out, "DEPTH={};", image.depth())?;
    writeln!(out, "ADDRESS_RADIX=UNS;")?;
    writeln!(out, "DATA_RADIX=HEX;")?;
    writeln!(out, "CONTENT BEGIN")?;

    let digits = image.payload_digits();
    for (address, word) in image.words().iter().enumerate() {
        writeln!(out, "    {} : {:0digits$X};", address, word)?;
    }

    writeln!(out, "END;")
}

fn write_index_grid<W: Write>(image: &MemoryImage, columns: usize, out: &mut W) -> io::Result<()> {
    let digits = image.word_digits();
    for row in image.words().chunks(columns.max(1)) {
        let line = row.iter().map(|word| format!("{:0digits$X}", word)).join(" ");
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Create `path` with the contents produced by `write`.
///
/// The data goes to a temporary file next to `path` which only replaces it once
/// `write` has succeeded, so a failed run never leaves a truncated file behind.
/// On unix the file gets the same mode as a plain `fs::write` (`0o666` minus
/// the umask) instead of the owner-only mode of a temporary file.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let temp = builder.tempfile_in(dir).map_err(|e| ConversionError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer).map_err(|e| ConversionError::io(path, e))?;
        writer.flush().map_err(|e| ConversionError::io(path, e))?;
    }
    temp.persist(path).map_err(|e| ConversionError::io(path, e.error))?;
    Ok(())
}

/// Serialize `image` into the file at `path`
pub fn write_image_file(image: &MemoryImage, format: OutputFormat, path: &Path) -> Result<()> {
    write_atomic(path, |out| write_image(image, format, out))?;
    info!(
        "Wrote {} with {} {}-bit words",
        path.display(),
        image.depth(),
        image.word_bits()
    );
    Ok(())
}
