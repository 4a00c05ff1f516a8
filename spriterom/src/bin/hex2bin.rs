//! Transcode a hex text file into raw bytes, one byte per token.
//!
//! Uses the same comment and token rules as palette files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use spriterom::format::write_atomic;
use spriterom::hextext;

#[derive(Parser, Debug)]
#[command(version, about = "Convert a hex text file to binary")]
struct Args {
    /// Hex text input
    input: PathBuf,

    /// Binary output, defaults to the input name with a .bin extension
    output: Option<PathBuf>,
}

/// Bytes of every well-formed line; lines with a bad token are skipped
fn transcode(text: &str, name: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (line_no, tokens) in hextext::token_lines(text) {
        match hextext::parse_bytes(&tokens) {
            Ok(line) => bytes.extend(line),
            Err(e) => warn!(
                "{}:{}: could not parse '{}' ({}), skipping",
                name,
                line_no,
                tokens.join(" "),
                e
            ),
        }
    }
    bytes
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let output = args.output.unwrap_or_else(|| default_output(&args.input));

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let bytes = transcode(&text, &args.input.display().to_string());

    write_atomic(&output, |out| out.write_all(&bytes))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} bytes to {}", bytes.len(), output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn tokens_become_bytes_in_order() {
        let text = "// sprite 0\nFF 00 0a\n\n10\t20 // tail\n";
        assert_eq!(transcode(text, "t.hex"), vec![0xFF, 0x00, 0x0A, 0x10, 0x20]);
    }

    #[test]
    fn bad_lines_are_skipped() {
        let text = "01 02\n03 XYZ\n100\n04\n";
        assert_eq!(transcode(text, "t.hex"), vec![1, 2, 4]);
    }

    #[test]
    fn output_defaults_to_bin_extension() {
        assert_eq!(
            default_output(Path::new("rom/tiles.hex")),
            PathBuf::from("rom/tiles.bin")
        );
    }
}
