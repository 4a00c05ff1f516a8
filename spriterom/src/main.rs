use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use spriterom::format::OutputFormat;
use spriterom::preview;
use spriterom::{Config, ImageConverter, Preset};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// One hex word per line
    Hex,
    /// Raw big-endian words
    Bin,
    /// Memory initialization file
    Mif,
    /// Hex index grid, one tile row per line
    Grid,
}

/// Convert PNG sprites and tile sheets into FPGA memory images
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Memory to generate
    #[arg(long, value_enum, default_value_t = Preset::Sprites)]
    preset: Preset,

    /// JSON configuration file, replaces the preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source image or sprite directory
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Palette file; words become palette indices
    #[arg(short, long)]
    palette: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Memory depth in words
    #[arg(long)]
    depth: Option<usize>,

    /// Write a JSON report of the run
    #[arg(long)]
    json: Option<PathBuf>,

    /// Render the encoded tiles to a PNG
    #[arg(long)]
    preview_png: Option<PathBuf>,

    /// Print an ASCII art preview of the memory image
    #[arg(long)]
    ascii: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => Config::preset(self.preset),
        };

        if let Some(input) = self.input {
            config.source = config.source.with_path(input);
        }
        if let Some(palette) = self.palette {
            config.palette_file = Some(palette);
        }
        if let Some(output) = self.output {
            config.output_file = output;
        }
        if let Some(format) = self.format {
            config.output_format = match format {
                FormatArg::Hex => OutputFormat::Hex,
                FormatArg::Bin => OutputFormat::Binary,
                FormatArg::Mif => OutputFormat::Mif,
                FormatArg::Grid => OutputFormat::IndexGrid {
                    columns: config.tile_width as usize,
                },
            };
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(json) = self.json {
            config.output_json = Some(json);
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let preview_png = args.preview_png.clone();
    let ascii = args.ascii;
    let config = args.into_config()?;

    let converter = ImageConverter::new(config);
    let conversion = converter.convert().context("Conversion failed")?;
    converter
        .write_outputs(&conversion)
        .context("Failed to write outputs")?;

    let config = converter.config();
    if let Some(path) = preview_png {
        let picture = preview::render_tiles(
            &conversion.image,
            &config.layout(),
            conversion.palette.as_ref(),
            config.tile_count,
            16,
        );
        picture
            .save(&path)
            .with_context(|| format!("Failed to save preview {}", path.display()))?;
        info!("Wrote preview {}", path.display());
    }

    if ascii {
        println!(
            "{}",
            preview::ascii_art(
                &conversion.image,
                conversion.palette.as_ref(),
                config.tile_width as usize,
            )
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spriterom::config::Source;
    use spriterom::layout::PixelFormat;
    use std::path::Path;

    fn config_from(args: &[&str]) -> Result<Config> {
        Args::parse_from(std::iter::once("spriterom").chain(args.iter().copied())).into_config()
    }

    #[test]
    fn input_keeps_the_source_kind() {
        let config = config_from(&["--input", "art/sprites"]).unwrap();
        assert_eq!(
            config.source,
            Source::Directory {
                path: "art/sprites".into()
            }
        );

        let config = config_from(&["--preset", "tile-sheet", "-i", "art/sheet.png"]).unwrap();
        assert_eq!(
            config.source,
            Source::Sheet {
                path: "art/sheet.png".into()
            }
        );
    }

    #[test]
    fn grid_format_wraps_at_tile_width() {
        let config = config_from(&["--preset", "tile-sheet", "--format", "grid"]).unwrap();
        assert_eq!(config.output_format, OutputFormat::IndexGrid { columns: 8 });

        let config = config_from(&["--preset", "palette-tile", "--format", "grid"]).unwrap();
        assert_eq!(config.output_format, OutputFormat::IndexGrid { columns: 32 });
    }

    #[test]
    fn flags_override_the_preset() {
        let config = config_from(&[
            "-p",
            "rom/palette.hex",
            "-o",
            "rom/out.bin",
            "--format",
            "bin",
            "--depth",
            "2048",
            "--json",
            "rom/report.json",
        ])
        .unwrap();

        assert_eq!(config.palette_file.as_deref(), Some(Path::new("rom/palette.hex")));
        assert_eq!(config.pixel_format(), PixelFormat::Index);
        assert_eq!(config.output_file, Path::new("rom/out.bin"));
        assert_eq!(config.output_format, OutputFormat::Binary);
        assert_eq!(config.depth, 2048);
        assert_eq!(config.output_json.as_deref(), Some(Path::new("rom/report.json")));
        assert_eq!(config.tile_count, Config::preset(Preset::Sprites).tile_count);
    }

    #[test]
    fn config_file_replaces_the_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rom.json");
        std::fs::write(
            &path,
            r#"{ "source": { "kind": "sheet", "path": "a.png" }, "tile_count": 4 }"#,
        )
        .unwrap();
        let path = path.to_str().unwrap();

        let config = config_from(&["--preset", "palette-tile", "--config", path]).unwrap();
        assert_eq!(config.tile_count, 4);
        assert_eq!(config.palette_file, None);

        let config = config_from(&["--config", path, "--input", "b.png"]).unwrap();
        assert_eq!(config.source, Source::Sheet { path: "b.png".into() });

        let missing = dir.path().join("missing.json");
        assert!(config_from(&["--config", missing.to_str().unwrap()]).is_err());
    }
}
