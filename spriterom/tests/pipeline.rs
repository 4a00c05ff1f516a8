use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use spriterom::config::{ExtractMode, Source};
use spriterom::format::OutputFormat;
use spriterom::{Config, ConversionError, ImageConverter, Preset};
use tempfile::TempDir;

/// Sprite `n` gets a distinct color per pixel so misplaced words show up
fn sprite_pixel(n: u32, x: u32, y: u32) -> Rgb<u8> {
    Rgb([(n * 40 + 1) as u8, (y * 8 + x) as u8, (255 - n) as u8])
}

fn write_sprites(dir: &Path, names: &[&str], size: u32) {
    for (n, name) in names.iter().enumerate() {
        RgbImage::from_fn(size, size, |x, y| sprite_pixel(n as u32, x, y))
            .save(dir.join(name))
            .unwrap();
    }
}

fn directory_config(images: &Path, output: PathBuf) -> Config {
    let mut config = Config::preset(Preset::Sprites);
    config.source = Source::Directory {
        path: images.to_path_buf(),
    };
    config.output_file = output;
    config
}

fn eight_by_eight_config(images: &Path, output: PathBuf) -> Config {
    let mut config = directory_config(images, output);
    config.sprite_width = 8;
    config.sprite_height = 8;
    config.extract_mode = ExtractMode::Full;
    config.depth = 4096;
    config
}

fn run(config: Config) -> Result<(), ConversionError> {
    let converter = ImageConverter::new(config);
    let conversion = converter.convert()?;
    converter.write_outputs(&conversion)
}

#[test]
fn three_sprites_fill_the_first_192_words() {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_sprites(&images, &["a.png", "b.png", "c.png"], 8);
    let output = dir.path().join("sprites.hex");

    run(eight_by_eight_config(&images, output.clone())).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4096);

    for n in 0..3u32 {
        for y in 0..8 {
            for x in 0..8 {
                let Rgb([r, g, b]) = sprite_pixel(n, x, y);
                let word = (r as u32) << 16 | (g as u32) << 8 | b as u32;
                let address = (n * 64 + y * 8 + x) as usize;
                assert_eq!(lines[address], format!("{:08X}", word), "address {address}");
            }
        }
    }
    assert!(lines[192..].iter().all(|line| *line == "00000000"));
}

#[test]
fn rerunning_gives_identical_bytes() {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_sprites(&images, &["x.png", "y.png"], 8);

    let mut outputs = Vec::new();
    for i in 0..2 {
        let output = dir.path().join(format!("run{i}.mif"));
        let mut config = eight_by_eight_config(&images, output.clone());
        config.output_format = OutputFormat::Mif;
        run(config).unwrap();
        outputs.push(fs::read(output).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn sprite_preset_reads_top_left_block_of_32x32_files() {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_sprites(&images, &["0.png", "1.png"], 32);

    let converter = ImageConverter::new(directory_config(&images, dir.path().join("out.hex")));
    let conversion = converter.convert().unwrap();

    assert_eq!(conversion.image.depth(), 49152);
    // (sprite << 6) | (y << 3) | x
    let Rgb([r, g, b]) = sprite_pixel(1, 7, 2);
    assert_eq!(
        conversion.image.word(1 << 6 | 2 << 3 | 7),
        Some((r as u32) << 16 | (g as u32) << 8 | b as u32)
    );
    assert_eq!(conversion.report.words_written, 128);
    assert!(conversion.image.words()[128..].iter().all(|w| *w == 0));
}

#[test]
fn excess_sprites_are_ignored_in_name_order() {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_sprites(&images, &["c.png", "a.png", "b.png"], 8);

    let mut config = eight_by_eight_config(&images, dir.path().join("out.hex"));
    config.tile_count = 2;
    let conversion = ImageConverter::new(config).convert().unwrap();

    let names: Vec<_> = conversion
        .report
        .sources
        .iter()
        .map(|p| p.file_name().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png"]);
    // a.png was written second, as sprite 1
    let Rgb([r, g, b]) = sprite_pixel(1, 0, 0);
    assert_eq!(
        conversion.image.word(0),
        Some((r as u32) << 16 | (g as u32) << 8 | b as u32)
    );
}

#[test]
fn geometry_mismatch_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_sprites(&images, &["a.png"], 8);
    write_sprites(&images, &["b.png"], 16);
    let output = dir.path().join("sprites.hex");

    let err = run(eight_by_eight_config(&images, output.clone())).unwrap_err();
    match err {
        ConversionError::GeometryMismatch { path, width, .. } => {
            assert!(path.ends_with("b.png"));
            assert_eq!(width, 16);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn too_small_memory_overflows() {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_sprites(&images, &["a.png", "b.png"], 8);

    let mut config = eight_by_eight_config(&images, dir.path().join("out.hex"));
    config.depth = 100;
    let err = run(config).unwrap_err();
    assert!(matches!(
        err,
        ConversionError::AddressOverflow {
            address: 100,
            tile: 1,
            ..
        }
    ));
}

#[test]
fn empty_directory_gives_all_fill() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blank.hex");
    let mut config = eight_by_eight_config(dir.path(), output.clone());
    config.depth = 16;
    config.fill_value = 0x123456;
    run(config).unwrap();

    let text = fs::read_to_string(output).unwrap();
    assert_eq!(text.lines().count(), 16);
    assert!(text.lines().all(|line| line == "00123456"));
}

#[test]
fn tile_sheet_preset_writes_mif() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("tilesheet.png");
    // 4 tiles across, 2 down
    RgbImage::from_fn(32, 16, |x, y| Rgb([(x / 8) as u8, (y / 8) as u8, 0]))
        .save(&sheet)
        .unwrap();
    let output = dir.path().join("img_table.mif");

    let mut config = Config::preset(Preset::TileSheet);
    config.source = Source::Sheet { path: sheet };
    config.output_file = output.clone();
    config.tile_count = 8;
    config.depth = 8 * 64;
    run(config).unwrap();

    let text = fs::read_to_string(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        &lines[..5],
        &[
            "WIDTH=32;",
            "DEPTH=512;",
            "ADDRESS_RADIX=UNS;",
            "DATA_RADIX=HEX;",
            "CONTENT BEGIN"
        ]
    );
    assert_eq!(lines.len(), 5 + 512 + 1);
    assert_eq!(lines[5], "    0 : 000000;");
    // tile 5 is x = 1, y = 1
    assert_eq!(lines[5 + 5 * 64], "    320 : 010100;");
    assert_eq!(lines[5 + 7 * 64 + 63], "    511 : 030100;");
    assert_eq!(*lines.last().unwrap(), "END;");
}

#[test]
fn tile_sheet_with_too_few_tiles_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("tilesheet.png");
    RgbImage::new(16, 16).save(&sheet).unwrap();

    let mut config = Config::preset(Preset::TileSheet);
    config.source = Source::Sheet { path: sheet };
    config.output_file = dir.path().join("img_table.mif");
    let err = run(config).unwrap_err();
    assert!(matches!(
        err,
        ConversionError::InsufficientTiles {
            found: 4,
            needed: 256
        }
    ));
}

#[test]
fn palette_tile_ignores_alpha() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("logo.png");
    // transparent red stays red
    RgbaImage::from_pixel(32, 32, Rgba([250, 10, 10, 0]))
        .save(&source)
        .unwrap();
    let palette = dir.path().join("palette.hex");
    fs::write(&palette, "00 00 00 00\nFF FF FF 00\nFF 00 00 00 // red\n").unwrap();
    let output = dir.path().join("logo.hex");

    let mut config = Config::preset(Preset::PaletteTile);
    config.source = Source::Sheet { path: source };
    config.palette_file = Some(palette);
    config.output_file = output.clone();
    run(config).unwrap();

    let text = fs::read_to_string(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 32);
    let row = vec!["02"; 32].join(" ");
    assert!(lines.iter().all(|line| *line == row));
}
