use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "warpview",
    author,
    version,
    about = "Animated full-screen image distortion viewer"
)]
pub struct Cli {
    /// Path of the image to distort.
    #[arg(value_name = "IMAGE", required_unless_present = "list_effects")]
    pub image: Option<PathBuf>,

    /// Built-in effect to render.
    #[arg(long, value_name = "NAME", default_value = "wave", conflicts_with = "manifest")]
    pub effect: String,

    /// Load an effect from a TOML manifest instead of a built-in.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Override the window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// List built-in effects and exit.
    #[arg(long)]
    pub list_effects: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width_raw, height_raw) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{trimmed}'"))?;
    let width: u32 = width_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{width_raw}'"))?;
    let height: u32 = height_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{height_raw}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size must be non-zero, got {width}x{height}"));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_sizes() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size(" 640 X 480 "), Ok((640, 480)));
    }

    #[test]
    fn rejects_malformed_sizes() {
        assert!(parse_size("1280").is_err());
        assert!(parse_size("x720").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }
}
