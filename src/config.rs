use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;

/// Native sheet cell size of the bundled shadow-dog sheet.
pub const DEFAULT_CELL_WIDTH: u32 = 575;
pub const DEFAULT_CELL_HEIGHT: u32 = 523;
/// Canvas size, shared by window setup and every clear/draw.
pub const DEFAULT_CANVAS_WIDTH: u32 = 600;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;
/// Ticks each frame is held before advancing.
pub const DEFAULT_STAGGER: i64 = 5;
/// Window color behind the (transparent-cleared) canvas.
pub const DEFAULT_BACKGROUND: &str = "ffffff";

#[derive(Debug, Clone, Parser)]
#[command(name = "sheetplay", version, about = "Play a sprite-sheet animation")]
pub struct Config {
    /// Sprite-sheet image (PNG). The default path is not bundled with the
    /// crate; without it startup fails, so pass your own sheet
    #[arg(long, default_value = "assets/shadow.png")]
    pub sheet: PathBuf,

    /// Animation catalog JSON; the built-in catalog is used when omitted
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Width of one sheet cell in pixels
    #[arg(long, default_value_t = DEFAULT_CELL_WIDTH)]
    pub cell_width: u32,

    /// Height of one sheet cell in pixels
    #[arg(long, default_value_t = DEFAULT_CELL_HEIGHT)]
    pub cell_height: u32,

    /// Canvas width in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH)]
    pub canvas_width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT)]
    pub canvas_height: u32,

    /// Ticks each frame is held, taken as raw input: fractions truncate,
    /// 0, negatives and non-numbers draw nothing
    #[arg(long, default_value_t = DEFAULT_STAGGER.to_string(), allow_hyphen_values = true)]
    pub stagger: String,

    /// Window background as RRGGBB hex, shown where the canvas is transparent
    #[arg(long, default_value = DEFAULT_BACKGROUND)]
    pub background: String,

    /// Animation selected at startup
    #[arg(long, default_value = "dizzy")]
    pub animation: String,

    /// Render headless into this directory instead of opening a window
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Number of ticks to render with --dump
    #[arg(long, default_value_t = 60, requires = "dump")]
    pub ticks: u32,
}

impl Config {
    /// Reject settings the canvas cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::InvalidCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        self.background_rgb()?;
        Ok(())
    }

    /// Background color as sRGB bytes.
    pub fn background_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_rgb(&self.background)
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }
}

/// Parse `RRGGBB` (optional leading `#`).
pub fn parse_hex_rgb(value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid = || ConfigError::InvalidBackground(value.to_string());
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["sheetplay"]);
        assert_eq!(config.cell_width, 575);
        assert_eq!(config.cell_height, 523);
        assert_eq!(config.canvas_size(), (600, 600));
        assert_eq!(config.stagger, "5");
        assert_eq!(config.background_rgb().unwrap(), [255, 255, 255]);
        assert_eq!(config.animation, "dizzy");
        assert!(config.catalog.is_none());
        assert!(config.dump.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn accepts_negative_stagger() {
        let config = Config::parse_from(["sheetplay", "--stagger", "-3"]);
        assert_eq!(config.stagger, "-3");
    }

    #[test]
    fn sheet_help_mentions_missing_default() {
        let cmd = Config::command();
        let sheet = cmd
            .get_arguments()
            .find(|a| a.get_id() == "sheet")
            .unwrap();
        let help = sheet.get_help().unwrap().to_string();
        assert!(help.contains("not bundled"), "{help}");
    }

    #[test]
    fn background_hex() {
        assert_eq!(parse_hex_rgb("#1a2B3c").unwrap(), [0x1a, 0x2b, 0x3c]);
        assert_eq!(parse_hex_rgb("000000").unwrap(), [0, 0, 0]);
        assert!(parse_hex_rgb("fff").is_err());
        assert!(parse_hex_rgb("gg0000").is_err());

        let config = Config::parse_from(["sheetplay", "--background", "nope"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn ticks_require_dump() {
        assert!(Config::try_parse_from(["sheetplay", "--ticks", "10"]).is_err());
        let config =
            Config::try_parse_from(["sheetplay", "--dump", "out", "--ticks", "10"]).unwrap();
        assert_eq!(config.ticks, 10);
    }

    #[test]
    fn zero_canvas_is_invalid() {
        let config = Config::parse_from(["sheetplay", "--canvas-width", "0"]);
        assert!(config.validate().is_err());
    }
}
