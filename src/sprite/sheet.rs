use std::path::Path;

use image::RgbaImage;

use crate::error::SheetError;

/// Decoded sprite-sheet pixels (RGBA8, row-major).
pub struct SpriteSheet {
    pixels: RgbaImage,
}

impl SpriteSheet {
    /// Decode a sheet from disk. Blocks until the image is fully decoded, so
    /// the first tick never draws from a half-loaded sheet.
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let img = image::open(path).map_err(|source| SheetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let pixels = img.to_rgba8();
        log::info!(
            "Sprite sheet {}: {}x{}",
            path.display(),
            pixels.width(),
            pixels.height()
        );
        Ok(Self { pixels })
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Pixel at (x, y), or `None` outside the image.
    pub fn sample(&self, x: u32, y: u32) -> Option<image::Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }
}
