use image::{Rgba, RgbaImage};

use super::sheet::SpriteSheet;
use super::{CellRect, DrawSurface};

/// Cleared canvas. The window host composites this over its `--background`
/// color (`render::background_clear_color`); dumped PNGs keep the alpha.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// CPU drawing surface backed by an RGBA buffer.
///
/// Used by the headless frame dump. Blits are nearest-neighbour; source
/// samples that fall outside the sheet come out transparent.
pub struct PixelCanvas<'a> {
    sheet: &'a SpriteSheet,
    frame: RgbaImage,
}

impl<'a> PixelCanvas<'a> {
    pub fn new(sheet: &'a SpriteSheet, width: u32, height: u32) -> Self {
        Self {
            sheet,
            frame: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }
}

impl DrawSurface for PixelCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn clear(&mut self) {
        for px in self.frame.pixels_mut() {
            *px = TRANSPARENT;
        }
    }

    fn blit(&mut self, src: CellRect) {
        let (dst_w, dst_h) = self.frame.dimensions();
        for dy in 0..dst_h {
            // u64 keeps the scale product clear of overflow on large sheets.
            let sy = src.y as u64 + dy as u64 * src.h as u64 / dst_h as u64;
            for dx in 0..dst_w {
                let sx = src.x as u64 + dx as u64 * src.w as u64 / dst_w as u64;
                let px = match (u32::try_from(sx), u32::try_from(sy)) {
                    (Ok(sx), Ok(sy)) => self.sheet.sample(sx, sy).unwrap_or(TRANSPARENT),
                    _ => TRANSPARENT,
                };
                self.frame.put_pixel(dx, dy, px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::FrameSource;

    /// 2x1 grid of 2x2 cells: left cell red, right cell blue.
    fn two_cell_sheet() -> SpriteSheet {
        let img = RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        SpriteSheet::from_rgba(img)
    }

    #[test]
    fn blit_stretches_cell_over_canvas() {
        let sheet = two_cell_sheet();
        let source = FrameSource::new(2, 2).unwrap();
        let mut canvas = PixelCanvas::new(&sheet, 8, 8);

        source.draw(&mut canvas, 0, 1);

        assert!(canvas
            .frame()
            .pixels()
            .all(|px| *px == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn clear_wipes_everything() {
        let sheet = two_cell_sheet();
        let source = FrameSource::new(2, 2).unwrap();
        let mut canvas = PixelCanvas::new(&sheet, 4, 4);
        source.draw(&mut canvas, 0, 0);

        canvas.clear();

        assert!(canvas.frame().pixels().all(|px| *px == TRANSPARENT));
    }

    #[test]
    fn out_of_sheet_cell_draws_transparent() {
        let sheet = two_cell_sheet();
        let source = FrameSource::new(2, 2).unwrap();
        let mut canvas = PixelCanvas::new(&sheet, 4, 4);

        source.draw(&mut canvas, 5, 5);

        assert!(canvas.frame().pixels().all(|px| *px == TRANSPARENT));
    }
}
