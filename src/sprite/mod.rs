pub mod canvas;
pub mod sheet;

use crate::error::SheetError;

/// Pixel rectangle inside the sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Destination for one tick of drawing.
///
/// The surface has a fixed logical size; `blit` stretches the source cell
/// over the whole of it.
pub trait DrawSurface {
    /// Logical (width, height) in pixels.
    fn size(&self) -> (u32, u32);

    /// Wipe the entire surface to transparent.
    fn clear(&mut self);

    /// Copy `src` from the sprite sheet, scaled to fill the surface.
    fn blit(&mut self, src: CellRect);
}

/// Maps (row, column) to a cell of a uniform sprite-sheet grid and draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSource {
    cell_width: u32,
    cell_height: u32,
}

impl FrameSource {
    pub fn new(cell_width: u32, cell_height: u32) -> Result<Self, SheetError> {
        if cell_width == 0 || cell_height == 0 {
            return Err(SheetError::InvalidCell {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            cell_width,
            cell_height,
        })
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Source rectangle of a cell. No bounds check: cells past the sheet's
    /// extent sample outside the image.
    pub fn cell_rect(&self, row: u32, column: u32) -> CellRect {
        CellRect {
            x: column.saturating_mul(self.cell_width),
            y: row.saturating_mul(self.cell_height),
            w: self.cell_width,
            h: self.cell_height,
        }
    }

    pub fn draw(&self, surface: &mut impl DrawSurface, row: u32, column: u32) {
        surface.blit(self.cell_rect(row, column));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        blits: Vec<CellRect>,
    }

    impl DrawSurface for Recorder {
        fn size(&self) -> (u32, u32) {
            (600, 600)
        }

        fn clear(&mut self) {}

        fn blit(&mut self, src: CellRect) {
            self.blits.push(src);
        }
    }

    #[test]
    fn cell_rect_is_grid_aligned() {
        let source = FrameSource::new(575, 523).unwrap();
        assert_eq!(
            source.cell_rect(2, 3),
            CellRect {
                x: 1725,
                y: 1046,
                w: 575,
                h: 523
            }
        );
        assert_eq!(source.cell_rect(0, 0).x, 0);
    }

    #[test]
    fn out_of_range_cells_are_not_rejected() {
        let source = FrameSource::new(10, 10).unwrap();
        let rect = source.cell_rect(1000, 1000);
        assert_eq!((rect.x, rect.y), (10_000, 10_000));
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        assert!(FrameSource::new(0, 10).is_err());
        assert!(FrameSource::new(10, 0).is_err());
    }

    #[test]
    fn draw_blits_the_cell() {
        let source = FrameSource::new(32, 16).unwrap();
        let mut surface = Recorder::default();
        source.draw(&mut surface, 1, 2);
        assert_eq!(surface.blits, vec![source.cell_rect(1, 2)]);
    }
}
