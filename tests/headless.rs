use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;

use sheetplay::catalog::Catalog;
use sheetplay::headless;
use sheetplay::player::{LoopHandle, Player};
use sheetplay::sprite::canvas::PixelCanvas;
use sheetplay::sprite::sheet::SpriteSheet;
use sheetplay::sprite::FrameSource;

const CELL: u32 = 4;

/// Color of the cell at (row, column) in the test sheet.
fn cell_color(row: u32, column: u32) -> Rgba<u8> {
    Rgba([(column * 40) as u8, (row * 60) as u8, 200, 255])
}

/// 3 rows x 4 columns of solid-colored 4x4 cells.
fn sheet() -> SpriteSheet {
    SpriteSheet::from_rgba(RgbaImage::from_fn(CELL * 4, CELL * 3, |x, y| {
        cell_color(y / CELL, x / CELL)
    }))
}

fn catalog() -> Catalog {
    Catalog::from_json(
        r#"[
            {"name": "idle", "row": 0, "numFrames": 2},
            {"name": "dizzy", "row": 2, "numFrames": 4}
        ]"#,
    )
    .unwrap()
}

fn player(stagger: i64) -> Player {
    Player::new(catalog(), FrameSource::new(CELL, CELL).unwrap(), "dizzy", stagger)
}

#[test]
fn ticks_walk_the_strip_with_stagger() {
    let sheet = sheet();
    let mut canvas = PixelCanvas::new(&sheet, 8, 8);
    let mut p = player(2);

    let mut seen = Vec::new();
    for _ in 0..10 {
        let frame = p.on_tick(&mut canvas).unwrap();
        assert_eq!(*canvas.frame().get_pixel(5, 5), cell_color(2, frame));
        seen.push(frame);
    }

    assert_eq!(seen, vec![0, 0, 1, 1, 2, 2, 3, 3, 0, 0]);
}

#[test]
fn selection_restarts_and_stagger_does_not() {
    let sheet = sheet();
    let mut canvas = PixelCanvas::new(&sheet, 8, 8);
    let mut p = player(1);
    for _ in 0..3 {
        p.on_tick(&mut canvas);
    }

    p.on_stagger_change("2");
    assert_eq!(p.state().tick_count, 3);
    assert_eq!(p.on_tick(&mut canvas), Some(1));

    p.on_select_animation("idle").unwrap();
    assert_eq!(p.on_tick(&mut canvas), Some(0));
    assert_eq!(*canvas.frame().get_pixel(0, 0), cell_color(0, 0));
}

#[test]
fn zero_stagger_leaves_canvas_blank() {
    let sheet = sheet();
    let mut canvas = PixelCanvas::new(&sheet, 8, 8);
    let mut p = player(1);
    p.on_tick(&mut canvas);

    p.on_stagger_change("0");
    assert_eq!(p.on_tick(&mut canvas), None);

    assert!(canvas.frame().pixels().all(|px| px.0[3] == 0));
}

#[test]
fn dump_writes_one_png_per_tick() {
    let sheet = sheet();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");

    headless::dump(&sheet, player(1), (8, 8), &out, 5).unwrap();

    for tick in 0..5 {
        let path = headless::frame_path(&out, tick);
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(*img.get_pixel(3, 3), cell_color(2, tick % 4));
    }
    assert!(!headless::frame_path(&out, 5).exists());
}

#[test]
fn stopped_handle_ends_dump_early() {
    let sheet = sheet();
    let dir = tempfile::tempdir().unwrap();
    let handle = LoopHandle::new();
    handle.stop();

    headless::dump_until(&sheet, player(1), (8, 8), dir.path(), 5, &handle).unwrap();

    assert!(!headless::frame_path(dir.path(), 0).exists());
}
