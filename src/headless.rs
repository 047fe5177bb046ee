use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::player::{LoopHandle, Player};
use crate::sprite::canvas::PixelCanvas;
use crate::sprite::sheet::SpriteSheet;

/// File name of the PNG written for `tick`.
pub fn frame_path(dir: &Path, tick: u32) -> PathBuf {
    dir.join(format!("frame_{tick:04}.png"))
}

/// Render `ticks` ticks without a window, one PNG per tick.
pub fn dump(
    sheet: &SpriteSheet,
    player: Player,
    canvas_size: (u32, u32),
    dir: &Path,
    ticks: u32,
) -> Result<(), AppError> {
    dump_until(sheet, player, canvas_size, dir, ticks, &LoopHandle::new())
}

/// Like [`dump`], but stops early once `handle` is stopped.
/// Returns after the tick in progress is written.
pub fn dump_until(
    sheet: &SpriteSheet,
    mut player: Player,
    (width, height): (u32, u32),
    dir: &Path,
    ticks: u32,
    handle: &LoopHandle,
) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|source| AppError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut canvas = PixelCanvas::new(sheet, width, height);
    let mut written = 0;
    for tick in 0..ticks {
        if !handle.is_running() {
            break;
        }
        let frame = player.on_tick(&mut canvas);
        let path = frame_path(dir, tick);
        canvas
            .frame()
            .save(&path)
            .map_err(|source| AppError::WriteFrame {
                path: path.clone(),
                source,
            })?;
        log::debug!("tick {tick}: frame {frame:?} -> {}", path.display());
        written += 1;
    }

    log::info!("Wrote {written} frames to {}", dir.display());
    Ok(())
}
