use std::cell::Cell;
use std::rc::Rc;

use crate::catalog::{AnimationDef, Catalog};
use crate::error::PlayerError;
use crate::sprite::{DrawSurface, FrameSource};

/// Active frame for a tick: `floor(tick / stagger) mod num_frames`.
///
/// Returns `None` when the stagger is zero or negative (or the strip is
/// empty); the tick then draws nothing.
pub fn frame_index(tick_count: u64, stagger_frames: i64, num_frames: u32) -> Option<u32> {
    let stagger = u64::try_from(stagger_frames).ok().filter(|s| *s > 0)?;
    let index = (tick_count / stagger).checked_rem(num_frames as u64)?;
    Some(index as u32)
}

/// Mutable playback position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub tick_count: u64,
    /// Ticks each frame is held. Stored as given, including values <= 0.
    pub stagger_frames: i64,
    pub current: AnimationDef,
}

/// Owns the playback state and drives one draw per tick.
///
/// Not `Sync`: the tick and every input handler must run on the same thread.
/// winit delivers window events and redraws on the event-loop thread, which
/// is what makes the unlocked mutation here sound.
pub struct Player {
    catalog: Catalog,
    source: FrameSource,
    state: PlaybackState,
}

impl Player {
    /// Start playing `default_animation`, or the first catalog entry when
    /// that name is not in the catalog.
    pub fn new(
        catalog: Catalog,
        source: FrameSource,
        default_animation: &str,
        stagger_frames: i64,
    ) -> Self {
        let current = match catalog.find(default_animation) {
            Some(anim) => anim.clone(),
            None => {
                let first = catalog.first().clone();
                log::warn!(
                    "Default animation {:?} not in catalog, starting with {:?}",
                    default_animation,
                    first.name
                );
                first
            }
        };
        log::info!(
            "Playing {:?} (row {}, {} frames), stagger {}",
            current.name,
            current.row,
            current.num_frames,
            stagger_frames
        );
        Self {
            catalog,
            source,
            state: PlaybackState {
                tick_count: 0,
                stagger_frames,
                current,
            },
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn source(&self) -> &FrameSource {
        &self.source
    }

    /// Frame the next tick will draw.
    pub fn current_frame(&self) -> Option<u32> {
        frame_index(
            self.state.tick_count,
            self.state.stagger_frames,
            self.state.current.num_frames,
        )
    }

    /// Clear, draw the active cell, advance. Returns the frame drawn.
    pub fn on_tick(&mut self, surface: &mut impl DrawSurface) -> Option<u32> {
        surface.clear();

        let frame = self.current_frame();
        if let Some(column) = frame {
            self.source.draw(surface, self.state.current.row, column);
        }

        self.state.tick_count += 1;
        frame
    }

    /// Switch animation and restart it from frame 0.
    ///
    /// Unknown names leave playback untouched.
    pub fn on_select_animation(&mut self, name: &str) -> Result<(), PlayerError> {
        let anim = self
            .catalog
            .find(name)
            .ok_or_else(|| PlayerError::UnknownAnimation(name.to_string()))?;
        self.state.current = anim.clone();
        self.state.tick_count = 0;
        log::info!(
            "Animation -> {:?} (row {}, {} frames)",
            anim.name,
            anim.row,
            anim.num_frames
        );
        Ok(())
    }

    /// Apply raw stagger input. Does not reset the tick counter.
    ///
    /// Fractions truncate toward zero; anything that is not a finite number
    /// becomes 0, which blanks the canvas until a valid value arrives.
    /// That includes positive fractions below 1: `"0.5"` stores 0 and draws
    /// nothing, rather than stepping several frames per tick as a
    /// float-division frame index would.
    pub fn on_stagger_change(&mut self, value: &str) {
        let stagger = match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v.trunc() as i64,
            _ => {
                log::warn!("Stagger {:?} is not a number, treating as 0", value);
                0
            }
        };
        self.set_stagger(stagger);
    }

    pub fn set_stagger(&mut self, stagger_frames: i64) {
        if stagger_frames <= 0 {
            log::warn!("Stagger {} is not positive, frames will not be drawn", stagger_frames);
        } else {
            log::debug!("Stagger -> {}", stagger_frames);
        }
        self.state.stagger_frames = stagger_frames;
    }
}

/// Stop hook for the tick loop.
///
/// Clones share one flag. Once stopped, the host stops scheduling ticks.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    stopped: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        if !self.stopped.replace(true) {
            log::info!("Tick loop stop requested");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.get()
    }
}
