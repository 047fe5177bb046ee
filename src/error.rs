use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading the animation catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no animations")]
    Empty,

    /// A strip with zero frames would make every frame index undefined.
    #[error("animation {name:?} has no frames")]
    NoFrames { name: String },
}

/// Failures while loading the sprite sheet or validating its geometry.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("failed to decode sprite sheet {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cell size must be non-zero, got {width}x{height}")]
    InvalidCell { width: u32, height: u32 },
}

/// Failures raised by playback input handlers.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlayerError {
    #[error("unknown animation {0:?}")]
    UnknownAnimation(String),
}

/// Invalid command-line configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("canvas size must be non-zero, got {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("background must be six hex digits (RRGGBB), got {0:?}")]
    InvalidBackground(String),
}

/// Top-level error returned by [`crate::app::run`] and the headless dump.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("failed to create wgpu surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create wgpu device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("sprite sheet is {width}x{height}, the GPU allows at most {max}x{max}")]
    SheetTooLarge { width: u32, height: u32, max: u32 },

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to write frame {path}: {source}")]
    WriteFrame {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
