pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod headless;
pub mod panel;
pub mod player;
pub mod render;
pub mod sprite;

pub use app::run;
