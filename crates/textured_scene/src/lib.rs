pub mod config;
pub mod demo_error;
pub mod frame;
pub mod frame_record;
pub mod frame_sync;
pub mod keyboard;
pub mod math;
pub mod model;
pub mod overlay;
pub mod sprite;
pub mod texture;

#[cfg(windows)]
pub mod app;
#[cfg(windows)]
pub mod d3d12;
#[cfg(windows)]
pub mod win32;
