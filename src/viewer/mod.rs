pub mod controller;
pub mod loader;

pub use controller::{ControllerSettings, LoadState, ViewportController};
pub use loader::BitmapLoader;
