pub mod error;
pub mod raster;
pub mod render;
pub mod tui;
pub mod viewport;

pub use error::{Result, ViewError};
