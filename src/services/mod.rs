//! Service module that exports interfaces to external applications, APIs, etc.

pub mod raster;

// rexport some traits and utilty functions
pub use raster::{new_rasterizer, RasterScene, Rasterizer};
