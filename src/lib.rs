//! Overlay GPS tracks on a tile map, follow them with the camera until the user takes over,
//! and export the composed view as a PNG or SVG image.
pub mod camera;
pub mod cli;
pub mod config;
mod error;
pub mod export;
pub mod geometry;
pub mod gps;
pub mod import;
pub mod services;
pub mod session;
pub mod style;
pub mod track;
pub mod view;

pub use camera::{MapCamera, MoveOptions, WebMercatorMap};
pub use error::Error;
pub use export::{ExportArtifact, ExportFormat, Exporter};
pub use geometry::{PixelBounds, PixelPoint};
pub use gps::{GeoBounds, Location};
pub use session::MapSession;
pub use style::{StyleOptions, StyleSpec};
pub use track::{Track, TrackHandle, TrackStore};
pub use view::{ViewController, ViewMode, ViewState};
