//! Render the current map view, tiles and track overlays, into a PNG using an external service
use crate::config::ServiceConfig;
use crate::gps::{GeoBounds, Location};
use crate::style::StyleSpec;
use crate::Error;
mod mapbox;
pub use mapbox::MapBox;
mod openmaptiles;
pub use openmaptiles::OpenMapTiles;

/// Leading bytes of every PNG file
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A track copied out of the track store for rendering
#[derive(Clone, Debug)]
pub struct RasterTrack {
    pub points: Vec<Location>,
    pub style: StyleSpec,
}

/// Snapshot of everything a rasterizer needs to draw the map as currently shown
#[derive(Clone, Debug)]
pub struct RasterScene {
    pub center: Location,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub bounds: GeoBounds,
    pub smooth_factor: f64,
    pub tracks: Vec<RasterTrack>,
}

/// trait that defines how the map view gets turned into PNG image data
pub trait Rasterizer {
    /// Render the scene and return the encoded PNG bytes
    fn rasterize(&self, scene: &RasterScene) -> Result<Vec<u8>, Box<dyn std::error::Error>>;
}

/// Return true if the data starts with the PNG file signature
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Create a rasterizer from the handler named in the service configuration
pub fn new_rasterizer(config: &ServiceConfig) -> Result<Box<dyn Rasterizer>, Error> {
    match config.handler() {
        "openmaptiles" => Ok(Box::new(OpenMapTiles::from_config(config)?)),
        "mapbox" => Ok(Box::new(MapBox::from_config(config)?)),
        _ => Err(Error::UnknownServiceHandler(format!(
            "unknown rasterizer handler: {}",
            config.handler()
        ))),
    }
}

/// Bare hex digits of a color for services that only accept hex values, named colors
/// (including the activity colors) are translated and a leading '#' is dropped
pub(crate) fn bare_hex_color(color: &str) -> &str {
    match color.to_ascii_lowercase().as_str() {
        "pink" => "ffc0cb",
        "red" => "ff0000",
        "cyan" => "00ffff",
        "black" => "000000",
        "white" => "ffffff",
        "blue" => "0000ff",
        "green" => "008000",
        "yellow" => "ffff00",
        "orange" => "ffa500",
        "purple" => "800080",
        _ => color.trim_start_matches('#'),
    }
}
