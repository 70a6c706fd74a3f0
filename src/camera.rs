//! Camera interface of the tile map and a spherical mercator implementation of it
use crate::geometry::PixelPoint;
use crate::gps::{GeoBounds, Location};
use log::trace;
use std::f64::consts::PI;
use std::mem;

const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;
const TILE_SIZE: f64 = 256.0;

/// Flags for camera moves issued by the application rather than the user
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveOptions {
    /// animate the transition (renderers without animation ignore it)
    pub animate: bool,
    /// do not emit a move-start event for this move
    pub no_move_start: bool,
}

impl MoveOptions {
    /// Options for a move that must not be mistaken for user interaction
    pub fn programmatic() -> Self {
        MoveOptions {
            animate: false,
            no_move_start: true,
        }
    }
}

/// Operations consumed from the tile/camera engine
pub trait MapCamera {
    /// Center the view on a location
    fn pan_to(&mut self, center: Location, options: MoveOptions);

    /// Move and zoom the view so the bounds are visible
    fn fit_bounds(&mut self, bounds: &GeoBounds, options: MoveOptions);

    /// Top left corner of the view in world pixel coordinates
    fn pixel_origin(&self) -> PixelPoint;

    /// Width and height of the view in pixels
    fn size(&self) -> PixelPoint;

    /// Project a location to world pixel coordinates at the current zoom
    fn project(&self, location: &Location) -> PixelPoint;

    fn zoom(&self) -> f64;

    fn center(&self) -> Location;

    /// Geographic area currently visible
    fn view_bounds(&self) -> GeoBounds;

    /// Drain the number of move-start events emitted since the last call
    fn take_move_starts(&mut self) -> usize;
}

/// A map view using the spherical mercator projection and 256 pixel tiles
#[derive(Clone, Debug)]
pub struct WebMercatorMap {
    center: Location,
    zoom: f64,
    size: PixelPoint,
    min_zoom: f64,
    max_zoom: f64,
    padding: f64,
    move_starts: usize,
}

impl WebMercatorMap {
    pub fn new(center: Location, zoom: f64, width: u32, height: u32) -> Self {
        WebMercatorMap {
            center,
            zoom,
            size: PixelPoint::new(width as f64, height as f64),
            min_zoom: 0.0,
            max_zoom: 18.0,
            padding: 0.0,
            move_starts: 0,
        }
    }

    /// Zoom range allowed when fitting bounds
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.max(self.min_zoom).min(self.max_zoom);
    }

    /// Pixels left free around the bounds when fitting
    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding.max(0.0);
    }

    /// Drag the map by a pixel offset, as the user would
    pub fn pan_by(&mut self, offset: PixelPoint) {
        self.move_starts += 1;
        let target = self.project(&self.center) + offset;
        self.center = self.unproject_at(&target, self.zoom);
    }

    /// Change the zoom level around the current center, as the user would
    pub fn zoom_to(&mut self, zoom: f64) {
        self.move_starts += 1;
        self.zoom = zoom.max(self.min_zoom).min(self.max_zoom);
    }

    fn project_at(&self, location: &Location, zoom: f64) -> PixelPoint {
        let d = PI / 180.0;
        let lat = location.latitude().max(-MAX_LATITUDE).min(MAX_LATITUDE);
        let sin_lat = (lat * d).sin();
        let x = EARTH_RADIUS * location.longitude() * d;
        let y = EARTH_RADIUS * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / 2.0;

        let scale = TILE_SIZE * 2f64.powf(zoom);
        let k = 0.5 / (PI * EARTH_RADIUS);
        PixelPoint::new(scale * (k * x + 0.5), scale * (-k * y + 0.5))
    }

    fn unproject_at(&self, point: &PixelPoint, zoom: f64) -> Location {
        let scale = TILE_SIZE * 2f64.powf(zoom);
        let k = 0.5 / (PI * EARTH_RADIUS);
        let x = (point.x / scale - 0.5) / k;
        let y = (point.y / scale - 0.5) / -k;

        let d = 180.0 / PI;
        Location::new(
            (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0) * d,
            x * d / EARTH_RADIUS,
        )
    }

    /// Highest zoom level at which the bounds fit inside the padded view
    fn bounds_zoom(&self, bounds: &GeoBounds) -> f64 {
        let nw = Location::new(bounds.north_east().latitude(), bounds.south_west().longitude());
        let se = Location::new(bounds.south_west().latitude(), bounds.north_east().longitude());
        let extent = self.project_at(&se, 0.0) - self.project_at(&nw, 0.0);
        let available = PixelPoint::new(
            (self.size.x - 2.0 * self.padding).max(1.0),
            (self.size.y - 2.0 * self.padding).max(1.0),
        );
        let ratio = (available.x / extent.x.abs()).min(available.y / extent.y.abs());
        if !ratio.is_finite() {
            return self.max_zoom;
        }
        ratio.log2().floor().max(self.min_zoom).min(self.max_zoom)
    }
}

impl MapCamera for WebMercatorMap {
    fn pan_to(&mut self, center: Location, options: MoveOptions) {
        trace!("Panning to {:?} (animate={})", center, options.animate);
        if !options.no_move_start {
            self.move_starts += 1;
        }
        self.center = center;
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds, options: MoveOptions) {
        let zoom = self.bounds_zoom(bounds);
        let sw = self.project_at(&bounds.south_west(), zoom);
        let ne = self.project_at(&bounds.north_east(), zoom);
        let middle = (sw + ne).divide_by(2.0);
        trace!("Fitting bounds {:?} at zoom {}", bounds, zoom);
        if !options.no_move_start {
            self.move_starts += 1;
        }
        self.zoom = zoom;
        self.center = self.unproject_at(&middle, zoom);
    }

    fn pixel_origin(&self) -> PixelPoint {
        (self.project(&self.center) - self.size.divide_by(2.0)).round()
    }

    fn size(&self) -> PixelPoint {
        self.size
    }

    fn project(&self, location: &Location) -> PixelPoint {
        self.project_at(location, self.zoom)
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> Location {
        self.center
    }

    fn view_bounds(&self) -> GeoBounds {
        let origin = self.pixel_origin();
        let mut bounds = GeoBounds::from_location(self.unproject_at(&origin, self.zoom));
        bounds.extend(&self.unproject_at(&(origin + self.size), self.zoom));
        bounds
    }

    fn take_move_starts(&mut self) -> usize {
        mem::take(&mut self.move_starts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn projects_origin_to_world_center() {
        let map = WebMercatorMap::new(Location::new(0.0, 0.0), 0.0, 256, 256);
        let p = map.project(&Location::new(0.0, 0.0));
        assert_close(p.x, 128.0);
        assert_close(p.y, 128.0);
        assert_eq!(map.pixel_origin(), PixelPoint::new(0.0, 0.0));
    }

    #[test]
    fn unproject_inverts_project() {
        let map = WebMercatorMap::new(Location::new(0.0, 0.0), 12.0, 800, 600);
        let loc = Location::new(39.4705, -80.1402);
        let back = map.unproject_at(&map.project(&loc), 12.0);
        assert_close(back.latitude(), loc.latitude());
        assert_close(back.longitude(), loc.longitude());
    }

    #[test]
    fn fit_bounds_shows_the_whole_area() {
        let mut map = WebMercatorMap::new(Location::new(0.0, 0.0), 2.0, 800, 600);
        let bounds = GeoBounds::from_locations(&[
            Location::new(39.46, -80.15),
            Location::new(39.49, -80.12),
        ])
        .unwrap();
        map.fit_bounds(&bounds, MoveOptions::programmatic());
        assert!(map.zoom() > 2.0);
        assert!(map.view_bounds().contains_bounds(&bounds));
        assert_eq!(map.take_move_starts(), 0);
    }

    #[test]
    fn fit_single_point_uses_max_zoom() {
        let mut map = WebMercatorMap::new(Location::new(0.0, 0.0), 2.0, 800, 600);
        map.set_zoom_limits(0.0, 16.0);
        let bounds = GeoBounds::from_location(Location::new(51.5, -0.12));
        map.fit_bounds(&bounds, MoveOptions::programmatic());
        assert_eq!(map.zoom(), 16.0);
    }

    #[test]
    fn user_gestures_emit_move_starts() {
        let mut map = WebMercatorMap::new(Location::new(0.0, 0.0), 4.0, 800, 600);
        map.pan_by(PixelPoint::new(50.0, 0.0));
        map.zoom_to(6.0);
        map.pan_to(Location::new(1.0, 1.0), MoveOptions::default());
        assert_eq!(map.take_move_starts(), 3);
        assert_eq!(map.take_move_starts(), 0);
        assert!(map.center().longitude() > 0.0);
    }
}
