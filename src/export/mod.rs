//! Convert the map view and its tracks into a downloadable PNG or SVG image
use crate::camera::MapCamera;
use crate::geometry::{project_point, reduce_points, PixelBounds};
use crate::services::raster::{is_png, RasterScene, RasterTrack, Rasterizer};
use crate::track::TrackStore;
use crate::Error;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
mod svg;
pub use svg::{to_svg, SvgPath};

/// Base name of every exported file
pub const EXPORT_FILE_STEM: &str = "derive-export";

/// Output formats supported by the exporter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "application/octet-stream",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", EXPORT_FILE_STEM, self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(Error::Other(format!("unknown export format: {}", s))),
        }
    }
}

/// A finished export ready to be handed to the user
#[derive(Clone, Debug, PartialEq)]
pub struct ExportArtifact {
    format: ExportFormat,
    data: Vec<u8>,
}

impl ExportArtifact {
    pub fn new(format: ExportFormat, data: Vec<u8>) -> Self {
        ExportArtifact { format, data }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn file_name(&self) -> String {
        self.format.file_name()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Write the artifact into a directory under its export file name
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, Error> {
        let path = dir.join(self.file_name());
        let mut fp = File::create(&path)?;
        fp.write_all(&self.data)?;
        info!("Wrote {} bytes to {:?}", self.data.len(), path);
        Ok(path)
    }
}

/// Holds the most recent export, a new export replaces the previous one in a single step
#[derive(Debug, Default)]
pub struct ExportSlot {
    current: Option<ExportArtifact>,
}

impl ExportSlot {
    pub fn publish(&mut self, artifact: ExportArtifact) -> &ExportArtifact {
        self.current.insert(artifact)
    }

    pub fn current(&self) -> Option<&ExportArtifact> {
        self.current.as_ref()
    }
}

/// Tunables for the vector export
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// magnification applied to the visible map for higher resolution output
    pub scale: f64,
    /// points are snapped to a grid of 1 / grid_resolution pixels
    pub grid_resolution: f64,
}

impl ExportSettings {
    /// Both values must be finite and positive for the projected points to be usable
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in &[("scale", self.scale), ("grid_resolution", self.grid_resolution)] {
            if !value.is_finite() || *value <= 0.0 {
                return Err(Error::InvalidConfigurationValue(format!(
                    "export.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            scale: 2.0,
            grid_resolution: 10.0,
        }
    }
}

/// Builds export artifacts from a read only view of the session
#[derive(Clone, Copy, Debug, Default)]
pub struct Exporter {
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Result<Self, Error> {
        settings.validate()?;
        Ok(Exporter { settings })
    }

    pub fn settings(&self) -> ExportSettings {
        self.settings
    }

    /// Pixel space rectangle of the exported image at export scale
    pub fn viewport<C: MapCamera + ?Sized>(&self, camera: &C) -> PixelBounds {
        PixelBounds::from_origin_size(
            camera.pixel_origin().multiply_by(self.settings.scale),
            camera.size().multiply_by(self.settings.scale),
        )
    }

    /// Render every track with at least one point inside of the viewport as an SVG path
    pub fn export_svg<C: MapCamera + ?Sized>(
        &self,
        camera: &C,
        store: &TrackStore,
    ) -> ExportArtifact {
        let viewport = self.viewport(camera);
        let mut paths = Vec::new();
        for track in store.iter() {
            let points = reduce_points(
                track
                    .points()
                    .iter()
                    .map(|p| project_point(camera, p, self.settings.scale)),
                self.settings.grid_resolution,
            );
            if !viewport.contains_any(&points) {
                debug!("Track '{}' is outside of the export area", track.identifier());
                continue;
            }
            paths.push(SvgPath::new(points, track.style()));
        }
        info!("Exporting {} of {} tracks as SVG", paths.len(), store.len());
        ExportArtifact::new(ExportFormat::Svg, to_svg(&viewport, &paths).into_bytes())
    }

    /// Hand a snapshot of the map to the rasterizer and wrap the resulting PNG
    pub fn export_png<C: MapCamera + ?Sized>(
        &self,
        camera: &C,
        store: &TrackStore,
        smooth_factor: f64,
        rasterizer: &dyn Rasterizer,
    ) -> Result<ExportArtifact, Error> {
        let scene = raster_scene(camera, store, smooth_factor);
        let data = rasterizer.rasterize(&scene).map_err(|e| {
            error!("Map rasterization failed: {}", e);
            Error::ExportRender(e.to_string())
        })?;
        if !is_png(&data) {
            return Err(Error::ExportRender(
                "rasterizer did not return PNG image data".to_string(),
            ));
        }
        info!("Exporting map as PNG ({} bytes)", data.len());
        Ok(ExportArtifact::new(ExportFormat::Png, data))
    }
}

/// Copy the camera state and all tracks into a self contained scene
pub fn raster_scene<C: MapCamera + ?Sized>(
    camera: &C,
    store: &TrackStore,
    smooth_factor: f64,
) -> RasterScene {
    let size = camera.size();
    RasterScene {
        center: camera.center(),
        zoom: camera.zoom(),
        width: size.x.round() as u32,
        height: size.y.round() as u32,
        bounds: camera.view_bounds(),
        smooth_factor,
        tracks: store
            .iter()
            .map(|t| RasterTrack {
                points: t.points().to_vec(),
                style: t.style().clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::WebMercatorMap;
    use crate::gps::Location;
    use crate::services::raster::PNG_SIGNATURE;
    use crate::style::StyleSpec;

    struct StubRasterizer(Result<Vec<u8>, String>);

    impl Rasterizer for StubRasterizer {
        fn rasterize(&self, scene: &RasterScene) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
            assert_eq!(scene.tracks.len(), 1);
            self.0
                .clone()
                .map_err(|msg| Box::new(Error::Other(msg)) as Box<dyn std::error::Error>)
        }
    }

    fn camera() -> WebMercatorMap {
        WebMercatorMap::new(Location::new(45.0, 7.0), 10.0, 800, 600)
    }

    fn store_with(tracks: &[(&str, Vec<Location>, StyleSpec)]) -> TrackStore {
        let mut store = TrackStore::new();
        for (name, points, style) in tracks {
            store.add(*name, points.clone(), style.clone()).unwrap();
        }
        store
    }

    fn path_count(svg: &str) -> usize {
        svg.matches("<path ").count()
    }

    #[test]
    fn only_visible_tracks_are_exported() {
        let red = StyleSpec::new("red", 2.0, 0.5).unwrap();
        let cyan = StyleSpec::new("cyan", 4.0, 0.9).unwrap();
        let pink = StyleSpec::new("pink", 1.0, 1.0).unwrap();
        let store = store_with(&[
            ("a", vec![Location::new(45.0, 7.0), Location::new(45.01, 7.01)], red),
            ("b", vec![Location::new(44.99, 6.99), Location::new(44.98, 6.98)], cyan),
            ("c", vec![Location::new(-30.0, 120.0), Location::new(-30.1, 120.1)], pink),
        ]);
        let artifact = Exporter::default().export_svg(&camera(), &store);
        let svg = String::from_utf8(artifact.data().to_vec()).unwrap();

        assert_eq!(artifact.file_name(), "derive-export.svg");
        assert_eq!(artifact.content_type(), "application/octet-stream");
        assert_eq!(path_count(&svg), 2);
        assert!(svg.contains(r#"stroke="red" stroke-opacity="0.5" stroke-width="2""#));
        assert!(svg.contains(r#"stroke="cyan" stroke-opacity="0.9" stroke-width="4""#));
        assert!(!svg.contains(r#"stroke="pink""#));
    }

    #[test]
    fn export_uses_current_track_styles() {
        let red = StyleSpec::new("red", 2.0, 0.5).unwrap();
        let cyan = StyleSpec::new("cyan", 4.0, 0.9).unwrap();
        let mut store = store_with(&[
            ("a", vec![Location::new(45.0, 7.0), Location::new(45.01, 7.01)], red),
            ("b", vec![Location::new(44.99, 6.99), Location::new(44.98, 6.98)], cyan),
        ]);
        let restyled = StyleSpec::new("#112233", 6.0, 0.25).unwrap();
        store.restyle_all(&restyled, true);

        let artifact = Exporter::default().export_svg(&camera(), &store);
        let svg = String::from_utf8(artifact.data().to_vec()).unwrap();
        assert_eq!(path_count(&svg), 2);
        assert_eq!(
            svg.matches(r##"stroke="#112233" stroke-opacity="0.25" stroke-width="6""##)
                .count(),
            2
        );
        assert!(!svg.contains(r#"stroke="red""#));
        assert!(!svg.contains(r#"stroke="cyan""#));
    }

    #[test]
    fn settings_must_be_positive() {
        assert!(Exporter::new(ExportSettings::default()).is_ok());
        for (scale, grid_resolution) in &[(0.0, 10.0), (-2.0, 10.0), (2.0, 0.0), (2.0, f64::NAN)] {
            let settings = ExportSettings {
                scale: *scale,
                grid_resolution: *grid_resolution,
            };
            match Exporter::new(settings) {
                Err(Error::InvalidConfigurationValue(_)) => {}
                other => panic!("unexpected result for {:?}: {:?}", settings, other),
            }
        }
    }

    #[test]
    fn track_with_a_single_visible_point_is_included() {
        let style = StyleSpec::new("red", 2.0, 0.5).unwrap();
        let store = store_with(&[(
            "a",
            vec![Location::new(-30.0, 120.0), Location::new(45.0, 7.0)],
            style,
        )]);
        let svg = Exporter::default().export_svg(&camera(), &store);
        assert_eq!(path_count(&String::from_utf8_lossy(svg.data())), 1);
    }

    #[test]
    fn whole_world_viewport_includes_every_track() {
        let style = StyleSpec::new("red", 2.0, 0.5).unwrap();
        let store = store_with(&[
            ("a", vec![Location::new(60.0, -150.0)], style.clone()),
            ("b", vec![Location::new(-40.0, 170.0)], style.clone()),
            ("c", vec![Location::new(0.0, 0.0)], style),
        ]);
        let world = WebMercatorMap::new(Location::new(0.0, 0.0), 0.0, 256, 256);
        let svg = Exporter::default().export_svg(&world, &store);
        assert_eq!(path_count(&String::from_utf8_lossy(svg.data())), 3);
    }

    #[test]
    fn viewport_is_scaled_pixel_bounds() {
        let map = camera();
        let viewport = Exporter::default().viewport(&map);
        assert_eq!(viewport.min(), map.pixel_origin().multiply_by(2.0));
        assert_eq!(viewport.size(), map.size().multiply_by(2.0));
    }

    #[test]
    fn exported_points_are_deduplicated() {
        let style = StyleSpec::new("red", 2.0, 0.5).unwrap();
        // ten points a few centimeters apart collapse into one grid cell
        let points = (0..10)
            .map(|i| Location::new(45.0 + i as f64 * 1e-9, 7.0))
            .collect();
        let store = store_with(&[("a", points, style)]);
        let svg = Exporter::default().export_svg(&camera(), &store);
        let svg = String::from_utf8_lossy(svg.data()).to_string();
        assert!(!svg.contains(" L"));
    }

    #[test]
    fn png_export_wraps_rasterizer_output() {
        let style = StyleSpec::new("red", 2.0, 0.5).unwrap();
        let store = store_with(&[("a", vec![Location::new(45.0, 7.0)], style)]);
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"rest");

        let artifact = Exporter::default()
            .export_png(&camera(), &store, 1.0, &StubRasterizer(Ok(png.clone())))
            .unwrap();
        assert_eq!(artifact.file_name(), "derive-export.png");
        assert_eq!(artifact.content_type(), "image/png");
        assert_eq!(artifact.data(), &png[..]);
    }

    #[test]
    fn png_export_surfaces_render_errors() {
        let style = StyleSpec::new("red", 2.0, 0.5).unwrap();
        let store = store_with(&[("a", vec![Location::new(45.0, 7.0)], style)]);
        let failing = StubRasterizer(Err("tainted canvas".to_string()));
        match Exporter::default().export_png(&camera(), &store, 1.0, &failing) {
            Err(Error::ExportRender(msg)) => assert!(msg.contains("tainted canvas")),
            other => panic!("unexpected result: {:?}", other),
        }
        let not_png = StubRasterizer(Ok(b"<html>".to_vec()));
        assert!(Exporter::default()
            .export_png(&camera(), &store, 1.0, &not_png)
            .is_err());
    }

    #[test]
    fn slot_keeps_only_the_latest_export() {
        let mut slot = ExportSlot::default();
        assert!(slot.current().is_none());
        slot.publish(ExportArtifact::new(ExportFormat::Svg, b"first".to_vec()));
        let latest = slot.publish(ExportArtifact::new(ExportFormat::Png, b"second".to_vec()));
        assert_eq!(latest.data(), b"second");
        assert_eq!(slot.current().unwrap().format(), ExportFormat::Png);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("SVG".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("jpeg".parse::<ExportFormat>().is_err());
    }
}
