//! A single map session tying the tracks, the camera and the exporter together
use crate::camera::MapCamera;
use crate::export::{ExportArtifact, ExportFormat, ExportSettings, ExportSlot, Exporter};
use crate::gps::Location;
use crate::services::Rasterizer;
use crate::style::StyleOptions;
use crate::track::{TrackHandle, TrackStore};
use crate::view::{ViewController, ViewMode};
use crate::Error;
use log::{debug, info};

/// Owns all mutable state of one map, created when the map is shown and dropped with it
pub struct MapSession<C: MapCamera> {
    camera: C,
    tracks: TrackStore,
    view: ViewController,
    options: StyleOptions,
    exporter: Exporter,
    slot: ExportSlot,
}

impl<C: MapCamera> MapSession<C> {
    pub fn new(camera: C, options: StyleOptions, export: ExportSettings) -> Result<Self, Error> {
        Ok(MapSession {
            camera,
            tracks: TrackStore::new(),
            view: ViewController::new(),
            options,
            exporter: Exporter::new(export)?,
            slot: ExportSlot::default(),
        })
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Mutable camera access for user interaction, call `sync_camera_events` afterwards
    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn tracks(&self) -> &TrackStore {
        &self.tracks
    }

    pub fn options(&self) -> &StyleOptions {
        &self.options
    }

    /// Mode as of the last time camera events were synced
    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    /// Add a parsed track styled from the active options, then recenter if permitted
    pub fn add_track(
        &mut self,
        identifier: impl Into<String>,
        points: Vec<Location>,
    ) -> Result<TrackHandle, Error> {
        let identifier = identifier.into();
        let style = self.options.style_for(&identifier)?;
        let handle = self.tracks.add(identifier, points, style)?;
        self.recenter();
        Ok(handle)
    }

    /// Replace the active options, existing tracks are restyled only when requested. Returns
    /// the handles of the tracks whose style changed and must be redrawn.
    pub fn update_options(&mut self, options: StyleOptions) -> Result<Vec<TrackHandle>, Error> {
        let style = options.base_style()?;
        let restyled = self.tracks.restyle_all(&style, options.override_existing);
        let redraws = self.tracks.take_redraws();
        debug!(
            "Restyled {} tracks, {} need to be redrawn",
            restyled,
            redraws.len()
        );
        self.options = options;
        Ok(redraws)
    }

    /// Forward move-start events emitted by the camera to the view controller
    pub fn sync_camera_events(&mut self) {
        for _ in 0..self.camera.take_move_starts() {
            self.view.handle_move_start();
        }
    }

    /// Treat the next map movement as a user movement
    pub fn handle_move_start(&mut self) {
        self.view.handle_move_start();
    }

    /// Re-arm auto centering, move-starts already emitted by the camera are consumed first
    pub fn clear_scroll(&mut self) {
        self.sync_camera_events();
        self.view.clear_scroll();
    }

    pub fn recenter(&mut self) -> bool {
        self.sync_camera_events();
        self.view.recenter(&mut self.camera, &self.tracks)
    }

    pub fn zoom_to_all(&mut self) -> bool {
        self.sync_camera_events();
        self.view.zoom_to_all(&mut self.camera, &self.tracks)
    }

    /// Apply a location fix that arrived after the map was shown
    pub fn request_initial_location(&mut self, location: Location) -> bool {
        self.sync_camera_events();
        self.view
            .request_initial_location(&mut self.camera, &self.tracks, location)
    }

    /// Export the current view and publish it in the export slot, a failed export leaves the
    /// previous artifact in place.
    pub fn export(
        &mut self,
        format: ExportFormat,
        rasterizer: Option<&dyn Rasterizer>,
    ) -> Result<&ExportArtifact, Error> {
        let artifact = match format {
            ExportFormat::Svg => self.exporter.export_svg(&self.camera, &self.tracks),
            ExportFormat::Png => {
                let rasterizer = rasterizer.ok_or_else(|| {
                    Error::ExportRender("no rasterizer service is configured".to_string())
                })?;
                self.exporter.export_png(
                    &self.camera,
                    &self.tracks,
                    self.options.smooth_factor,
                    rasterizer,
                )?
            }
        };
        info!("Export ready: {}", artifact.file_name());
        Ok(self.slot.publish(artifact))
    }

    pub fn latest_export(&self) -> Option<&ExportArtifact> {
        self.slot.current()
    }
}
