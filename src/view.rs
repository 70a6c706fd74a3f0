//! Decide when the camera may follow newly added tracks and when the user is in control
use crate::camera::{MapCamera, MoveOptions};
use crate::gps::Location;
use crate::track::TrackStore;
use log::{debug, trace};

/// Camera states derived from the scrolled flag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// auto centering on the tracks is permitted
    Following,
    /// the user has moved the map and auto centering is suspended
    Manual,
}

/// View state of a single map session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub scrolled: bool,
    pub has_tracks: bool,
}

/// Owns the following/manual latch and issues programmatic camera moves
#[derive(Debug, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn mode(&self) -> ViewMode {
        if self.state.scrolled {
            ViewMode::Manual
        } else {
            ViewMode::Following
        }
    }

    /// A move started that was not flagged as programmatic, the user takes control
    pub fn handle_move_start(&mut self) {
        if !self.state.scrolled {
            debug!("User moved the map, disabling auto centering");
        }
        self.state.scrolled = true;
    }

    /// Re-arm auto centering regardless of the current mode
    pub fn clear_scroll(&mut self) {
        self.state.scrolled = false;
    }

    /// Fit the camera to all tracks unless the user has taken control, returns true if the
    /// camera was moved.
    pub fn recenter<C: MapCamera + ?Sized>(&mut self, camera: &mut C, store: &TrackStore) -> bool {
        self.state.has_tracks = !store.is_empty();
        if self.mode() == ViewMode::Manual {
            trace!("Skipping recenter, map is under user control");
            return false;
        }
        self.fit_to_tracks(camera, store)
    }

    /// Fit the camera to all tracks even if the user has moved the map
    pub fn zoom_to_all<C: MapCamera + ?Sized>(
        &mut self,
        camera: &mut C,
        store: &TrackStore,
    ) -> bool {
        self.state.has_tracks = !store.is_empty();
        self.fit_to_tracks(camera, store)
    }

    /// Pan to a late arriving location fix, only while following and before any track is
    /// shown. Returns true if the camera was moved.
    pub fn request_initial_location<C: MapCamera + ?Sized>(
        &mut self,
        camera: &mut C,
        store: &TrackStore,
        location: Location,
    ) -> bool {
        self.state.has_tracks = !store.is_empty();
        if self.mode() == ViewMode::Manual || self.state.has_tracks {
            trace!("Ignoring location fix {:?}", location);
            return false;
        }
        debug!("Panning to initial location {:?}", location);
        camera.pan_to(location, MoveOptions::programmatic());
        self.clear_scroll();
        true
    }

    fn fit_to_tracks<C: MapCamera + ?Sized>(&mut self, camera: &mut C, store: &TrackStore) -> bool {
        let bounds = match store.aggregate_bounds() {
            Some(bounds) => bounds,
            None => return false,
        };
        camera.fit_bounds(&bounds, MoveOptions::programmatic());
        self.clear_scroll();
        true
    }
}
