//! Append only storage for the tracks drawn on the map
use crate::gps::{GeoBounds, Location};
use crate::style::StyleSpec;
use crate::Error;
use log::{debug, trace};

/// Refers to a track inside of a `TrackStore`, tracks are never removed so handles stay valid
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TrackHandle(usize);

impl TrackHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A recorded path drawn as a single polyline
#[derive(Clone, Debug)]
pub struct Track {
    identifier: String,
    points: Vec<Location>,
    bounds: GeoBounds,
    style: StyleSpec,
    redraw: bool,
}

impl Track {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn points(&self) -> &[Location] {
        &self.points
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn style(&self) -> &StyleSpec {
        &self.style
    }

    /// True when the style changed since the track was last drawn
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }
}

/// Ordered collection of overlay tracks
#[derive(Clone, Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
}

impl TrackStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append a new track, a track without points is rejected
    pub fn add(
        &mut self,
        identifier: impl Into<String>,
        points: Vec<Location>,
        style: StyleSpec,
    ) -> Result<TrackHandle, Error> {
        let identifier = identifier.into();
        let bounds = match GeoBounds::from_locations(&points) {
            Some(bounds) => bounds,
            None => return Err(Error::EmptyTrack(identifier)),
        };
        let handle = TrackHandle(self.tracks.len());
        debug!(
            "Adding track '{}' with {} points as #{}",
            identifier,
            points.len(),
            handle.index()
        );
        self.tracks.push(Track {
            identifier,
            points,
            bounds,
            style,
            redraw: false,
        });
        Ok(handle)
    }

    /// Replace the style of every track when `override_existing` is set, returns the number
    /// of tracks restyled.
    pub fn restyle_all(&mut self, style: &StyleSpec, override_existing: bool) -> usize {
        if !override_existing {
            trace!("Leaving existing track styles untouched");
            return 0;
        }
        for track in &mut self.tracks {
            track.style = style.clone();
            track.redraw = true;
        }
        self.tracks.len()
    }

    /// Smallest bounds covering every point of every track, None if the store is empty
    pub fn aggregate_bounds(&self) -> Option<GeoBounds> {
        let mut iter = self.tracks.iter();
        let mut bounds = iter.next()?.bounds;
        for track in iter {
            bounds.union(&track.bounds);
        }
        Some(bounds)
    }

    /// Handles of every track marked for redraw, clearing the marks
    pub fn take_redraws(&mut self) -> Vec<TrackHandle> {
        self.tracks
            .iter_mut()
            .enumerate()
            .filter(|(_, t)| t.redraw)
            .map(|(idx, t)| {
                t.redraw = false;
                TrackHandle(idx)
            })
            .collect()
    }

    /// Whether "zoom to all" has anything to zoom to
    pub fn can_zoom_to_all(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn get(&self, handle: TrackHandle) -> Option<&Track> {
        self.tracks.get(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
