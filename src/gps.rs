//! Module with GPS specific structures
use serde::{Deserialize, Serialize};
use std::char;

/// Stores a single geospatial point
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// latitude coordinate in degrees
    latitude: f64,
    /// longitude coordinate in degrees
    longitude: f64,
}

impl Location {
    /// Create a location from coordinates in degrees
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
        }
    }

    /// Create a location from coordinates provided in semicircles units
    pub fn from_fit_coordinates(latitude: i32, longitude: i32) -> Self {
        Location {
            latitude: (latitude as f64) * 180.0 / 2147483648.0,
            longitude: (longitude as f64) * 180.0 / 2147483648.0,
        }
    }

    /// Return latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Return longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Geographic rectangle spanned by a south west and north east corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    south_west: Location,
    north_east: Location,
}

impl GeoBounds {
    /// Create bounds covering a single location
    pub fn from_location(location: Location) -> Self {
        GeoBounds {
            south_west: location,
            north_east: location,
        }
    }

    /// Create bounds covering every location in the slice, None if it's empty
    pub fn from_locations(locations: &[Location]) -> Option<Self> {
        let (first, rest) = locations.split_first()?;
        let mut bounds = GeoBounds::from_location(*first);
        for location in rest {
            bounds.extend(location);
        }
        Some(bounds)
    }

    pub fn south_west(&self) -> Location {
        self.south_west
    }

    pub fn north_east(&self) -> Location {
        self.north_east
    }

    /// Grow the bounds so they include the location
    pub fn extend(&mut self, location: &Location) {
        self.south_west = Location::new(
            self.south_west.latitude.min(location.latitude),
            self.south_west.longitude.min(location.longitude),
        );
        self.north_east = Location::new(
            self.north_east.latitude.max(location.latitude),
            self.north_east.longitude.max(location.longitude),
        );
    }

    /// Grow the bounds so they include another set of bounds
    pub fn union(&mut self, other: &GeoBounds) {
        self.extend(&other.south_west);
        self.extend(&other.north_east);
    }

    /// Return true if the location lies inside or on the edge of the bounds
    pub fn contains(&self, location: &Location) -> bool {
        location.latitude >= self.south_west.latitude
            && location.latitude <= self.north_east.latitude
            && location.longitude >= self.south_west.longitude
            && location.longitude <= self.north_east.longitude
    }

    /// Return true if other lies entirely within these bounds
    pub fn contains_bounds(&self, other: &GeoBounds) -> bool {
        self.contains(&other.south_west) && self.contains(&other.north_east)
    }
}

/// Encodes a slice of coordinates into Google Encoded Polyline format.
///
/// This code was extracted and simplified for our use case from:
/// https://github.com/georust/polyline
/// https://developers.google.com/maps/documentation/utilities/polylinealgorithm
pub fn encode_coordinates(coordinates: &[Location]) -> Result<String, String> {
    let mut output = String::new();
    let mut b = (0, 0);

    for a in coordinates {
        let a = (scale(a.latitude), scale(a.longitude));
        output.push_str(&encode(a.0, b.0)?);
        output.push_str(&encode(a.1, b.1)?);
        b = a;
    }

    Ok(output)
}

/// Scale a floating point value into an integer at the given precision
#[inline]
fn scale(n: f64) -> i64 {
    static FACTOR: f64 = 100_000.0; // use 5 digits of precision
    (FACTOR * n).round() as i64
}

/// Encode a single latitude or longitude value into the polyline format
fn encode(current: i64, previous: i64) -> Result<String, String> {
    let mut coordinate = (current - previous) << 1;
    if (current - previous) < 0 {
        coordinate = !coordinate;
    }
    let mut output = String::new();
    while coordinate >= 0x20 {
        let from_char = char::from_u32(((0x20 | (coordinate & 0x1f)) + 63) as u32)
            .ok_or("Couldn't convert character")?;
        output.push(from_char);
        coordinate >>= 5;
    }
    let from_char = char::from_u32((coordinate + 63) as u32).ok_or("Couldn't convert character")?;
    output.push(from_char);
    Ok(output)
}
