//! Screen space geometry used when exporting the map view
use crate::camera::MapCamera;
use crate::gps::Location;
use std::ops::{Add, Sub};

/// A projected coordinate in pixel space, not geographic
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PixelPoint { x, y }
    }

    pub fn multiply_by(self, factor: f64) -> Self {
        PixelPoint::new(self.x * factor, self.y * factor)
    }

    pub fn divide_by(self, factor: f64) -> Self {
        PixelPoint::new(self.x / factor, self.y / factor)
    }

    pub fn round(self) -> Self {
        PixelPoint::new(self.x.round(), self.y.round())
    }
}

impl Add for PixelPoint {
    type Output = PixelPoint;

    fn add(self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for PixelPoint {
    type Output = PixelPoint;

    fn sub(self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x - other.x, self.y - other.y)
    }
}

/// Axis aligned rectangle in pixel space, edges are inclusive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelBounds {
    min: PixelPoint,
    max: PixelPoint,
}

impl PixelBounds {
    /// Create bounds from two opposite corners in any order
    pub fn new(a: PixelPoint, b: PixelPoint) -> Self {
        PixelBounds {
            min: PixelPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: PixelPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create bounds from a top left origin and a size
    pub fn from_origin_size(origin: PixelPoint, size: PixelPoint) -> Self {
        PixelBounds::new(origin, origin + size)
    }

    pub fn min(&self) -> PixelPoint {
        self.min
    }

    pub fn max(&self) -> PixelPoint {
        self.max
    }

    pub fn size(&self) -> PixelPoint {
        self.max - self.min
    }

    pub fn contains(&self, point: &PixelPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Return true if at least one of the points falls inside the bounds
    pub fn contains_any(&self, points: &[PixelPoint]) -> bool {
        points.iter().any(|p| self.contains(p))
    }
}

/// Project a location into the camera's pixel space magnified by `scale`
pub fn project_point<C: MapCamera + ?Sized>(
    camera: &C,
    location: &Location,
    scale: f64,
) -> PixelPoint {
    camera.project(location).multiply_by(scale)
}

/// Snap points onto a grid of `1 / resolution` pixels and drop any point that lands on the
/// same grid cell as the point before it.
///
/// The output is never longer than the input and applying the reduction a second time
/// leaves it unchanged.
pub fn reduce_points<I>(points: I, resolution: f64) -> Vec<PixelPoint>
where
    I: IntoIterator<Item = PixelPoint>,
{
    let mut reduced: Vec<PixelPoint> = Vec::new();
    for point in points {
        let snapped = point.multiply_by(resolution).round().divide_by(resolution);
        if reduced.last() != Some(&snapped) {
            reduced.push(snapped);
        }
    }
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<PixelPoint> {
        raw.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect()
    }

    #[test]
    fn reducer_collapses_points_in_same_cell() {
        let input = pts(&[(1.01, 2.02), (1.04, 1.98), (1.06, 2.0), (5.57, 7.0)]);
        let reduced = reduce_points(input.clone(), 10.0);
        assert_eq!(reduced, pts(&[(1.0, 2.0), (1.1, 2.0), (5.6, 7.0)]));
        assert!(reduced.len() <= input.len());
    }

    #[test]
    fn reducer_keeps_non_consecutive_repeats() {
        let input = pts(&[(0.0, 0.0), (3.0, 0.0), (0.0, 0.0)]);
        assert_eq!(reduce_points(input.clone(), 10.0), input);
    }

    #[test]
    fn reducer_is_idempotent() {
        let input: Vec<PixelPoint> = (0..500)
            .map(|i| {
                let t = i as f64 * 0.037;
                PixelPoint::new(1234.5678 + t.sin() * 3.3, -987.654 + t * 0.21)
            })
            .collect();
        let once = reduce_points(input.clone(), 10.0);
        let twice = reduce_points(once.clone(), 10.0);
        assert_eq!(once, twice);
        assert!(once.len() <= input.len());
        assert!(once.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn reducer_handles_empty_input() {
        assert!(reduce_points(Vec::new(), 10.0).is_empty());
    }

    #[test]
    fn clipper_edges_are_inclusive() {
        let bounds =
            PixelBounds::from_origin_size(PixelPoint::new(0.0, 0.0), PixelPoint::new(10.0, 5.0));
        assert!(bounds.contains(&PixelPoint::new(10.0, 5.0)));
        assert!(bounds.contains(&PixelPoint::new(0.0, 0.0)));
        assert!(!bounds.contains(&PixelPoint::new(10.1, 5.0)));
    }

    #[test]
    fn clipper_needs_a_single_point_inside() {
        let bounds = PixelBounds::new(PixelPoint::new(100.0, 100.0), PixelPoint::new(0.0, 0.0));
        let outside = pts(&[(-5.0, 50.0), (150.0, 50.0), (50.0, 200.0)]);
        let one_inside = pts(&[(-5.0, 50.0), (50.0, 50.0), (50.0, 200.0)]);
        assert!(!bounds.contains_any(&outside));
        assert!(bounds.contains_any(&one_inside));
        assert!(!bounds.contains_any(&[]));
    }
}
