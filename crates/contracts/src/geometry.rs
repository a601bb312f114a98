//! Ground geometry: geodetic points, field-of-view footprints and coverage polygons.
//!
//! Planar operations on these types treat longitude as `x` and latitude as `y`.

use serde::{Deserialize, Serialize};

/// Geodetic point (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Squared planar distance in coordinate units
    #[inline]
    pub fn distance_squared(&self, other: &GeoPoint) -> f64 {
        (self.lng - other.lng).powi(2) + (self.lat - other.lat).powi(2)
    }
}

/// Ground quadrilateral visible to the camera in one frame
///
/// Corner order: 0 top-left, 1 top-right, 2 bottom-right, 3 bottom-left of the
/// image. Image rows run from edge 0-1 to edge 3-2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovFootprint {
    pub corners: [GeoPoint; 4],
}

impl FovFootprint {
    pub fn new(corners: [GeoPoint; 4]) -> Self {
        Self { corners }
    }

    /// Closed ring: the four corners followed by the first one again
    pub fn ring(&self) -> Vec<GeoPoint> {
        let mut ring = Vec::with_capacity(5);
        ring.extend_from_slice(&self.corners);
        ring.push(self.corners[0]);
        ring
    }

    /// Polygon with the footprint as exterior ring (not yet corrected)
    pub fn to_polygon(&self) -> GeoPolygon {
        GeoPolygon::new(self.ring())
    }
}

/// Simple polygon: one exterior ring plus optional holes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    pub exterior: Vec<GeoPoint>,

    #[serde(default)]
    pub interiors: Vec<Vec<GeoPoint>>,
}

impl GeoPolygon {
    pub fn new(exterior: Vec<GeoPoint>) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    /// Planar area of the exterior minus holes, in squared coordinate units
    pub fn area(&self) -> f64 {
        let holes: f64 = self.interiors.iter().map(|ring| ring_area(ring)).sum();
        (ring_area(&self.exterior) - holes).max(0.0)
    }
}

/// Absolute shoelace area of a ring (closing point optional)
pub fn ring_area(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.lng * b.lat - b.lng * a.lat)
        .sum();
    twice.abs() / 2.0
}

/// Polygon boolean-union capability
///
/// Implemented by a geometry library adapter; swapped for a deterministic
/// stub in tests.
pub trait PolygonUnion {
    /// Normalize ring closure and winding so the polygon is valid for `union`
    fn correct(&self, polygon: GeoPolygon) -> GeoPolygon;

    /// Union of two valid polygons; disjoint inputs yield more than one polygon
    fn union(&self, a: &GeoPolygon, b: &GeoPolygon) -> Vec<GeoPolygon>;
}

impl<U: PolygonUnion + ?Sized> PolygonUnion for Box<U> {
    fn correct(&self, polygon: GeoPolygon) -> GeoPolygon {
        (**self).correct(polygon)
    }

    fn union(&self, a: &GeoPolygon, b: &GeoPolygon) -> Vec<GeoPolygon> {
        (**self).union(a, b)
    }
}
