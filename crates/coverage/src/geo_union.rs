//! `PolygonUnion` adapter over the `geo` crate.

use contracts::{GeoPoint, GeoPolygon, PolygonUnion};
use geo::algorithm::orient::{Direction, Orient};
use geo::{BooleanOps, Coord, LineString, Polygon};

/// Boolean union backed by `geo`'s sweep-line implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoUnion;

impl GeoUnion {
    pub fn new() -> Self {
        Self
    }
}

impl PolygonUnion for GeoUnion {
    fn correct(&self, polygon: GeoPolygon) -> GeoPolygon {
        from_geo(&to_geo(&polygon).orient(Direction::Default))
    }

    fn union(&self, a: &GeoPolygon, b: &GeoPolygon) -> Vec<GeoPolygon> {
        to_geo(a)
            .union(&to_geo(b))
            .0
            .iter()
            .map(from_geo)
            .collect()
    }
}

fn to_line_string(ring: &[GeoPoint]) -> LineString<f64> {
    LineString::new(
        ring.iter()
            .map(|p| Coord { x: p.lng, y: p.lat })
            .collect(),
    )
}

fn from_line_string(ring: &LineString<f64>) -> Vec<GeoPoint> {
    ring.coords().map(|c| GeoPoint::new(c.y, c.x)).collect()
}

/// `Polygon::new` closes every ring
fn to_geo(polygon: &GeoPolygon) -> Polygon<f64> {
    Polygon::new(
        to_line_string(&polygon.exterior),
        polygon.interiors.iter().map(|ring| to_line_string(ring)).collect(),
    )
}

fn from_geo(polygon: &Polygon<f64>) -> GeoPolygon {
    GeoPolygon {
        exterior: from_line_string(polygon.exterior()),
        interiors: polygon.interiors().iter().map(from_line_string).collect(),
    }
}
