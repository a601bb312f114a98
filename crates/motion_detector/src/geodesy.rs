//! WGS84 Universal Transverse Mercator forward projection.
//!
//! Series expansion accurate to well under a metre inside a zone, which is
//! far below the footprint error of a pinhole camera model.

use nalgebra::Vector2;

/// Semi-major axis (m)
const SM_A: f64 = 6_378_137.0;
/// Semi-minor axis (m)
const SM_B: f64 = 6_356_752.314;
/// Scale factor on the central meridian
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// UTM zone (1..=60) containing the longitude
pub fn utm_zone(lng_deg: f64) -> u8 {
    let zone = ((lng_deg + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Central meridian of a zone (radians)
pub fn central_meridian(zone: u8) -> f64 {
    (-183.0 + 6.0 * zone as f64).to_radians()
}

/// Project a geodetic point into the given UTM zone: `(easting, northing)` in metres
///
/// Southern latitudes get the 10 000 km false northing.
pub fn to_utm(lat_deg: f64, lng_deg: f64, zone: u8) -> Vector2<f64> {
    project(lat_deg, lng_deg, zone, lat_deg < 0.0)
}

fn project(lat_deg: f64, lng_deg: f64, zone: u8, southern: bool) -> Vector2<f64> {
    let (x, y) = map_lat_lng_to_xy(
        lat_deg.to_radians(),
        lng_deg.to_radians(),
        central_meridian(zone),
    );

    let easting = x * SCALE_FACTOR + FALSE_EASTING;
    let mut northing = y * SCALE_FACTOR;
    if southern {
        northing += FALSE_NORTHING_SOUTH;
    }
    Vector2::new(easting, northing)
}

/// Metric planar frame anchored on the zone and hemisphere of an origin
///
/// Every point is projected with the origin's zone and false northing, so
/// footprints straddling a zone boundary or the equator stay continuous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmProjection {
    zone: u8,
    southern: bool,
}

impl UtmProjection {
    /// Frame for the zone and hemisphere containing the origin
    pub fn for_origin(lat_deg: f64, lng_deg: f64) -> Self {
        Self {
            zone: utm_zone(lng_deg),
            southern: lat_deg < 0.0,
        }
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    #[inline]
    pub fn project(&self, lat_deg: f64, lng_deg: f64) -> Vector2<f64> {
        project(lat_deg, lng_deg, self.zone, self.southern)
    }
}

/// Ellipsoidal distance from the equator to latitude `phi` (radians)
fn arc_length_of_meridian(phi: f64) -> f64 {
    let n = (SM_A - SM_B) / (SM_A + SM_B);

    let alpha = ((SM_A + SM_B) / 2.0) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0);
    let beta = (-3.0 * n / 2.0) + (9.0 * n.powi(3) / 16.0) + (-3.0 * n.powi(5) / 32.0);
    let gamma = (15.0 * n.powi(2) / 16.0) + (-15.0 * n.powi(4) / 32.0);
    let delta = (-35.0 * n.powi(3) / 48.0) + (105.0 * n.powi(5) / 256.0);
    let epsilon = 315.0 * n.powi(4) / 512.0;

    alpha
        * (phi
            + beta * (2.0 * phi).sin()
            + gamma * (4.0 * phi).sin()
            + delta * (6.0 * phi).sin()
            + epsilon * (8.0 * phi).sin())
}

/// Transverse Mercator projection before scaling and false origin
fn map_lat_lng_to_xy(phi: f64, lambda: f64, lambda0: f64) -> (f64, f64) {
    let ep2 = (SM_A.powi(2) - SM_B.powi(2)) / SM_B.powi(2);
    let nu2 = ep2 * phi.cos().powi(2);
    let big_n = SM_A.powi(2) / (SM_B * (1.0 + nu2).sqrt());

    let t = phi.tan();
    let t2 = t * t;
    let l = lambda - lambda0;
    let cos = phi.cos();

    let l3coef = 1.0 - t2 + nu2;
    let l4coef = 5.0 - t2 + 9.0 * nu2 + 4.0 * nu2 * nu2;
    let l5coef = 5.0 - 18.0 * t2 + t2 * t2 + 14.0 * nu2 - 58.0 * t2 * nu2;
    let l6coef = 61.0 - 58.0 * t2 + t2 * t2 + 270.0 * nu2 - 330.0 * t2 * nu2;
    let l7coef = 61.0 - 479.0 * t2 + 179.0 * t2 * t2 - t2 * t2 * t2;
    let l8coef = 1385.0 - 3111.0 * t2 + 543.0 * t2 * t2 - t2 * t2 * t2;

    let x = big_n * cos * l
        + (big_n / 6.0 * cos.powi(3) * l3coef * l.powi(3))
        + (big_n / 120.0 * cos.powi(5) * l5coef * l.powi(5))
        + (big_n / 5040.0 * cos.powi(7) * l7coef * l.powi(7));

    let y = arc_length_of_meridian(phi)
        + (t / 2.0 * big_n * cos.powi(2) * l.powi(2))
        + (t / 24.0 * big_n * cos.powi(4) * l4coef * l.powi(4))
        + (t / 720.0 * big_n * cos.powi(6) * l6coef * l.powi(6))
        + (t / 40320.0 * big_n * cos.powi(8) * l8coef * l.powi(8));

    (x, y)
}
