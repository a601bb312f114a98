//! Near-duplicate vertex welding for coverage rings.

use contracts::GeoPoint;

/// Drop every vertex closer than `epsilon` to an earlier kept vertex
///
/// Vertices are visited in ring order and the first one seen wins. A closed
/// ring (first point repeated last) keeps its closing point. Rings that would
/// collapse below three distinct vertices are returned unchanged.
pub fn weld_ring(ring: &[GeoPoint], epsilon: f64) -> Vec<GeoPoint> {
    let closed = ring.len() > 1 && ring.first() == ring.last();
    let open = if closed { &ring[..ring.len() - 1] } else { ring };

    let threshold = epsilon * epsilon;
    let mut removed = vec![false; open.len()];

    for i in 0..open.len() {
        if removed[i] {
            continue;
        }
        for j in i + 1..open.len() {
            if open[i].distance_squared(&open[j]) < threshold {
                removed[j] = true;
            }
        }
    }

    let mut welded: Vec<GeoPoint> = open
        .iter()
        .zip(&removed)
        .filter(|(_, removed)| !**removed)
        .map(|(point, _)| *point)
        .collect();

    if welded.len() < 3 {
        return ring.to_vec();
    }
    if closed {
        welded.push(welded[0]);
    }
    welded
}
