//! Cumulative ground coverage tracking.

use contracts::{CoverageConfig, CoverageMode, FovFootprint, GeoPoint, GeoPolygon, PolygonUnion};
use tracing::{debug, instrument, warn};

use crate::weld::weld_ring;

/// Merges each frame's footprint into the ground observed so far
///
/// `Legacy` mode keeps a single polygon; a footprint that does not touch it
/// is dropped and the coverage is left unchanged. `MultiRegion` mode keeps every disjoint region.
#[derive(Debug)]
pub struct CoverageSweeper<U> {
    union: U,
    config: CoverageConfig,
    regions: Vec<GeoPolygon>,
    updates: u64,
    dropped_components: u64,
    welded_vertices: u64,
}

impl<U: PolygonUnion> CoverageSweeper<U> {
    pub fn new(config: CoverageConfig, union: U) -> Self {
        Self {
            union,
            config,
            regions: Vec::new(),
            updates: 0,
            dropped_components: 0,
            welded_vertices: 0,
        }
    }

    /// Merge a footprint and return the boundary of the region it joined
    ///
    /// The first footprint becomes the coverage as is and its closed ring is
    /// returned. An empty result means the union produced nothing usable and
    /// the coverage was left unchanged.
    #[instrument(
        level = "debug",
        name = "coverage_update",
        skip_all,
        fields(update = self.updates, regions = self.regions.len())
    )]
    pub fn update(&mut self, footprint: &FovFootprint) -> Vec<GeoPoint> {
        self.updates += 1;
        let polygon = self.union.correct(footprint.to_polygon());

        if self.regions.is_empty() {
            debug!("first footprint becomes the coverage");
            self.regions.push(polygon);
            self.record_gauges();
            return footprint.ring();
        }

        let boundary = match self.config.mode {
            CoverageMode::Legacy => self.merge_legacy(&polygon),
            CoverageMode::MultiRegion => self.merge_regions(polygon),
        };

        self.record_gauges();
        boundary
    }

    fn merge_legacy(&mut self, polygon: &GeoPolygon) -> Vec<GeoPoint> {
        let mut parts = self.union.union(&self.regions[0], polygon);

        match parts.len() {
            0 => {
                warn!("union produced no polygon, coverage unchanged");
                Vec::new()
            }
            1 => {
                let welded = self.weld(parts.remove(0));
                let boundary = welded.exterior.clone();
                self.regions[0] = welded;
                boundary
            }
            n => {
                // Disjoint footprint: the union output order is positional, so
                // the existing coverage is kept as is
                let dropped = (n - 1) as u64;
                warn!(dropped, "disjoint footprint dropped from coverage");
                self.dropped_components += dropped;
                metrics::counter!("scanner_union_components_dropped_total").increment(dropped);
                self.regions[0].exterior.clone()
            }
        }
    }

    fn merge_regions(&mut self, polygon: GeoPolygon) -> Vec<GeoPoint> {
        let mut merged = polygon;
        let mut disjoint = Vec::with_capacity(self.regions.len());

        for region in self.regions.drain(..) {
            let mut parts = self.union.union(&region, &merged);
            if parts.len() == 1 {
                merged = parts.remove(0);
            } else {
                disjoint.push(region);
            }
        }

        let merged = self.weld(merged);
        let boundary = merged.exterior.clone();
        disjoint.push(merged);
        self.regions = disjoint;
        boundary
    }

    fn weld(&mut self, polygon: GeoPolygon) -> GeoPolygon {
        let exterior = weld_ring(&polygon.exterior, self.config.weld_epsilon);
        self.welded_vertices += (polygon.exterior.len() - exterior.len()) as u64;
        GeoPolygon {
            exterior,
            interiors: polygon.interiors,
        }
    }

    fn record_gauges(&self) {
        metrics::gauge!("scanner_coverage_vertices").set(self.vertex_count() as f64);
        metrics::gauge!("scanner_coverage_area").set(self.area());
    }

    /// Exterior rings of all covered regions
    pub fn boundaries(&self) -> Vec<Vec<GeoPoint>> {
        self.regions.iter().map(|region| region.exterior.clone()).collect()
    }

    /// Covered regions; at most one in `Legacy` mode
    pub fn regions(&self) -> &[GeoPolygon] {
        &self.regions
    }

    /// Planar covered area in squared coordinate units
    pub fn area(&self) -> f64 {
        self.regions.iter().map(GeoPolygon::area).sum()
    }

    /// Exterior vertices over all regions
    pub fn vertex_count(&self) -> usize {
        self.regions.iter().map(|region| region.exterior.len()).sum()
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Union components discarded in `Legacy` mode
    pub fn dropped_components(&self) -> u64 {
        self.dropped_components
    }

    /// Vertices removed by welding
    pub fn welded_vertices(&self) -> u64 {
        self.welded_vertices
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Forget all coverage; the next footprint starts over
    pub fn reset(&mut self) {
        self.regions.clear();
        self.updates = 0;
        self.dropped_components = 0;
        self.welded_vertices = 0;
    }

    /// Get configuration
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }
}
