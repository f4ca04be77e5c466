use foundation::bounds::Aabb2;
use foundation::geo::{clamp_lat, clamp_lng};
use serde::Serialize;
use tracing::debug;

use crate::feature::{Geometry, Ring};

/// Geometric center and angular span of a country, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Extent {
    pub lat: f64,
    pub lng: f64,
    pub width: f64,
    pub height: f64,
}

impl Extent {
    /// Used whenever geometry is missing or unreadable, so framing still
    /// produces a sane camera pose.
    pub const FALLBACK: Extent = Extent {
        lat: 0.0,
        lng: 0.0,
        width: 10.0,
        height: 10.0,
    };

    /// Zero-size extent at the origin, for geometry types without an area.
    pub const DEGENERATE: Extent = Extent {
        lat: 0.0,
        lng: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn size(&self) -> f64 {
        self.width.max(self.height)
    }

    fn from_bounds(bounds: Aabb2) -> Self {
        let center = bounds.center();
        Extent {
            lat: clamp_lat(center.lat),
            lng: clamp_lng(center.lng),
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

/// Computes the bounding-box center and span of a country outline.
///
/// Only one ring is measured: the outer ring of a `Polygon`, or for a
/// `MultiPolygon` the outer ring with the most vertices (a cheap stand-in for
/// the largest landmass; ties go to the first polygon). Never fails: broken
/// input maps to [`Extent::FALLBACK`].
pub fn compute_extent(geometry: Option<&Geometry>) -> Extent {
    let ring = match geometry {
        None => {
            debug!("no geometry, using fallback extent");
            return Extent::FALLBACK;
        }
        Some(g @ Geometry::Unsupported { .. }) => {
            debug!(kind = g.kind(), "unsupported geometry, using degenerate extent");
            return Extent::DEGENERATE;
        }
        Some(g @ Geometry::Malformed { .. }) => {
            debug!(kind = g.kind(), "malformed geometry, using fallback extent");
            return Extent::FALLBACK;
        }
        Some(Geometry::Polygon { rings }) => rings.first(),
        Some(Geometry::MultiPolygon { polygons }) => largest_outer_ring(polygons),
    };

    match ring.and_then(|r| Aabb2::from_points(r)) {
        Some(bounds) => Extent::from_bounds(bounds),
        None => {
            debug!("empty or non-finite ring, using fallback extent");
            Extent::FALLBACK
        }
    }
}

fn largest_outer_ring(polygons: &[Vec<Ring>]) -> Option<&Ring> {
    let mut best: Option<&Ring> = None;
    for outer in polygons.iter().filter_map(|rings| rings.first()) {
        // Strict comparison keeps the first of equally sized rings.
        if best.is_none_or(|b| outer.len() > b.len()) {
            best = Some(outer);
        }
    }
    best
}
