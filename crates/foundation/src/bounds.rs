use crate::geo::LngLat;

/// Axis-aligned bounding box in (lng, lat) degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Bounding box of `points`.
    ///
    /// Returns `None` for an empty input or when any coordinate is not finite.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut bounds: Option<Aabb2> = None;
        for p in points {
            if !p.is_finite() {
                return None;
            }
            let b = bounds.get_or_insert(Aabb2::new([p.lng, p.lat], [p.lng, p.lat]));
            b.min[0] = b.min[0].min(p.lng);
            b.min[1] = b.min[1].min(p.lat);
            b.max[0] = b.max[0].max(p.lng);
            b.max[1] = b.max[1].max(p.lat);
        }
        bounds
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        )
    }

    /// Longitudinal span in degrees.
    pub fn width(&self) -> f64 {
        (self.max[0] - self.min[0]).abs()
    }

    /// Latitudinal span in degrees.
    pub fn height(&self) -> f64 {
        (self.max[1] - self.min[1]).abs()
    }

    pub fn contains(&self, p: LngLat) -> bool {
        p.lng >= self.min[0] && p.lng <= self.max[0] && p.lat >= self.min[1] && p.lat <= self.max[1]
    }
}
