use std::collections::HashMap;

use foundation::bounds::Aabb2;
use foundation::geo::LngLat;
use foundation::ids::CountryId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::extent::{Extent, compute_extent};
use crate::feature::CountryFeature;

/// How long the renderer should take to fly to a new pose.
pub const TRANSITION_MS: u64 = 1_000;

/// Viewpoint handed to the renderer. `altitude` is a unitless camera distance.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CameraPose {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
}

impl CameraPose {
    /// Whole-globe view used when there is nothing to frame.
    pub const FALLBACK: CameraPose = CameraPose {
        lat: 0.0,
        lng: 0.0,
        altitude: 2.5,
    };

    /// Finite, inside the lat/lng world box, and above the surface.
    pub fn is_usable(&self) -> bool {
        WORLD.contains(LngLat::new(self.lng, self.lat))
            && self.altitude.is_finite()
            && self.altitude > 0.0
    }
}

const WORLD: Aabb2 = Aabb2 {
    min: [-180.0, -90.0],
    max: [180.0, 90.0],
};

/// Per-country adjustment. Each present field replaces the computed value.
#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideEntry {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
}

impl OverrideEntry {
    pub fn altitude(altitude: f64) -> Self {
        Self {
            altitude: Some(altitude),
            ..Self::default()
        }
    }

    fn apply(&self, pose: CameraPose) -> CameraPose {
        CameraPose {
            lat: self.lat.unwrap_or(pose.lat),
            lng: self.lng.unwrap_or(pose.lng),
            altitude: self.altitude.unwrap_or(pose.altitude),
        }
    }
}

#[derive(Debug, Error)]
pub enum OverrideTableError {
    #[error("invalid override table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid country id {0:?} in override table")]
    CountryId(String),
    #[error("override for {id} has non-positive altitude {altitude}")]
    Altitude { id: CountryId, altitude: f64 },
}

/// Static country-id → partial pose table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: HashMap<CountryId, OverrideEntry>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Countries whose bounding box frames poorly: overseas territories drag
    /// India's box off-center, and the largest countries need more distance
    /// than the size bands give them.
    pub fn builtin() -> Self {
        let mut t = Self::new();
        t.insert(
            CountryId::numeric(356),
            OverrideEntry {
                lat: Some(20.5),
                lng: Some(78.9),
                altitude: Some(2.5),
            },
        );
        t.insert(CountryId::numeric(643), OverrideEntry::altitude(2.8));
        t.insert(CountryId::numeric(156), OverrideEntry::altitude(2.8));
        t.insert(CountryId::numeric(124), OverrideEntry::altitude(2.0));
        t.insert(CountryId::numeric(76), OverrideEntry::altitude(2.0));
        t.insert(CountryId::numeric(36), OverrideEntry::altitude(2.0));
        t
    }

    /// Reads a JSON object of the form `{"356": {"lat": 20.5, "altitude": 2.5}}`.
    pub fn from_json(text: &str) -> Result<Self, OverrideTableError> {
        let raw: HashMap<String, OverrideEntry> = serde_json::from_str(text)?;
        let mut t = Self::new();
        for (key, entry) in raw {
            let id: CountryId = key
                .parse()
                .map_err(|_| OverrideTableError::CountryId(key.clone()))?;
            if let Some(altitude) = entry.altitude.filter(|a| !(*a > 0.0)) {
                return Err(OverrideTableError::Altitude { id, altitude });
            }
            t.insert(id, entry);
        }
        Ok(t)
    }

    pub fn insert(&mut self, id: CountryId, entry: OverrideEntry) -> Option<OverrideEntry> {
        self.entries.insert(id, entry)
    }

    pub fn get(&self, id: &CountryId) -> Option<&OverrideEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Baseline camera distance from the larger angular span of a country.
pub fn altitude_for_size(size_deg: f64) -> f64 {
    if size_deg > 50.0 {
        3.0
    } else if size_deg > 20.0 {
        2.5
    } else if size_deg > 10.0 {
        2.0
    } else {
        1.5
    }
}

/// Turns a country's extent into a camera pose.
#[derive(Debug, Clone, PartialEq)]
pub struct FramingPolicy {
    overrides: OverrideTable,
}

impl Default for FramingPolicy {
    fn default() -> Self {
        Self::new(OverrideTable::builtin())
    }
}

impl FramingPolicy {
    pub fn new(overrides: OverrideTable) -> Self {
        Self { overrides }
    }

    /// Deterministic in `(id, extent)` and the override table.
    pub fn framing_for(&self, id: Option<&CountryId>, extent: &Extent) -> CameraPose {
        let baseline = CameraPose {
            lat: extent.lat,
            lng: extent.lng,
            altitude: altitude_for_size(extent.size()),
        };
        let pose = match id.and_then(|id| self.overrides.get(id)) {
            Some(entry) => entry.apply(baseline),
            None => baseline,
        };
        if pose.is_usable() {
            pose
        } else {
            warn!(?id, ?pose, "camera pose out of range, using whole-globe view");
            CameraPose::FALLBACK
        }
    }

    /// Extent plus framing for a selected feature.
    pub fn frame_feature(&self, feature: &CountryFeature) -> CameraPose {
        let extent = compute_extent(feature.geometry.as_ref());
        let pose = self.framing_for(feature.id.as_ref(), &extent);
        info!(
            id = ?feature.id,
            lat = pose.lat,
            lng = pose.lng,
            altitude = pose.altitude,
            "framing country"
        );
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CameraPose, FramingPolicy, OverrideEntry, OverrideTable, OverrideTableError,
        altitude_for_size,
    };
    use crate::extent::Extent;
    use crate::feature::{CountryFeature, Geometry};
    use foundation::geo::LngLat;
    use foundation::ids::CountryId;
    use pretty_assertions::assert_eq;

    fn extent(lat: f64, lng: f64, width: f64, height: f64) -> Extent {
        Extent {
            lat,
            lng,
            width,
            height,
        }
    }

    #[test]
    fn size_bands() {
        assert_eq!(altitude_for_size(60.0), 3.0);
        assert_eq!(altitude_for_size(50.0), 2.5);
        assert_eq!(altitude_for_size(25.0), 2.5);
        assert_eq!(altitude_for_size(20.0), 2.0);
        assert_eq!(altitude_for_size(10.5), 2.0);
        assert_eq!(altitude_for_size(10.0), 1.5);
        assert_eq!(altitude_for_size(0.0), 1.5);
    }

    #[test]
    fn width_dominates_without_override() {
        let policy = FramingPolicy::default();
        let e = extent(10.0, 20.0, 60.0, 5.0);
        let pose = policy.framing_for(Some(&CountryId::numeric(250)), &e);
        assert_eq!(
            pose,
            CameraPose {
                lat: 10.0,
                lng: 20.0,
                altitude: 3.0
            }
        );
        let no_id = policy.framing_for(None, &extent(10.0, 20.0, 60.0, 5.0));
        assert_eq!(no_id, pose);
    }

    #[test]
    fn india_override_replaces_everything() {
        let policy = FramingPolicy::default();
        for e in [
            extent(10.0, 20.0, 60.0, 5.0),
            extent(-40.0, 100.0, 1.0, 1.0),
            Extent::FALLBACK,
        ] {
            let pose = policy.framing_for(Some(&CountryId::numeric(356)), &e);
            assert_eq!(
                pose,
                CameraPose {
                    lat: 20.5,
                    lng: 78.9,
                    altitude: 2.5
                }
            );
        }
    }

    #[test]
    fn partial_override_keeps_baseline_center() {
        let policy = FramingPolicy::default();
        let e = extent(61.0, 100.0, 170.0, 40.0);
        let pose = policy.framing_for(Some(&CountryId::numeric(643)), &e);
        assert_eq!(
            pose,
            CameraPose {
                lat: 61.0,
                lng: 100.0,
                altitude: 2.8
            }
        );
    }

    #[test]
    fn string_encoded_ids_hit_numeric_overrides() {
        let policy = FramingPolicy::default();
        let e = extent(-25.0, 134.0, 40.0, 30.0);
        let pose = policy.framing_for(Some(&CountryId::code("036")), &e);
        assert_eq!(pose.altitude, 2.0);
    }

    #[test]
    fn frames_feature_geometry() {
        let ring = vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(12.0, 0.0),
            LngLat::new(12.0, 6.0),
            LngLat::new(0.0, 6.0),
        ];
        let f = CountryFeature::new(
            Some(CountryId::numeric(999)),
            Some(Geometry::Polygon { rings: vec![ring] }),
        );
        let pose = FramingPolicy::default().frame_feature(&f);
        assert_eq!(
            pose,
            CameraPose {
                lat: 3.0,
                lng: 6.0,
                altitude: 2.0
            }
        );

        let missing = CountryFeature::new(None, None);
        let pose = FramingPolicy::default().frame_feature(&missing);
        assert_eq!(pose.altitude, 1.5);
    }

    #[test]
    fn loads_override_table_from_json() {
        let t = OverrideTable::from_json(r#"{"356": {"lat": 21.0}, "FRA": {"altitude": 1.2}}"#)
            .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.get(&CountryId::numeric(356)),
            Some(&OverrideEntry {
                lat: Some(21.0),
                lng: None,
                altitude: None
            })
        );
        assert_eq!(
            t.get(&CountryId::code("FRA")),
            Some(&OverrideEntry::altitude(1.2))
        );
    }

    #[test]
    fn rejects_bad_override_tables() {
        assert!(matches!(
            OverrideTable::from_json(r#"{"1": {"zoom": 3}}"#),
            Err(OverrideTableError::Json(_))
        ));
        assert!(matches!(
            OverrideTable::from_json(r#"{"  ": {}}"#),
            Err(OverrideTableError::CountryId(_))
        ));
        assert!(matches!(
            OverrideTable::from_json(r#"{"1": {"altitude": 0}}"#),
            Err(OverrideTableError::Altitude { .. })
        ));
    }

    #[test]
    fn out_of_range_pose_falls_back_to_whole_globe() {
        let mut table = OverrideTable::from_json(r#"{"3": {"lat": 120.0}}"#).unwrap();
        table.insert(
            CountryId::numeric(1),
            OverrideEntry {
                lng: Some(f64::NAN),
                ..OverrideEntry::default()
            },
        );
        let policy = FramingPolicy::new(table);
        let e = extent(10.0, 20.0, 5.0, 5.0);

        for id in [1, 3] {
            let pose = policy.framing_for(Some(&CountryId::numeric(id)), &e);
            assert_eq!(pose, CameraPose::FALLBACK);
        }
        assert_eq!(policy.framing_for(None, &e).altitude, 1.5);
        assert!(CameraPose::FALLBACK.is_usable());
    }
}
