//! Country features as delivered by the boundary dataset.
//!
//! The dataset is a GeoJSON `FeatureCollection` (already converted from
//! topology by an external tool). Loading is lenient: a feature whose geometry
//! cannot be read keeps a `Geometry::Malformed` marker instead of failing the
//! whole collection, and extent computation degrades from there.

use foundation::geo::LngLat;
use foundation::ids::CountryId;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::warn;

/// Ordered `(lng, lat)` boundary. The first ring of a polygon is its outer ring.
pub type Ring = Vec<LngLat>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon { rings: Vec<Ring> },
    MultiPolygon { polygons: Vec<Vec<Ring>> },
    /// Any other GeoJSON geometry type (points, lines, collections).
    Unsupported { kind: String },
    /// Coordinates that were not numeric positions.
    Malformed { kind: String },
}

impl Geometry {
    pub fn kind(&self) -> &str {
        match self {
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::Unsupported { kind } | Geometry::Malformed { kind } => kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub id: Option<CountryId>,
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl CountryFeature {
    pub fn new(id: Option<CountryId>, geometry: Option<Geometry>) -> Self {
        Self {
            id,
            geometry,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Display name: `NAME`, then `name`, else empty.
    pub fn name(&self) -> &str {
        ["NAME", "name"]
            .iter()
            .find_map(|key| self.properties.get(*key).and_then(Value::as_str))
            .unwrap_or("")
    }

    /// Builds a feature from one GeoJSON `Feature` object.
    pub fn from_geojson(value: Value) -> Result<Self, GeoJsonError> {
        let raw: RawFeature = serde_json::from_value(value).map_err(GeoJsonError::Feature)?;
        let properties = raw.properties.unwrap_or_default();
        let id = raw
            .id
            .as_ref()
            .and_then(id_from_value)
            .or_else(|| properties.get("id").and_then(id_from_value));
        let geometry = raw.geometry.map(RawGeometry::into_geometry);

        Ok(Self {
            id,
            geometry,
            properties,
        })
    }
}

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid GeoJSON document: {0}")]
    Document(#[source] serde_json::Error),
    #[error("expected a FeatureCollection, found {0:?}")]
    NotACollection(String),
    #[error("invalid GeoJSON feature: {0}")]
    Feature(#[source] serde_json::Error),
}

/// Parses a GeoJSON `FeatureCollection` into country features.
///
/// Features that are not objects of the expected shape are skipped with a
/// warning; the collection itself must be well formed.
pub fn load_feature_collection(text: &str) -> Result<Vec<CountryFeature>, GeoJsonError> {
    let raw: RawCollection = serde_json::from_str(text).map_err(GeoJsonError::Document)?;
    if raw.kind != "FeatureCollection" {
        return Err(GeoJsonError::NotACollection(raw.kind));
    }

    let mut features = Vec::with_capacity(raw.features.len());
    for (index, value) in raw.features.into_iter().enumerate() {
        match CountryFeature::from_geojson(value) {
            Ok(f) => features.push(f),
            Err(err) => warn!(index, "skipping feature: {err}"),
        }
    }
    Ok(features)
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl RawGeometry {
    fn into_geometry(self) -> Geometry {
        let RawGeometry { kind, coordinates } = self;
        let parsed = match kind.as_str() {
            "Polygon" => serde_json::from_value::<Vec<Vec<Vec<f64>>>>(coordinates)
                .ok()
                .and_then(|rings| rings_from_positions(&rings))
                .map(|rings| Geometry::Polygon { rings }),
            "MultiPolygon" => serde_json::from_value::<Vec<Vec<Vec<Vec<f64>>>>>(coordinates)
                .ok()
                .and_then(|polygons| {
                    polygons
                        .iter()
                        .map(|rings| rings_from_positions(rings))
                        .collect::<Option<Vec<_>>>()
                })
                .map(|polygons| Geometry::MultiPolygon { polygons }),
            _ => return Geometry::Unsupported { kind },
        };
        parsed.unwrap_or(Geometry::Malformed { kind })
    }
}

fn rings_from_positions(rings: &[Vec<Vec<f64>>]) -> Option<Vec<Ring>> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|pos| LngLat::from_position(pos))
                .collect::<Option<Ring>>()
        })
        .collect()
}

fn id_from_value(value: &Value) -> Option<CountryId> {
    match value {
        Value::Number(n) => match integral_u32(n) {
            Some(n) => Some(CountryId::numeric(n)),
            None => Some(CountryId::code(n.to_string())),
        },
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// `356` and `356.0` are the same id.
fn integral_u32(n: &Number) -> Option<u32> {
    match n.as_u64() {
        Some(n) => u32::try_from(n).ok(),
        None => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f))
            .map(|f| f as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::{CountryFeature, GeoJsonError, Geometry, load_feature_collection};
    use foundation::geo::LngLat;
    use foundation::ids::CountryId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_polygon_feature_with_string_id() {
        let f = CountryFeature::from_geojson(json!({
            "type": "Feature",
            "id": "036",
            "properties": { "name": "Australia" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[113.0, -22.0], [153.0, -28.0], [142.0, -10.5], [113.0, -22.0]]]
            }
        }))
        .unwrap();

        assert_eq!(f.id, Some(CountryId::numeric(36)));
        assert_eq!(f.id.as_ref().map(CountryId::as_str), Some("036"));
        assert_eq!(f.name(), "Australia");
        let Some(Geometry::Polygon { rings }) = &f.geometry else {
            panic!("expected polygon, got {:?}", f.geometry);
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][1], LngLat::new(153.0, -28.0));
    }

    #[test]
    fn id_falls_back_to_properties() {
        let f = CountryFeature::from_geojson(json!({
            "type": "Feature",
            "properties": { "id": 250, "NAME": "France", "name": "france" },
            "geometry": null
        }))
        .unwrap();
        assert_eq!(f.id, Some(CountryId::numeric(250)));
        assert_eq!(f.name(), "France");
        assert!(f.geometry.is_none());
    }

    #[test]
    fn float_ids_read_as_numbers() {
        let f = CountryFeature::from_geojson(json!({
            "type": "Feature",
            "id": 356.0,
            "geometry": null
        }))
        .unwrap();
        assert_eq!(f.id, Some(CountryId::numeric(356)));
        assert_eq!(f.id.as_ref().map(CountryId::as_str), Some("356"));

        let f = CountryFeature::from_geojson(json!({ "type": "Feature", "id": 1.5 })).unwrap();
        assert_eq!(f.id.as_ref().and_then(CountryId::as_number), None);
        let f = CountryFeature::from_geojson(json!({ "type": "Feature", "id": -4 })).unwrap();
        assert_eq!(f.id, Some(CountryId::code("-4")));
    }

    #[test]
    fn non_numeric_coordinates_are_malformed() {
        let f = CountryFeature::from_geojson(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[["a", 1.0], [2.0, 3.0]]] }
        }))
        .unwrap();
        assert_eq!(
            f.geometry,
            Some(Geometry::Malformed {
                kind: "Polygon".into()
            })
        );
        assert_eq!(f.name(), "");
    }

    #[test]
    fn short_positions_are_malformed() {
        let f = CountryFeature::from_geojson(json!({
            "type": "Feature",
            "geometry": { "type": "MultiPolygon", "coordinates": [[[[1.0]]]] }
        }))
        .unwrap();
        assert!(matches!(f.geometry, Some(Geometry::Malformed { .. })));
    }

    #[test]
    fn other_geometry_types_are_unsupported() {
        let f = CountryFeature::from_geojson(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }
        }))
        .unwrap();
        assert_eq!(
            f.geometry,
            Some(Geometry::Unsupported {
                kind: "Point".into()
            })
        );
    }

    #[test]
    fn collection_skips_broken_features() {
        let text = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": 4,
                    "properties": { "name": "Afghanistan" },
                    "geometry": null
                },
                "not a feature",
                { "type": "Feature", "id": "FRA", "properties": null, "geometry": null }
            ]
        })
        .to_string();

        let features = load_feature_collection(&text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id, Some(CountryId::numeric(4)));
        assert_eq!(features[1].id, Some(CountryId::code("FRA")));
    }

    #[test]
    fn rejects_non_collection_documents() {
        let err = load_feature_collection(r#"{"type":"Feature","features":[]}"#).unwrap_err();
        assert!(matches!(err, GeoJsonError::NotACollection(kind) if kind == "Feature"));
        assert!(matches!(
            load_feature_collection("nope"),
            Err(GeoJsonError::Document(_))
        ));
    }
}
