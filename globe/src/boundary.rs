use std::fs::File;
use std::io::Read;
use std::path::Path;

use geo_types::Coord;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GlobeError;

/// Country boundary dataset the product ships with.
pub const NATURAL_EARTH_COUNTRIES_URL: &str =
    "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_110m_admin_0_countries.geojson";

/// Name property keys checked in priority order at ingestion.
const NAME_PROPERTY_KEYS: [&str; 3] = ["ADMIN", "NAME", "NAME_LONG"];

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// One country boundary: the resolved name and the exterior ring of every
/// polygon it is made of, in `[lng, lat]` order.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub name: Option<String>,
    pub rings: Vec<Vec<Coord>>,
}

impl BoundaryFeature {
    /// Lowercased name for matching; empty names never match.
    pub(crate) fn match_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase)
    }
}

/// Read-only set of boundary features, fetched or loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    features: Vec<BoundaryFeature>,
}

impl BoundarySet {
    pub fn from_reader(reader: impl Read) -> Result<Self, GlobeError> {
        let raw: RawCollection = serde_json::from_reader(reader)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_json(json: &str) -> Result<Self, GlobeError> {
        let raw: RawCollection = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GlobeError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    fn from_raw(raw: RawCollection) -> Self {
        let mut features = Vec::with_capacity(raw.features.len());
        let mut skipped = 0usize;
        for feature in raw.features {
            let name = resolve_name(&feature.properties);
            let rings = match feature.geometry {
                Some(RawGeometry::Polygon { coordinates }) => coordinates
                    .into_iter()
                    .take(1)
                    .map(|ring| convert_ring(&ring))
                    .collect(),
                Some(RawGeometry::MultiPolygon { coordinates }) => coordinates
                    .into_iter()
                    .filter_map(|polygon| polygon.into_iter().next())
                    .map(|ring| convert_ring(&ring))
                    .collect(),
                Some(RawGeometry::Unsupported) | None => {
                    skipped += 1;
                    tracing::debug!(
                        "skipping boundary feature {:?} without polygon geometry",
                        name
                    );
                    continue;
                }
            };
            features.push(BoundaryFeature { name, rings });
        }
        if skipped > 0 {
            tracing::debug!("skipped {skipped} non-polygon boundary features");
        }
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundaryFeature> {
        self.features.iter()
    }
}

/// First present, non-empty name property in priority order.
fn resolve_name(properties: &serde_json::Map<String, Value>) -> Option<String> {
    NAME_PROPERTY_KEYS.iter().find_map(|key| {
        properties
            .get(*key)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    })
}

/// Drop positions with fewer than two components; keep `[lng, lat]`.
fn convert_ring(ring: &[Vec<f64>]) -> Vec<Coord> {
    ring.iter()
        .filter_map(|position| {
            let (&lng, &lat) = (position.first()?, position.get(1)?);
            Some(Coord { x: lng, y: lat })
        })
        .collect()
}

/// Fetch the boundary dataset from a remote static resource.
///
/// A failed fetch is a recoverable condition: the caller surfaces it as a
/// status message and the sequencer stays in its loading phase.
pub async fn fetch_boundaries(url: &str) -> Result<BoundarySet, GlobeError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(GlobeError::BoundaryStatus(status));
    }
    let body = response.text().await?;
    let set = BoundarySet::from_json(&body)?;
    tracing::info!("loaded {} boundary features from {url}", set.len());
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../data/boundary_fixture.json");

    #[test]
    fn parses_fixture_and_skips_non_polygons() {
        let set = BoundarySet::from_json(FIXTURE).expect("fixture");
        // The Point feature is dropped at ingestion.
        assert_eq!(set.len(), 4);
        assert!(set.iter().all(|f| !f.rings.is_empty()));
    }

    #[test]
    fn admin_property_wins_over_name() {
        let set = BoundarySet::from_json(FIXTURE).expect("fixture");
        let china = set
            .iter()
            .find(|f| f.name.as_deref() == Some("China"))
            .expect("china feature");
        assert_eq!(china.rings.len(), 1);
    }

    #[test]
    fn name_property_used_when_admin_absent() {
        let set = BoundarySet::from_json(FIXTURE).expect("fixture");
        assert!(set.iter().any(|f| f.name.as_deref() == Some("Germany")));
    }

    #[test]
    fn multipolygon_keeps_one_exterior_ring_per_member() {
        let set = BoundarySet::from_json(FIXTURE).expect("fixture");
        let france = set
            .iter()
            .find(|f| f.name.as_deref() == Some("France"))
            .expect("france feature");
        assert_eq!(france.rings.len(), 2);
    }

    #[test]
    fn feature_without_usable_name_is_kept_but_unmatchable() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "ISO_A3": "XXX" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] }
            }]
        }"#;
        let set = BoundarySet::from_json(json).expect("json");
        assert_eq!(set.len(), 1);
        assert!(set.iter().next().unwrap().match_name().is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(BoundarySet::from_json("{not geojson").is_err());
    }
}
