use std::collections::HashMap;

use shared::GeoPoint;

use crate::boundary::{BoundaryFeature, BoundarySet};
use crate::geometry::dominant_centroid;

/// Resolves country names to representative points over a boundary set.
///
/// Lookups are memoized by the query name as given. Misses are NOT cached
/// so a later lookup can succeed once the boundary dataset is replaced.
#[derive(Debug, Default)]
pub struct CentroidResolver {
    cache: HashMap<String, GeoPoint>,
}

impl CentroidResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative `[lng, lat]` point for a country name.
    ///
    /// Match order: exact (case-insensitive) name, then the first feature
    /// whose name is a substring of the query or vice versa. Unresolvable
    /// names degrade to `(0, 0)` instead of failing the caller.
    pub fn resolve(&mut self, name: &str, boundaries: &BoundarySet) -> GeoPoint {
        if let Some(hit) = self.cache.get(name) {
            return *hit;
        }

        let query = name.to_lowercase();
        let feature = boundaries
            .iter()
            .find(|f| f.match_name().is_some_and(|n| n == query))
            .or_else(|| {
                boundaries.iter().find(|f| {
                    f.match_name()
                        .is_some_and(|n| n.contains(&query) || query.contains(&n))
                })
            });

        let Some(feature) = feature else {
            tracing::debug!("no boundary feature matches {name:?}, defaulting to (0, 0)");
            return GeoPoint::ORIGIN;
        };

        let point = feature_centroid(feature);
        self.cache.insert(name.to_string(), point);
        point
    }

    #[cfg(test)]
    fn cached(&self, name: &str) -> Option<GeoPoint> {
        self.cache.get(name).copied()
    }
}

fn feature_centroid(feature: &BoundaryFeature) -> GeoPoint {
    let c = dominant_centroid(&feature.rings);
    GeoPoint { lat: c.y, lng: c.x }
}
