use serde::{Deserialize, Serialize};

/// Geographic point in degrees. `lng` is longitude east-positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Equator / prime-meridian intersection, the degraded fallback for
    /// countries that cannot be resolved to a centroid.
    pub const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Exporter,
    Importer,
}

/// One stop in a trade route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub country: String,
    pub role: Role,
    pub material: String,
    pub hs_code: String,
}

/// Ordered list of waypoints in canonical playback order: exporter stops
/// first, relative order otherwise preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Waypoint>", into = "Vec<Waypoint>")]
pub struct TradeRoute {
    stops: Vec<Waypoint>,
}

impl TradeRoute {
    pub fn new(mut stops: Vec<Waypoint>) -> Self {
        // Stable sort keeps the relative order of same-role stops.
        stops.sort_by_key(|w| w.role != Role::Exporter);
        Self { stops }
    }

    pub fn stops(&self) -> &[Waypoint] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.stops.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Waypoint> {
        self.stops.iter()
    }

    /// Country of the first exporter stop, if the route has one.
    pub fn exporter_country(&self) -> Option<&str> {
        self.stops
            .iter()
            .find(|w| w.role == Role::Exporter)
            .map(|w| w.country.as_str())
    }
}

impl From<Vec<Waypoint>> for TradeRoute {
    fn from(stops: Vec<Waypoint>) -> Self {
        Self::new(stops)
    }
}

impl From<TradeRoute> for Vec<Waypoint> {
    fn from(route: TradeRoute) -> Self {
        route.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(country: &str, role: Role) -> Waypoint {
        Waypoint {
            country: country.to_string(),
            role,
            material: String::new(),
            hs_code: String::new(),
        }
    }

    #[test]
    fn exporters_sort_to_the_front() {
        let route = TradeRoute::new(vec![
            stop("Germany", Role::Importer),
            stop("China", Role::Exporter),
            stop("Netherlands", Role::Importer),
        ]);

        let countries: Vec<&str> = route.iter().map(|w| w.country.as_str()).collect();
        assert_eq!(countries, vec!["China", "Germany", "Netherlands"]);
        assert_eq!(route.exporter_country(), Some("China"));
    }

    #[test]
    fn canonical_ordering_is_stable() {
        let route = TradeRoute::new(vec![
            stop("Belgium", Role::Importer),
            stop("Vietnam", Role::Exporter),
            stop("Germany", Role::Importer),
            stop("China", Role::Exporter),
        ]);

        let countries: Vec<&str> = route.iter().map(|w| w.country.as_str()).collect();
        // Exporters first in their original order, importers after in theirs.
        assert_eq!(countries, vec!["Vietnam", "China", "Belgium", "Germany"]);
    }

    #[test]
    fn deserialization_applies_canonical_ordering() {
        let json = r#"[
            {"country": "Germany", "role": "importer", "material": "Assembly", "hs_code": "8507.60"},
            {"country": "China", "role": "exporter", "material": "Cells", "hs_code": "8507.60"}
        ]"#;
        let route: TradeRoute = serde_json::from_str(json).expect("route json");
        assert_eq!(route.exporter_country(), Some("China"));
        assert_eq!(route.stops()[0].country, "China");
    }

    #[test]
    fn route_without_exporter_keeps_order() {
        let route = TradeRoute::new(vec![
            stop("Belgium", Role::Importer),
            stop("Germany", Role::Importer),
        ]);
        assert_eq!(route.exporter_country(), None);
        assert_eq!(route.stops()[0].country, "Belgium");
    }
}
