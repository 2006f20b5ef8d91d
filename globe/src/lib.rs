pub mod boundary;
pub mod centroid;
pub mod clock;
pub mod error;
pub mod geometry;
pub mod hud;
pub mod scene;
pub mod sequencer;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use shared::{TradeRoute, Waypoint};

pub use crate::boundary::{fetch_boundaries, BoundarySet, NATURAL_EARTH_COUNTRIES_URL};
pub use crate::centroid::CentroidResolver;
pub use crate::clock::{FrameClock, ManualClock, TokioClock};
pub use crate::error::GlobeError;
pub use crate::hud::HudView;
pub use crate::scene::{GlobeScene, TracingScene};
pub use crate::sequencer::{Phase, PlayOutcome, RouteAnimator, RunToken, SequenceConfig};

/// Bundled demo route used when the caller supplies no usable route data.
const SAMPLE_ROUTE_JSON: &str = include_str!("../data/sample_route.json");

/// The bundled sample route: a battery-cell flow from exporter to final
/// importer.
pub fn sample_route() -> TradeRoute {
    let stops: Vec<Waypoint> =
        serde_json::from_str(SAMPLE_ROUTE_JSON).expect("bundled sample route is valid");
    TradeRoute::new(stops)
}

/// Load a route from a JSON file holding an array of waypoints.
pub fn load_route(path: impl AsRef<Path>) -> Result<TradeRoute, GlobeError> {
    let file = File::open(path)?;
    let stops: Vec<Waypoint> =
        serde_json::from_reader(BufReader::new(file)).map_err(GlobeError::RouteParse)?;
    Ok(TradeRoute::new(stops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;

    #[test]
    fn sample_route_is_animatable_and_exporter_first() {
        let route = sample_route();
        assert!(route.len() >= sequencer::MIN_ANIMATABLE_STOPS);
        assert_eq!(route.stops()[0].role, Role::Exporter);
        assert_eq!(route.exporter_country(), Some("China"));
    }
}
