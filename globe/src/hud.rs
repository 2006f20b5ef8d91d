//! Derived overlay views of the sequence state. Pure data; the host layer
//! decides how to draw it.

use shared::{Role, TradeRoute};

use crate::sequencer::{Phase, SequenceState};

pub const HUD_TITLE: &str = "Global Trade Flow Visualizer";

pub const EXPORTER_COLOR: &str = "#00ff78";
pub const IMPORTER_COLOR: &str = "#00b0ff";
pub const ROUTE_COLOR: &str = "#ffe600";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: &'static str,
}

pub const LEGEND: [LegendEntry; 3] = [
    LegendEntry {
        label: "Exporter",
        color: EXPORTER_COLOR,
    },
    LegendEntry {
        label: "Importer",
        color: IMPORTER_COLOR,
    },
    LegendEntry {
        label: "Route",
        color: ROUTE_COLOR,
    },
];

/// Card describing the stop the tour is currently at.
#[derive(Debug, Clone, PartialEq)]
pub struct StopCard {
    pub country: String,
    pub role: Role,
    pub hs_code: String,
    pub material: String,
}

/// Snapshot of everything the overlay draws.
#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub title: &'static str,
    pub status: String,
    /// Fraction of stops reached, in `[0, 1]`.
    pub progress: f64,
    pub stop_counter: String,
    pub current: Option<StopCard>,
    pub legend: [LegendEntry; 3],
    pub free_roam: bool,
}

impl HudView {
    pub fn derive(state: &SequenceState, route: &TradeRoute) -> Self {
        let len = route.len();
        let reached = (state.current_index + 1).clamp(0, len as i32);
        let progress = if len == 0 {
            0.0
        } else {
            reached as f64 / len as f64
        };

        let stop_counter = if state.phase == Phase::Done {
            "✓  FREE ROAM".to_string()
        } else if len > 0 {
            format!("STOP {reached} / {len}")
        } else {
            String::new()
        };

        let current = usize::try_from(state.current_index)
            .ok()
            .and_then(|index| route.get(index))
            .map(|waypoint| StopCard {
                country: waypoint.country.clone(),
                role: waypoint.role,
                hs_code: waypoint.hs_code.clone(),
                material: waypoint.material.clone(),
            });

        Self {
            title: HUD_TITLE,
            status: state.status.clone(),
            progress,
            stop_counter,
            current,
            legend: LEGEND,
            free_roam: state.phase == Phase::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Waypoint;

    fn route() -> TradeRoute {
        TradeRoute::new(vec![
            Waypoint {
                country: "China".to_string(),
                role: Role::Exporter,
                material: "Lithium-ion battery cells".to_string(),
                hs_code: "8507.60".to_string(),
            },
            Waypoint {
                country: "Germany".to_string(),
                role: Role::Importer,
                material: "EV battery pack assembly".to_string(),
                hs_code: "8507.60".to_string(),
            },
        ])
    }

    #[test]
    fn before_start_nothing_is_reached() {
        let view = HudView::derive(&SequenceState::default(), &route());
        assert_eq!(view.progress, 0.0);
        assert_eq!(view.stop_counter, "STOP 0 / 2");
        assert!(view.current.is_none());
        assert!(!view.free_roam);
    }

    #[test]
    fn mid_sequence_shows_current_stop() {
        let state = SequenceState {
            phase: Phase::Ready,
            current_index: 0,
            status: "China  ──▶  Germany".to_string(),
        };
        let view = HudView::derive(&state, &route());
        assert_eq!(view.progress, 0.5);
        assert_eq!(view.stop_counter, "STOP 1 / 2");
        let card = view.current.expect("stop card");
        assert_eq!(card.country, "China");
        assert_eq!(card.role, Role::Exporter);
        assert_eq!(card.hs_code, "8507.60");
    }

    #[test]
    fn done_switches_to_free_roam() {
        let state = SequenceState {
            phase: Phase::Done,
            current_index: 1,
            status: "All routes mapped — free roam enabled".to_string(),
        };
        let view = HudView::derive(&state, &route());
        assert_eq!(view.progress, 1.0);
        assert_eq!(view.stop_counter, "✓  FREE ROAM");
        assert!(view.free_roam);
    }

    #[test]
    fn index_is_clamped_to_route_bounds() {
        let state = SequenceState {
            phase: Phase::Ready,
            current_index: 9,
            status: String::new(),
        };
        let view = HudView::derive(&state, &route());
        assert_eq!(view.stop_counter, "STOP 2 / 2");
        assert!(view.current.is_none());
        assert_eq!(view.progress, 1.0);
    }
}
