use shared::{GeoPoint, Role};

use crate::geometry::{ArrowBasis, Vec3};

/// Camera pose over the globe: the surface point under the camera and the
/// altitude as a fraction of the globe radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub center: GeoPoint,
    pub altitude: f64,
}

/// Placement of the arrow marker at the growing arc tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPose {
    pub position: Vec3,
    pub basis: ArrowBasis,
    pub scale: f64,
}

/// Fill applied to a country polygon cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryFill {
    Base,
    Exporter,
    Importer,
}

impl From<Role> for CountryFill {
    fn from(role: Role) -> Self {
        match role {
            Role::Exporter => CountryFill::Exporter,
            Role::Importer => CountryFill::Importer,
        }
    }
}

/// Capability interface over the 3D rendering engine.
///
/// The sequencer depends only on this trait, which keeps it engine-agnostic
/// and unit-testable without a real renderer:
/// - `TracingScene`: logs every mutation (demo binary)
/// - `RecordingScene`: captures the mutation stream (integration tests)
/// - a real binding would forward each call to its scene graph
///
/// # Contract
/// The active sequence run is the only writer; implementations never need
/// internal locking. `set_polyline_progress` reveals a prefix of the live
/// arc and the revealed length only ever grows within one leg.
pub trait GlobeScene {
    fn set_camera_pose(&mut self, pose: CameraPose);
    /// Enable or disable free camera control (user orbit/zoom).
    fn set_controls_enabled(&mut self, enabled: bool);
    fn set_polyline_progress(&mut self, points: &[Vec3], visible_len: usize);
    fn set_polyline_visible(&mut self, visible: bool);
    fn set_arrow_pose(&mut self, pose: ArrowPose);
    fn set_arrow_visible(&mut self, visible: bool);
    fn set_country_fill(&mut self, country: &str, fill: CountryFill);
    /// Permanently draw a faint static trace of a completed leg.
    fn add_static_trace(&mut self, points: Vec<Vec3>);
}

/// Scene binding that narrates every mutation through `tracing`.
///
/// Per-frame updates (camera, polyline, arrow) log at trace level so the
/// default filter only shows the discrete events of a run.
#[derive(Debug, Default)]
pub struct TracingScene {
    baked_traces: usize,
}

impl GlobeScene for TracingScene {
    fn set_camera_pose(&mut self, pose: CameraPose) {
        tracing::trace!(
            "camera -> lat {:.2} lng {:.2} alt {:.2}",
            pose.center.lat,
            pose.center.lng,
            pose.altitude
        );
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        tracing::info!(
            "free camera control {}",
            if enabled { "enabled" } else { "locked" }
        );
    }

    fn set_polyline_progress(&mut self, points: &[Vec3], visible_len: usize) {
        tracing::trace!("live arc {}/{} points revealed", visible_len, points.len());
    }

    fn set_polyline_visible(&mut self, visible: bool) {
        tracing::debug!("live arc visible: {visible}");
    }

    fn set_arrow_pose(&mut self, pose: ArrowPose) {
        tracing::trace!(
            "arrow -> ({:.1}, {:.1}, {:.1})",
            pose.position.x,
            pose.position.y,
            pose.position.z
        );
    }

    fn set_arrow_visible(&mut self, visible: bool) {
        tracing::debug!("arrow visible: {visible}");
    }

    fn set_country_fill(&mut self, country: &str, fill: CountryFill) {
        tracing::info!("country fill: {country} -> {fill:?}");
    }

    fn add_static_trace(&mut self, points: Vec<Vec3>) {
        self.baked_traces += 1;
        tracing::info!(
            "baked static trace #{} ({} points)",
            self.baked_traces,
            points.len()
        );
    }
}
