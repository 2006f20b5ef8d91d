use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::{GeoPoint, Role, TradeRoute, Waypoint};

use crate::boundary::BoundarySet;
use crate::centroid::CentroidResolver;
use crate::error::GlobeError;
use crate::clock::FrameClock;
use crate::geometry::{arc_height, arrow_basis, ease_in_out, slerp, to_cartesian, Vec3, GLOBE_RADIUS};
use crate::scene::{ArrowPose, CameraPose, CountryFill, GlobeScene};

/// A route needs at least this many stops to animate.
pub const MIN_ANIMATABLE_STOPS: usize = 2;

/// Lifecycle of the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for route data and boundary data to both be available.
    Loading,
    /// Both inputs present; a run may start.
    Ready,
    /// All waypoints visited; free roam re-enabled.
    Done,
}

/// State published for overlay rendering while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceState {
    pub phase: Phase,
    /// Index into the waypoint list, -1 before the first stop.
    pub current_index: i32,
    pub status: String,
}

impl Default for SequenceState {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            current_index: -1,
            status: "Loading…".to_string(),
        }
    }
}

/// Shared handle overlay code can snapshot while a run is in flight.
#[derive(Debug, Clone, Default)]
pub struct StateHandle(Arc<Mutex<SequenceState>>);

impl StateHandle {
    pub fn snapshot(&self) -> SequenceState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SequenceState> {
        self.0.lock().expect("sequence state lock")
    }

    fn set_phase(&self, phase: Phase) {
        self.lock().phase = phase;
    }

    fn set_index(&self, index: i32) {
        self.lock().current_index = index;
    }

    fn set_status(&self, status: impl Into<String>) {
        self.lock().status = status.into();
    }

    fn reset(&self) {
        *self.lock() = SequenceState::default();
    }
}

/// Cooperative cancellation token for one sequence run.
///
/// Every async step checks the flag on entry and at the top of every frame
/// or timer resumption, then unwinds without touching the scene again.
/// Starting a new run cancels the previous token before installing a fresh
/// one, so a stale step can never write over the successor's scene state.
#[derive(Debug, Clone, Default)]
pub struct RunToken(Arc<AtomicBool>);

impl RunToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of driving a sequence to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every leg completed; the machine is in `Done`.
    Completed,
    /// The run token was cancelled mid-flight; scene state is frozen
    /// wherever the run was, ready for a successor to take over.
    Cancelled,
    /// Route or boundary data was missing; nothing was animated.
    NotReady,
}

/// Timing and shape parameters of a sequence run. Defaults match the
/// product tuning.
#[derive(Debug, Clone, Copy)]
pub struct SequenceConfig {
    /// Fixed overview pose the first flight starts from.
    pub overview: CameraPose,
    pub first_flight: Duration,
    pub arc_duration: Duration,
    pub settle_duration: Duration,
    pub stop_pause: Duration,
    pub initial_pause: Duration,
    /// Peak arc altitude as a fraction of the globe radius.
    pub arc_peak: f64,
    /// Hard cap on live polyline points.
    pub max_polyline_points: usize,
    /// Sample count of the live arc.
    pub live_samples: usize,
    /// Sample count of the baked static trace.
    pub trace_samples: usize,
    /// Altitude after the first flight lands on the exporter.
    pub arrival_altitude: f64,
    /// Altitude the camera settles to at each destination.
    pub settle_altitude: f64,
    /// Camera altitude while tracking the tip: base + tip_alt * gain.
    pub track_base_altitude: f64,
    pub track_altitude_gain: f64,
    pub arrow_scale: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            overview: CameraPose {
                center: GeoPoint::new(0.0, -35.0),
                altitude: 3.2,
            },
            first_flight: Duration::from_millis(2200),
            arc_duration: Duration::from_millis(2600),
            settle_duration: Duration::from_millis(500),
            stop_pause: Duration::from_millis(4000),
            initial_pause: Duration::from_millis(800),
            arc_peak: 0.32,
            max_polyline_points: 200,
            live_samples: 120,
            trace_samples: 80,
            arrival_altitude: 1.9,
            settle_altitude: 1.75,
            track_base_altitude: 1.5,
            track_altitude_gain: 2.6,
            arrow_scale: GLOBE_RADIUS * 0.028,
        }
    }
}

/// Unwinds a cancelled step; private control flow, not an error.
struct Cancelled;

type StepResult = Result<(), Cancelled>;

/// A waypoint with its centroid resolved for this run.
#[derive(Debug, Clone)]
struct Stop {
    waypoint: Waypoint,
    centroid: GeoPoint,
}

/// Drives the multi-phase camera/arc tour over a trade route.
///
/// `play()` borrows the animator exclusively for the duration of a run,
/// which makes the run the single writer of the scene by construction.
/// Concurrent observers read through [`StateHandle`] and cancel through
/// [`RunToken`].
pub struct RouteAnimator<S, C> {
    scene: S,
    clock: C,
    config: SequenceConfig,
    resolver: CentroidResolver,
    boundaries: Option<BoundarySet>,
    route: Option<TradeRoute>,
    state: StateHandle,
    token: RunToken,
    active_highlight: Option<String>,
}

impl<S: GlobeScene, C: FrameClock> RouteAnimator<S, C> {
    pub fn new(scene: S, clock: C) -> Self {
        Self::with_config(scene, clock, SequenceConfig::default())
    }

    pub fn with_config(scene: S, clock: C, config: SequenceConfig) -> Self {
        Self {
            scene,
            clock,
            config,
            resolver: CentroidResolver::new(),
            boundaries: None,
            route: None,
            state: StateHandle::default(),
            token: RunToken::default(),
            active_highlight: None,
        }
    }

    /// Shared handle to the published sequence state.
    pub fn state(&self) -> StateHandle {
        self.state.clone()
    }

    /// The owned scene binding, e.g. for host-side resize or inspection.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Token of the current (or next) run; cancelling it unwinds any
    /// in-flight sequence at its next suspension point.
    pub fn token(&self) -> RunToken {
        self.token.clone()
    }

    /// Cancel the current run. Unmount-equivalent: silent, not an error.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Install new route data.
    ///
    /// Cancels any in-flight run first, resets the machine to `Loading`,
    /// then re-arms to `Ready` if boundary data is already present. Routes
    /// with fewer than two stops are rejected so the caller can fall back
    /// to a sample dataset.
    pub fn set_route(&mut self, route: TradeRoute) -> Result<(), GlobeError> {
        if route.len() < MIN_ANIMATABLE_STOPS {
            return Err(GlobeError::RouteTooShort(route.len()));
        }
        self.begin_new_run();
        self.route = Some(route);
        self.state.reset();
        self.try_ready();
        Ok(())
    }

    /// Install the boundary dataset fetched for this session.
    pub fn set_boundaries(&mut self, boundaries: BoundarySet) {
        self.boundaries = Some(boundaries);
        self.state.set_status("Ready");
        self.try_ready();
    }

    /// Record a failed boundary fetch: the machine stays in `Loading` and
    /// the failure is surfaced as a status line (manual retry).
    pub fn report_boundary_failure(&mut self, err: &GlobeError) {
        tracing::error!("boundary dataset unavailable: {err}");
        self.state
            .set_status(format!("Error: could not load country boundaries: {err}"));
    }

    /// Signal the previous run's token and install a fresh one. The old
    /// token must be flagged before any successor touches the scene.
    fn begin_new_run(&mut self) {
        self.token.cancel();
        self.token = RunToken::default();
    }

    fn try_ready(&self) {
        let ready = self.route.is_some() && self.boundaries.is_some();
        if ready && self.state.snapshot().phase == Phase::Loading {
            self.state.set_phase(Phase::Ready);
        }
    }

    /// Drive the full tour: fly to the exporter, then animate every leg in
    /// order, then release the camera.
    pub async fn play(&mut self) -> PlayOutcome {
        if self.state.snapshot().phase != Phase::Ready {
            tracing::warn!("play requested before the sequence is ready, ignoring");
            return PlayOutcome::NotReady;
        }
        let (Some(route), Some(boundaries)) = (self.route.clone(), self.boundaries.as_ref())
        else {
            return PlayOutcome::NotReady;
        };

        let mut stops = Vec::with_capacity(route.len());
        for waypoint in route.iter() {
            let centroid = self.resolver.resolve(&waypoint.country, boundaries);
            stops.push(Stop {
                waypoint: waypoint.clone(),
                centroid,
            });
        }
        let exporter = route.exporter_country().map(str::to_string);

        let token = self.token.clone();
        self.active_highlight = None;

        match self.run(&token, &stops, exporter.as_deref()).await {
            Ok(()) => {
                self.state.set_phase(Phase::Done);
                self.state
                    .set_status("All routes mapped — free roam enabled");
                self.scene.set_controls_enabled(true);
                tracing::info!("route tour complete after {} stops", stops.len());
                PlayOutcome::Completed
            }
            Err(Cancelled) => {
                tracing::debug!("sequence run cancelled");
                PlayOutcome::Cancelled
            }
        }
    }

    async fn run(
        &mut self,
        token: &RunToken,
        stops: &[Stop],
        exporter: Option<&str>,
    ) -> StepResult {
        self.scene.set_controls_enabled(false);

        let first = &stops[0];
        self.state.set_index(0);
        self.state
            .set_status(format!("Flying to {}…", first.waypoint.country));
        self.highlight(&first.waypoint.country, first.waypoint.role, exporter);

        let overview = self.config.overview;
        self.fly_camera(
            token,
            overview.center,
            first.centroid,
            overview.altitude,
            self.config.arrival_altitude,
            self.config.first_flight,
        )
        .await?;
        self.pause(token, self.config.initial_pause).await?;

        for i in 0..stops.len() - 1 {
            let from = stops[i].clone();
            let to = stops[i + 1].clone();

            self.state.set_status(format!(
                "{}  ──▶  {}",
                from.waypoint.country, to.waypoint.country
            ));
            self.state.set_index(i as i32);

            self.animate_arc(token, from.centroid, to.centroid).await?;

            self.bake_trace(from.centroid, to.centroid);
            self.scene.set_polyline_visible(false);
            self.scene.set_arrow_visible(false);
            self.scene.set_polyline_progress(&[], 0);

            self.highlight(&to.waypoint.country, to.waypoint.role, exporter);
            self.state.set_index((i + 1) as i32);

            let arrival_altitude = self.config.track_base_altitude
                + arc_height(1.0, self.config.arc_peak) * self.config.track_altitude_gain;
            self.fly_camera(
                token,
                to.centroid,
                to.centroid,
                arrival_altitude,
                self.config.settle_altitude,
                self.config.settle_duration,
            )
            .await?;

            self.state.set_status(format!(
                "{} — {}",
                to.waypoint.country, to.waypoint.material
            ));
            self.pause(token, self.config.stop_pause).await?;
        }

        Ok(())
    }

    /// Fly the camera between two surface points over `duration`, easing
    /// position along the great circle and altitude linearly.
    async fn fly_camera(
        &mut self,
        token: &RunToken,
        from: GeoPoint,
        to: GeoPoint,
        altitude_from: f64,
        altitude_to: f64,
        duration: Duration,
    ) -> StepResult {
        if token.is_cancelled() {
            return Err(Cancelled);
        }

        let total = duration.as_secs_f64();
        let started = self.clock.now();
        loop {
            let now = self.clock.next_frame().await;
            if token.is_cancelled() {
                return Err(Cancelled);
            }

            let elapsed = now.saturating_sub(started).as_secs_f64();
            let raw = if total > 0.0 {
                (elapsed / total).min(1.0)
            } else {
                1.0
            };
            let t = ease_in_out(raw);

            let center = slerp(from, to, t);
            let altitude = altitude_from + (altitude_to - altitude_from) * t;
            self.scene.set_camera_pose(CameraPose { center, altitude });

            if raw >= 1.0 {
                return Ok(());
            }
        }
    }

    /// Grow the arc polyline from `from` to `to`, steering the arrow along
    /// the tip and tracking it with the camera.
    async fn animate_arc(&mut self, token: &RunToken, from: GeoPoint, to: GeoPoint) -> StepResult {
        if token.is_cancelled() {
            return Err(Cancelled);
        }

        let samples = self
            .config
            .live_samples
            .min(self.config.max_polyline_points.saturating_sub(1))
            .max(1);
        let arc = self.sample_arc(from, to, samples);
        let positions: Vec<Vec3> = arc.iter().map(|s| s.position).collect();

        self.scene.set_polyline_progress(&positions, 0);
        self.scene.set_polyline_visible(true);
        self.scene.set_arrow_visible(true);

        let total = self.config.arc_duration.as_secs_f64();
        let started = self.clock.now();
        let mut revealed = 0usize;
        loop {
            let now = self.clock.next_frame().await;
            if token.is_cancelled() {
                return Err(Cancelled);
            }

            let elapsed = now.saturating_sub(started).as_secs_f64();
            let raw = if total > 0.0 {
                (elapsed / total).min(1.0)
            } else {
                1.0
            };
            let t = ease_in_out(raw);

            // The draw range only ever grows.
            let index = ((t * samples as f64) as usize).min(samples);
            revealed = revealed.max(index);

            let tip = &arc[revealed];
            let prev = &arc[revealed.saturating_sub(1)];

            self.scene.set_polyline_progress(&positions, revealed + 1);
            self.scene.set_arrow_pose(ArrowPose {
                position: tip.position,
                basis: arrow_basis(prev.position, tip.position),
                scale: self.config.arrow_scale,
            });

            let altitude = self.config.track_base_altitude
                + tip.altitude * self.config.track_altitude_gain;
            self.scene.set_camera_pose(CameraPose {
                center: tip.point,
                altitude,
            });

            if raw >= 1.0 {
                return Ok(());
            }
        }
    }

    /// Wait out a fixed pause, still honoring cancellation on both sides
    /// of the timer.
    async fn pause(&mut self, token: &RunToken, pause: Duration) -> StepResult {
        if token.is_cancelled() {
            return Err(Cancelled);
        }
        self.clock.rest(pause).await;
        if token.is_cancelled() {
            return Err(Cancelled);
        }
        Ok(())
    }

    /// Bake a faint static trace of a completed leg so prior legs stay
    /// visible for the rest of the session.
    fn bake_trace(&mut self, from: GeoPoint, to: GeoPoint) {
        let points = self
            .sample_arc(from, to, self.config.trace_samples.max(1))
            .into_iter()
            .map(|s| s.position)
            .collect();
        self.scene.add_static_trace(points);
    }

    fn sample_arc(&self, from: GeoPoint, to: GeoPoint, samples: usize) -> Vec<ArcSample> {
        (0..=samples)
            .map(|i| {
                let t = i as f64 / samples as f64;
                let point = slerp(from, to, t);
                let altitude = arc_height(t, self.config.arc_peak);
                ArcSample {
                    point,
                    altitude,
                    position: to_cartesian(point, altitude),
                }
            })
            .collect()
    }

    /// Apply role highlighting for the country just reached. The first
    /// exporter keeps its highlight for the whole sequence; the previously
    /// visited importer is faded back to the base fill.
    fn highlight(&mut self, country: &str, role: Role, exporter: Option<&str>) {
        if let Some(previous) = self.active_highlight.take() {
            if previous != country {
                self.scene.set_country_fill(&previous, CountryFill::Base);
            }
        }

        self.scene.set_country_fill(country, role.into());
        if let Some(exporter) = exporter {
            if exporter != country {
                self.scene
                    .set_country_fill(exporter, CountryFill::Exporter);
            }
        }

        if exporter != Some(country) {
            self.active_highlight = Some(country.to_string());
        }
    }
}

/// One precomputed point of a leg's arc.
#[derive(Debug, Clone, Copy)]
struct ArcSample {
    point: GeoPoint,
    altitude: f64,
    position: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_token_cancels_once_and_stays_cancelled() {
        let token = RunToken::default();
        assert!(!token.is_cancelled());

        let observer = token.clone();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(observer.is_cancelled());
    }

    #[test]
    fn state_defaults_to_loading() {
        let state = SequenceState::default();
        assert_eq!(state.phase, Phase::Loading);
        assert_eq!(state.current_index, -1);
        assert_eq!(state.status, "Loading…");
    }

    #[test]
    fn config_defaults_match_product_tuning() {
        let config = SequenceConfig::default();
        assert_eq!(config.arc_duration, Duration::from_millis(2600));
        assert_eq!(config.stop_pause, Duration::from_millis(4000));
        assert!((config.arc_peak - 0.32).abs() < f64::EPSILON);
        assert_eq!(config.overview.center, GeoPoint::new(0.0, -35.0));
    }
}
