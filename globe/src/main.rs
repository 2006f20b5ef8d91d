use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use globe::hud::HudView;
use globe::sequencer::MIN_ANIMATABLE_STOPS;
use globe::{
    fetch_boundaries, load_route, sample_route, BoundarySet, RouteAnimator, TokioClock,
    TracingScene, NATURAL_EARTH_COUNTRIES_URL,
};

/// Play an animated great-circle tour of a trade route against the
/// tracing scene binding.
#[derive(Debug, Parser)]
struct Args {
    /// Route JSON file (array of waypoints). Bundled sample when omitted.
    #[arg(long)]
    route: Option<PathBuf>,

    /// Remote boundary dataset to fetch once per session.
    #[arg(long, default_value = NATURAL_EARTH_COUNTRIES_URL)]
    boundaries_url: String,

    /// Local GeoJSON boundary file, overrides the remote fetch.
    #[arg(long)]
    boundaries_file: Option<PathBuf>,

    /// Log HUD snapshots while the tour runs.
    #[arg(long)]
    hud: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "globe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let route = match &args.route {
        Some(path) => match load_route(path) {
            Ok(route) if route.len() >= MIN_ANIMATABLE_STOPS => route,
            Ok(route) => {
                tracing::warn!(
                    "route in {} has only {} stop(s), falling back to the bundled sample",
                    path.display(),
                    route.len()
                );
                sample_route()
            }
            Err(err) => {
                tracing::warn!(
                    "could not load route from {}: {err}, falling back to the bundled sample",
                    path.display()
                );
                sample_route()
            }
        },
        None => sample_route(),
    };
    tracing::info!(
        "route: {}",
        route
            .iter()
            .map(|w| w.country.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    let mut animator = RouteAnimator::new(TracingScene::default(), TokioClock::at_60fps());
    let state = animator.state();

    let boundaries = match &args.boundaries_file {
        Some(path) => BoundarySet::from_file(path),
        None => fetch_boundaries(&args.boundaries_url).await,
    };
    match boundaries {
        Ok(set) => animator.set_boundaries(set),
        Err(err) => {
            // Recoverable: the machine stays in loading, the failure is
            // only visible in the status line.
            animator.report_boundary_failure(&err);
            tracing::info!("status: {}", state.snapshot().status);
            return;
        }
    }

    animator
        .set_route(route.clone())
        .expect("route was validated above");

    let hud_task = args.hud.then(|| {
        let state = state.clone();
        let route = route.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let view = HudView::derive(&state.snapshot(), &route);
                tracing::info!(
                    "[hud] {} | {:>3.0}% | {}",
                    view.stop_counter,
                    view.progress * 100.0,
                    view.status
                );
            }
        })
    });

    let outcome = animator.play().await;

    if let Some(task) = hud_task {
        task.abort();
    }

    tracing::info!("sequence finished: {outcome:?}");
    tracing::info!("status: {}", state.snapshot().status);
}
