use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlobeError {
    #[error("failed to fetch boundary dataset: {0}")]
    BoundaryFetch(#[from] reqwest::Error),
    #[error("boundary dataset request returned HTTP {0}")]
    BoundaryStatus(reqwest::StatusCode),
    #[error("invalid boundary dataset: {0}")]
    BoundaryParse(#[from] serde_json::Error),
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid route data: {0}")]
    RouteParse(serde_json::Error),
    #[error("a route needs at least two waypoints to animate, got {0}")]
    RouteTooShort(usize),
}
