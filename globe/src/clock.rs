use std::time::Duration;

/// Default frame period of the production clock, about 60 fps.
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

/// Clock driving the sequencer's continuous motion and fixed pauses.
///
/// Abstracting the clock keeps the sequencer deterministic under test:
/// `TokioClock` paces a real run, `ManualClock` advances virtual time one
/// fixed step per frame so a whole sequence plays out instantly.
///
/// Timestamps are durations since clock start; implementations must be
/// monotone.
#[allow(async_fn_in_trait)]
pub trait FrameClock {
    /// Current timestamp.
    fn now(&self) -> Duration;

    /// Suspend until the next frame tick, then return the new timestamp.
    async fn next_frame(&mut self) -> Duration;

    /// Suspend for a fixed pause.
    async fn rest(&mut self, pause: Duration);
}

/// Production clock backed by `tokio::time`.
///
/// Must be created inside a Tokio runtime.
pub struct TokioClock {
    started: tokio::time::Instant,
    frames: tokio::time::Interval,
}

impl TokioClock {
    pub fn new(frame_period: Duration) -> Self {
        let mut frames = tokio::time::interval(frame_period);
        frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        Self {
            started: tokio::time::Instant::now(),
            frames,
        }
    }

    pub fn at_60fps() -> Self {
        Self::new(DEFAULT_FRAME_PERIOD)
    }
}

impl FrameClock for TokioClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    async fn next_frame(&mut self) -> Duration {
        self.frames.tick().await;
        self.now()
    }

    async fn rest(&mut self, pause: Duration) {
        tokio::time::sleep(pause).await;
    }
}

/// Deterministic virtual-time clock for tests.
///
/// `next_frame` advances by a fixed step, `rest` jumps over the whole
/// pause, so no test ever waits on wall time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Duration,
    step: Duration,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
        }
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    async fn next_frame(&mut self) -> Duration {
        self.now += self.step;
        self.now
    }

    async fn rest(&mut self, pause: Duration) {
        self.now += pause;
    }
}
