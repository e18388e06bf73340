//! Progress simulator
//!
//! Each started upload gets one spawned timer task that produces synthetic
//! progress and reports it through a [`ProgressSink`]. Timers are keyed by
//! file id and cancelled through a [`CancellationToken`].

use async_trait::async_trait;
use dropzone_core::{Config, FileId};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Receiver of simulated progress.
///
/// Implementations handle their own failures; the simulator never retries.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Progress below 100. May arrive just after the entry was cancelled.
    async fn on_tick(&self, id: FileId, percent: u8);

    /// The entry reached 100%. Called once, after the timer has stopped.
    async fn on_finished(&self, id: FileId);
}

/// Lifecycle of one simulated upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Pending,
    Ticking,
    Done,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Progress(u8),
    Complete,
}

/// Tick arithmetic for one upload, free of timers and randomness.
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    progress: f64,
    state: SimulationState,
}

impl Default for ProgressCounter {
    fn default() -> Self {
        Self {
            progress: 0.0,
            state: SimulationState::Pending,
        }
    }
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `increment` percent. Reaching 100 clamps and finishes the counter;
    /// further calls keep returning [`Tick::Complete`].
    pub fn advance(&mut self, increment: f64) -> Tick {
        if self.state == SimulationState::Done {
            return Tick::Complete;
        }

        self.progress += increment.max(0.0);
        if self.progress >= 100.0 {
            self.progress = 100.0;
            self.state = SimulationState::Done;
            Tick::Complete
        } else {
            self.state = SimulationState::Ticking;
            Tick::Progress(self.percent())
        }
    }

    /// Current progress, floored.
    pub fn percent(&self) -> u8 {
        self.progress.floor() as u8
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }
}

/// How much each tick adds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Increment {
    /// Uniform in `[0, max)`.
    Random { max: f64 },
    Fixed(f64),
}

impl Increment {
    fn sample(&self) -> f64 {
        match *self {
            Increment::Random { max } if max > 0.0 => rand::rng().random_range(0.0..max),
            Increment::Random { .. } => 0.0,
            Increment::Fixed(step) => step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorConfig {
    pub tick_interval: Duration,
    pub increment: Increment,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            increment: Increment::Random { max: 15.0 },
        }
    }
}

impl SimulatorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.upload_tick_interval(),
            increment: Increment::Random {
                max: config.upload_max_increment,
            },
        }
    }
}

/// Runs one cancellable timer per uploading entry.
#[derive(Clone)]
pub struct ProgressSimulator {
    config: SimulatorConfig,
    timers: Arc<Mutex<HashMap<FileId, CancellationToken>>>,
}

impl ProgressSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Start ticking for `id`. Returns `false` if a timer is already running
    /// for it.
    pub fn start(&self, id: FileId, sink: Arc<dyn ProgressSink>) -> bool {
        let token = CancellationToken::new();
        {
            let mut timers = lock(&self.timers);
            if timers.contains_key(&id) {
                tracing::warn!(file_id = %id, "Progress timer already running");
                return false;
            }
            timers.insert(id, token.clone());
        }

        let timers = Arc::clone(&self.timers);
        let config = self.config;
        tokio::spawn(async move {
            run_timer(id, config, token, timers, sink).await;
        });

        tracing::debug!(
            file_id = %id,
            tick_interval_ms = self.config.tick_interval.as_millis() as u64,
            "Progress timer started"
        );
        true
    }

    /// Stop the timer for `id`. Once this returns the timer schedules nothing
    /// further, but a tick that already passed its cancellation check may
    /// still reach the sink; sinks drop updates for ids they no longer track.
    pub fn cancel(&self, id: FileId) -> bool {
        match lock(&self.timers).remove(&id) {
            Some(token) => {
                token.cancel();
                tracing::debug!(file_id = %id, "Progress timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Stop every running timer and return how many were stopped.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(FileId, CancellationToken)> = lock(&self.timers).drain().collect();
        for (_, token) in &drained {
            token.cancel();
        }
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "Cancelled all progress timers");
        }
        drained.len()
    }

    pub fn is_ticking(&self, id: FileId) -> bool {
        lock(&self.timers).contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.timers).len()
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

fn lock(
    timers: &Mutex<HashMap<FileId, CancellationToken>>,
) -> MutexGuard<'_, HashMap<FileId, CancellationToken>> {
    // The map stays consistent even if a holder panicked.
    timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_timer(
    id: FileId,
    config: SimulatorConfig,
    token: CancellationToken,
    timers: Arc<Mutex<HashMap<FileId, CancellationToken>>>,
    sink: Arc<dyn ProgressSink>,
) {
    let start = Instant::now();
    let mut interval = tokio::time::interval_at(start + config.tick_interval, config.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut counter = ProgressCounter::new();

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::trace!(file_id = %id, "Progress timer stopped by cancellation");
                return;
            }
            _ = interval.tick() => {}
        }

        match counter.advance(config.increment.sample()) {
            Tick::Progress(percent) => {
                if token.is_cancelled() {
                    return;
                }
                sink.on_tick(id, percent).await;
            }
            Tick::Complete => {
                {
                    let mut map = lock(&timers);
                    if token.is_cancelled() {
                        return;
                    }
                    map.remove(&id);
                }
                tracing::debug!(
                    file_id = %id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Simulated upload reached 100%"
                );
                sink.on_finished(id).await;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Tick(FileId, u8),
        Finished(FileId),
    }

    struct ChannelSink(mpsc::UnboundedSender<Event>);

    #[async_trait]
    impl ProgressSink for ChannelSink {
        async fn on_tick(&self, id: FileId, percent: u8) {
            let _ = self.0.send(Event::Tick(id, percent));
        }

        async fn on_finished(&self, id: FileId) {
            let _ = self.0.send(Event::Finished(id));
        }
    }

    fn channel_sink() -> (Arc<dyn ProgressSink>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ChannelSink(tx)), rx)
    }

    fn fixed(step: f64) -> ProgressSimulator {
        ProgressSimulator::new(SimulatorConfig {
            tick_interval: Duration::from_millis(200),
            increment: Increment::Fixed(step),
        })
    }

    #[test]
    fn counter_floors_and_clamps() {
        let mut counter = ProgressCounter::new();
        assert_eq!(counter.state(), SimulationState::Pending);

        assert_eq!(counter.advance(12.7), Tick::Progress(12));
        assert_eq!(counter.state(), SimulationState::Ticking);
        assert_eq!(counter.advance(80.0), Tick::Progress(92));
        assert_eq!(counter.advance(14.9), Tick::Complete);
        assert_eq!(counter.percent(), 100);
        assert_eq!(counter.state(), SimulationState::Done);
        assert_eq!(counter.advance(1.0), Tick::Complete);
    }

    #[test]
    fn random_increment_stays_in_range() {
        let increment = Increment::Random { max: 15.0 };
        for _ in 0..1000 {
            let step = increment.sample();
            assert!((0.0..15.0).contains(&step));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_complete() {
        let simulator = fixed(25.0);
        let (sink, mut rx) = channel_sink();
        let id = FileId(1);

        let started = Instant::now();
        assert!(simulator.start(id, sink));
        assert!(simulator.is_ticking(id));

        assert_eq!(rx.recv().await, Some(Event::Tick(id, 25)));
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(rx.recv().await, Some(Event::Tick(id, 50)));
        assert_eq!(rx.recv().await, Some(Event::Tick(id, 75)));
        assert_eq!(rx.recv().await, Some(Event::Finished(id)));

        assert!(!simulator.is_ticking(id));
        assert_eq!(simulator.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn random_simulation_finishes() {
        let simulator = ProgressSimulator::default();
        let (sink, mut rx) = channel_sink();
        simulator.start(FileId(3), sink);

        let mut last = 0;
        loop {
            match rx.recv().await {
                Some(Event::Tick(_, percent)) => {
                    assert!(percent >= last && percent < 100);
                    last = percent;
                }
                Some(Event::Finished(id)) => {
                    assert_eq!(id, FileId(3));
                    break;
                }
                None => panic!("sink dropped before completion"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_sink_calls() {
        let simulator = fixed(10.0);
        let (sink, mut rx) = channel_sink();
        let id = FileId(2);

        simulator.start(id, sink);
        assert_eq!(rx.recv().await, Some(Event::Tick(id, 10)));

        assert!(simulator.cancel(id));
        assert!(!simulator.is_ticking(id));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        assert!(!simulator.cancel(id));
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_start_rejected() {
        let simulator = fixed(10.0);
        let (sink, _rx) = channel_sink();

        assert!(simulator.start(FileId(1), Arc::clone(&sink)));
        assert!(!simulator.start(FileId(1), sink));
        assert_eq!(simulator.active_count(), 1);
        simulator.cancel_all();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_everything() {
        let simulator = fixed(1.0);
        let (sink, mut rx) = channel_sink();
        for id in 1..=3 {
            simulator.start(FileId(id), Arc::clone(&sink));
        }

        assert_eq!(simulator.cancel_all(), 3);
        assert_eq!(simulator.active_count(), 0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
