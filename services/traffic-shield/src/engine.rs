//! Engine: owns the single live ticker and switches it between devices

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SimulatorConfig;
use crate::error::{Result, TrafficShieldError};
use crate::source::{Clock, RandomSource, StdRandomSource, SystemClock};
use crate::state::StateHandle;

/// Builds a fresh random source for each ticker
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

/// A running ticker bound to one device. Consumed by [`TickerHandle::stop`].
#[derive(Debug)]
pub struct TickerHandle {
    device_id: String,
    generation: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel the ticker and wait for its task to finish
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("Ticker for '{}' ended abnormally: {}", self.device_id, e);
        }
        tracing::debug!("Ticker for '{}' stopped", self.device_id);
    }
}

/// Spawn a ticker writing into `state` on behalf of `generation`
pub fn start_ticker(
    state: StateHandle,
    device_id: &str,
    generation: u64,
    interval: Duration,
    clock: Arc<dyn Clock>,
    source: Box<dyn RandomSource>,
    parent: &CancellationToken,
) -> TickerHandle {
    let cancel = parent.child_token();
    let task = tokio::spawn(tick_loop(
        state,
        device_id.to_string(),
        generation,
        interval,
        clock,
        source,
        cancel.clone(),
    ));

    TickerHandle {
        device_id: device_id.to_string(),
        generation,
        cancel,
        task,
    }
}

async fn tick_loop(
    state: StateHandle,
    device_id: String,
    generation: u64,
    interval: Duration,
    clock: Arc<dyn Clock>,
    mut source: Box<dyn RandomSource>,
    cancel: CancellationToken,
) {
    // Deadlines stay on the fixed grid even when a tick waits on the lock
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Tick loop for '{}' cancelled", device_id);
                break;
            }
        }

        let now = clock.now();
        let outcome = state
            .write()
            .await
            .apply_tick(generation, &now, source.as_mut());

        let Some(outcome) = outcome else {
            tracing::debug!(
                "Tick loop for '{}' no longer owns the stream (generation {})",
                device_id,
                generation
            );
            break;
        };

        tracing::debug!(
            "Tick '{}': reading={} ledger={:?} alert={:?}",
            device_id,
            outcome.reading_id,
            outcome.ledger_id,
            outcome.alert_id
        );
        if let Some(alert_id) = outcome.alert_id {
            tracing::info!("Anomaly alert {} raised for '{}'", alert_id, device_id);
        }
    }
}

/// Drives the simulated streams for whichever device is selected
pub struct Engine {
    state: StateHandle,
    interval: Duration,
    clock: Arc<dyn Clock>,
    sources: SourceFactory,
    active: Mutex<Option<TickerHandle>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("interval", &self.interval)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: &SimulatorConfig, state: StateHandle, cancel: CancellationToken) -> Self {
        Self {
            state,
            interval: config.tick_interval(),
            clock: Arc::new(SystemClock),
            sources: Arc::new(|| Box::new(StdRandomSource::from_entropy()) as Box<dyn RandomSource>),
            active: Mutex::new(None),
            cancel,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sources(mut self, sources: SourceFactory) -> Self {
        self.sources = sources;
        self
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Switch the stream to `device_id`
    ///
    /// The previous ticker is stopped before the new one starts. An empty id
    /// stops the stream without starting another ticker. An id outside the
    /// device registry is rejected and leaves the running ticker alone.
    pub async fn select_device(&self, device_id: &str) -> Result<()> {
        let device_id = device_id.trim();
        let mut active = self.active.lock().await;

        if !device_id.is_empty() && !self.state.read().await.devices.contains(device_id) {
            return Err(TrafficShieldError::UnknownDevice(device_id.to_string()));
        }

        if let Some(previous) = active.take() {
            tracing::debug!("Stopping ticker for '{}'", previous.device_id());
            previous.stop().await;
        }

        if device_id.is_empty() {
            self.state.write().await.end_session();
            tracing::info!("No device selected, simulator idle");
            return Ok(());
        }

        let generation = self.state.write().await.begin_session(device_id);
        *active = Some(start_ticker(
            Arc::clone(&self.state),
            device_id,
            generation,
            self.interval,
            Arc::clone(&self.clock),
            (self.sources)(),
            &self.cancel,
        ));

        tracing::info!(
            "Simulating device '{}' every {:?}",
            device_id,
            self.interval
        );
        Ok(())
    }

    /// Device the live ticker is bound to, if any
    pub async fn active_device(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|h| h.device_id().to_string())
    }

    /// Stop the live ticker, if any
    pub async fn stop(&self) {
        if let Some(handle) = self.active.lock().await.take() {
            handle.stop().await;
        }
        self.state.write().await.end_session();
    }

    /// Block until the cancellation token fires, then tear the ticker down
    pub async fn run(&self) {
        self.cancel.cancelled().await;
        self.stop().await;
    }
}
