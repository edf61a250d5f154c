//! Periodic sampling loop
//!
//! Each tick samples the raw pressure code, classifies it, notifies the sink
//! only when the level differs from the previous tick, then samples swap
//! usage and notifies the sink unconditionally. Sampling failures never stop
//! the loop: pressure degrades to Unknown and swap to zero.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::memory::classifier::format_bytes_as_mb;
use crate::memory::sampler::{sample_pressure, sample_swap, MemorySampler, SystemSampler};
use crate::memory::sink::PresentationSink;
use crate::memory::types::{MonitorConfig, PressureLevel};

/// Loop-owned transition state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    last_pressure: Option<PressureLevel>,
}

impl MonitorState {
    pub fn last_pressure(&self) -> Option<PressureLevel> {
        self.last_pressure
    }

    /// Records `level` and returns true when it is a transition
    fn observe(&mut self, level: PressureLevel) -> bool {
        if self.last_pressure == Some(level) {
            return false;
        }
        self.last_pressure = Some(level);
        true
    }
}

/// Memory pressure monitor driving a sampler and a presentation sink
pub struct PressureMonitor<S, P> {
    sampler: S,
    sink: P,
    config: MonitorConfig,
    state: MonitorState,
    ticks: u64,
    active: Arc<AtomicBool>,
}

impl<S, P> std::fmt::Debug for PressureMonitor<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressureMonitor")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<P: PresentationSink> PressureMonitor<SystemSampler, P> {
    /// Creates a monitor reading the running kernel at the default interval
    pub fn with_system_sampler(sink: P) -> Self {
        Self {
            sampler: SystemSampler::new(),
            sink,
            config: MonitorConfig::default(),
            state: MonitorState::default(),
            ticks: 0,
            active: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl<S: MemorySampler, P: PresentationSink> PressureMonitor<S, P> {
    pub fn new(sampler: S, sink: P, config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sampler,
            sink,
            config,
            state: MonitorState::default(),
            ticks: 0,
            active: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Last classified level, `None` before the first tick
    pub fn last_pressure(&self) -> Option<PressureLevel> {
        self.state.last_pressure()
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Runs one sampling and classification cycle
    #[instrument(level = "debug", skip_all, fields(tick = self.ticks + 1))]
    pub async fn tick(&mut self) {
        self.ticks += 1;

        let level = sample_pressure(&self.sampler).await;
        if !self.is_active() {
            debug!("monitor stopped while sampling, discarding tick");
            return;
        }

        if self.state.observe(level) {
            info!(%level, "memory pressure changed");
            self.sink.pressure_changed(level);
        }

        self.refresh_swap().await;
    }

    /// Samples swap usage and pushes the formatted value to the sink.
    ///
    /// Does not touch the pressure state, so it can be called any number of
    /// times between ticks.
    pub async fn refresh_swap(&mut self) {
        let swap = sample_swap(&self.sampler).await;
        if !self.is_active() {
            debug!("monitor stopped while sampling, discarding swap update");
            return;
        }

        let text = format_bytes_as_mb(swap.used);
        debug!(used = swap.used, total = swap.total, display = %text, "swap usage sampled");
        self.sink.swap_updated(&text);
    }
}

impl<S, P> PressureMonitor<S, P>
where
    S: MemorySampler + 'static,
    P: PresentationSink + 'static,
{
    /// Moves the monitor onto a tokio task and starts ticking.
    ///
    /// The first tick runs immediately; later ticks follow the configured
    /// interval. Must be called from within a tokio runtime.
    pub fn spawn(self) -> MonitorHandle {
        let active = self.active.clone();
        let shutdown = Arc::new(Notify::new());
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(self.run(refresh_rx, shutdown.clone()));

        MonitorHandle { active, shutdown, refresh_tx, task: Some(task) }
    }

    async fn run(mut self, mut refresh_rx: UnboundedReceiver<()>, shutdown: Arc<Notify>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = self.config.poll_interval.as_millis() as u64, "memory pressure monitor started");

        while self.is_active() {
            tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                _ = interval.tick() => self.tick().await,
                Some(()) = refresh_rx.recv() => {
                    debug!("swap refresh requested");
                    self.refresh_swap().await;
                }
            }
        }

        info!(ticks = self.ticks, "memory pressure monitor stopped");
    }
}

/// Handle to a spawned monitor loop
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct MonitorHandle {
    active: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    refresh_tx: UnboundedSender<()>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Asks the loop for an out-of-band swap refresh, e.g. before a menu opens.
    ///
    /// Returns false once the loop has stopped.
    pub fn request_swap_refresh(&self) -> bool {
        self.is_active() && self.refresh_tx.send(()).is_ok()
    }

    /// Stops the loop. No tick starts afterwards; a sample in flight finishes
    /// but its result is discarded.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.shutdown.notify_one();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the loop and waits for the task to finish
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop();
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
