//! Periodic update scheduler.
//!
//! A [`Monitor`] is a single tokio task that owns the polling timer. It runs
//! one cycle at startup and then one per interval, publishing each
//! successful schedule on a watch channel. Lifecycle commands arrive over an
//! mpsc channel from any number of [`MonitorHandle`]s and are processed
//! between cycles, so a cycle in progress always runs to completion and two
//! cycles never overlap.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{MonitorConfig, StopConfig};
use crate::nextbus::FeedSource;

use super::cycle::{ScheduleUpdate, run_cycle};

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 16;

/// Latest published schedule; `None` until the first cycle succeeds.
pub type ScheduleReceiver = watch::Receiver<Option<Arc<ScheduleUpdate>>>;

/// Errors talking to a monitor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// The monitor task is no longer running
    #[error("monitor task has shut down")]
    Closed,

    /// Interval of zero requested
    #[error("update interval must be positive")]
    ZeroInterval,
}

/// Lifecycle commands accepted by the monitor task.
#[derive(Debug)]
pub enum MonitorCommand {
    /// Run a cycle now (ignored while stopped).
    FetchNow,
    /// Stop polling. A cycle already running completes.
    Stop,
    /// (Re)start polling at a new interval, fetching immediately.
    Restart { interval: Duration },
    /// Replace the stop configuration.
    Reconfigure(StopConfig),
    /// Report current state.
    Status(oneshot::Sender<MonitorStatus>),
}

/// Snapshot of the monitor's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub interval_ms: u64,
    pub cycles: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

/// Cloneable handle for controlling a monitor and reading its output.
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
    updates: ScheduleReceiver,
}

impl MonitorHandle {
    async fn send(&self, command: MonitorCommand) -> Result<(), MonitorError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| MonitorError::Closed)
    }

    /// Request an immediate cycle.
    pub async fn fetch_now(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::FetchNow).await
    }

    /// Stop polling.
    pub async fn stop(&self) -> Result<(), MonitorError> {
        self.send(MonitorCommand::Stop).await
    }

    /// Restart polling with a new interval.
    pub async fn restart(&self, interval: Duration) -> Result<(), MonitorError> {
        if interval.is_zero() {
            return Err(MonitorError::ZeroInterval);
        }
        self.send(MonitorCommand::Restart { interval }).await
    }

    /// Replace the stops being monitored.
    pub async fn reconfigure(&self, stops: StopConfig) -> Result<(), MonitorError> {
        self.send(MonitorCommand::Reconfigure(stops)).await
    }

    /// Ask the monitor for its current state.
    ///
    /// The reply is sent after every previously queued command is handled.
    pub async fn status(&self) -> Result<MonitorStatus, MonitorError> {
        let (reply, response) = oneshot::channel();
        self.send(MonitorCommand::Status(reply)).await?;
        response.await.map_err(|_| MonitorError::Closed)
    }

    /// Subscribe to schedule updates.
    pub fn subscribe(&self) -> ScheduleReceiver {
        self.updates.clone()
    }

    /// The most recently published schedule, if any.
    pub fn latest(&self) -> Option<Arc<ScheduleUpdate>> {
        self.updates.borrow().clone()
    }
}

/// What woke the monitor loop.
enum Wake {
    Tick,
    Command(MonitorCommand),
    Closed,
}

/// The polling task. Construct and start it with [`Monitor::spawn`].
pub struct Monitor<S> {
    source: S,
    stops: StopConfig,
    period: Duration,
    timer: Option<Interval>,
    commands: mpsc::Receiver<MonitorCommand>,
    updates: watch::Sender<Option<Arc<ScheduleUpdate>>>,
    cycles: u64,
    failures: u64,
    last_error: Option<String>,
}

impl<S: FeedSource> Monitor<S> {
    /// Start polling `source` for the stops in `config`.
    ///
    /// The first cycle runs immediately. The task exits once every handle
    /// has been dropped.
    pub fn spawn(
        source: S,
        config: &MonitorConfig,
    ) -> Result<(MonitorHandle, JoinHandle<()>), MonitorError> {
        let period = config.update_interval();
        if period.is_zero() {
            return Err(MonitorError::ZeroInterval);
        }

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (update_tx, update_rx) = watch::channel(None);

        let monitor = Monitor {
            source,
            stops: config.stops.clone(),
            period,
            timer: Some(new_timer(period)),
            commands: command_rx,
            updates: update_tx,
            cycles: 0,
            failures: 0,
            last_error: None,
        };

        let task = tokio::spawn(monitor.run());
        let handle = MonitorHandle {
            commands: command_tx,
            updates: update_rx,
        };
        Ok((handle, task))
    }

    async fn run(mut self) {
        info!(
            interval_ms = self.period.as_millis() as u64,
            stops = self.stops.len(),
            "monitor started"
        );

        self.cycle().await;

        loop {
            let wake = match self.timer.as_mut() {
                Some(timer) => tokio::select! {
                    biased;
                    _ = timer.tick() => Wake::Tick,
                    command = self.commands.recv() => command.map_or(Wake::Closed, Wake::Command),
                },
                None => self
                    .commands
                    .recv()
                    .await
                    .map_or(Wake::Closed, Wake::Command),
            };

            match wake {
                Wake::Tick => self.cycle().await,
                Wake::Command(command) => self.handle(command).await,
                Wake::Closed => break,
            }
        }

        info!("monitor shut down");
    }

    async fn handle(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::FetchNow => {
                if self.timer.is_some() {
                    self.cycle().await;
                } else {
                    debug!("monitor is stopped; ignoring fetch request");
                }
            }
            MonitorCommand::Stop => {
                if self.timer.take().is_some() {
                    info!("monitor stopped");
                }
            }
            MonitorCommand::Restart { interval } => {
                if interval.is_zero() {
                    warn!("ignoring restart with zero interval");
                    return;
                }
                self.period = interval;
                self.timer = Some(new_timer(interval));
                info!(interval_ms = interval.as_millis() as u64, "monitor restarted");
                self.cycle().await;
            }
            MonitorCommand::Reconfigure(stops) => {
                info!(stops = stops.len(), "stop configuration replaced");
                self.stops = stops;
                if self.timer.is_some() {
                    self.timer = Some(new_timer(self.period));
                    self.cycle().await;
                }
            }
            MonitorCommand::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    async fn cycle(&mut self) {
        self.cycles += 1;
        match run_cycle(&self.source, &self.stops).await {
            Ok(schedule) => {
                info!(stops = schedule.len(), "schedule updated");
                self.last_error = None;
                self.updates
                    .send_replace(Some(Arc::new(ScheduleUpdate::new(schedule))));
            }
            Err(e) => {
                self.failures += 1;
                warn!(error = %e, "update cycle aborted; keeping previous schedule");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn status(&self) -> MonitorStatus {
        MonitorStatus {
            running: self.timer.is_some(),
            interval_ms: self.period.as_millis() as u64,
            cycles: self.cycles,
            failures: self.failures,
            last_error: self.last_error.clone(),
        }
    }
}

/// Interval whose first tick is one period from now and which waits a full
/// period after a late tick rather than bursting.
fn new_timer(period: Duration) -> Interval {
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
