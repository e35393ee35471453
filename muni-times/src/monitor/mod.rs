//! Polling loop: runs update cycles on a timer and publishes schedules.

mod cycle;
mod scheduler;

pub use cycle::{CycleError, ScheduleUpdate, run_cycle};
pub use scheduler::{
    Monitor, MonitorCommand, MonitorError, MonitorHandle, MonitorStatus, ScheduleReceiver,
};
