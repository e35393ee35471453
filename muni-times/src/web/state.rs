//! Application state for the web layer.

use crate::monitor::MonitorHandle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the polling monitor
    pub monitor: MonitorHandle,
}

impl AppState {
    /// Create a new app state.
    pub fn new(monitor: MonitorHandle) -> Self {
        Self { monitor }
    }
}
