//! Data transfer objects for the display endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{Message, RouteEntry, StopEntry, TrainPrediction};
use crate::monitor::ScheduleUpdate;

/// Text shown for a route with no upcoming arrivals.
pub const NO_PREDICTIONS: &str = "No predictions";

/// Text shown before the first schedule arrives.
pub const LOADING_TEXT: &str = "Loading MUNI Times...";

/// Response for `GET /schedule`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScheduleResponse {
    /// No cycle has succeeded yet.
    Loading,
    /// The latest schedule.
    Ready {
        updated_at: String,
        stops: Vec<StopView>,
    },
}

impl ScheduleResponse {
    pub fn from_update(update: Option<&ScheduleUpdate>) -> Self {
        match update {
            None => ScheduleResponse::Loading,
            Some(update) => ScheduleResponse::Ready {
                updated_at: update.updated_at.to_rfc3339(),
                stops: update.schedule.iter().map(StopView::from_entry).collect(),
            },
        }
    }
}

/// A stop ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct StopView {
    pub stop_tag: String,
    pub stop_title: String,
    pub direction_title: Option<String>,

    /// `"<title>: <direction>"`, or the title alone
    pub header: String,

    pub routes: Vec<RouteView>,
    pub messages: Vec<Message>,
}

impl StopView {
    pub fn from_entry(stop: &StopEntry) -> Self {
        Self {
            stop_tag: stop.stop_tag.to_string(),
            stop_title: stop.stop_title.clone(),
            direction_title: stop.direction_title.clone(),
            header: stop.header(),
            routes: stop.routes.iter().map(RouteView::from_entry).collect(),
            messages: stop.messages.clone(),
        }
    }
}

/// One route row.
#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    pub route_tag: String,
    pub trains: Vec<TrainPrediction>,

    /// Display cells: one per train, or a single "No predictions".
    pub arrivals: Vec<String>,
}

impl RouteView {
    pub fn from_entry(route: &RouteEntry) -> Self {
        Self {
            route_tag: route.route_tag.to_string(),
            trains: route.trains.clone(),
            arrivals: arrival_cells(&route.trains),
        }
    }
}

/// Format arrival cells for a route.
///
/// The first train shows minutes and seconds (`"1m 05s"`), later ones only
/// minutes (`"7m"`).
pub fn arrival_cells(trains: &[TrainPrediction]) -> Vec<String> {
    if trains.is_empty() {
        return vec![NO_PREDICTIONS.to_string()];
    }

    trains
        .iter()
        .enumerate()
        .map(|(i, train)| {
            if i == 0 {
                format!("{}m {:02}s", train.minutes(), train.remainder_secs())
            } else {
                format!("{}m", train.minutes())
            }
        })
        .collect()
}

/// Body for `POST /control/restart`.
#[derive(Debug, Deserialize)]
pub struct RestartRequest {
    pub interval_ms: u64,
}

impl RestartRequest {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteTag, Schedule, StopTag};

    fn train(seconds: i64) -> TrainPrediction {
        TrainPrediction {
            epoch_time: 0,
            seconds,
            cars: Some(1),
            delayed: false,
        }
    }

    #[test]
    fn first_arrival_shows_seconds() {
        let cells = arrival_cells(&[train(65), train(420), train(1199)]);
        assert_eq!(cells, vec!["1m 05s", "7m", "19m"]);
    }

    #[test]
    fn arriving_now() {
        assert_eq!(arrival_cells(&[train(0)]), vec!["0m 00s"]);
        assert_eq!(arrival_cells(&[train(59)]), vec!["0m 59s"]);
    }

    #[test]
    fn empty_route_shows_placeholder() {
        assert_eq!(arrival_cells(&[]), vec![NO_PREDICTIONS]);
    }

    #[test]
    fn loading_serializes_with_status_only() {
        let json = serde_json::to_value(ScheduleResponse::from_update(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "loading" }));
    }

    #[test]
    fn ready_includes_stops() {
        let mut stop = StopEntry::new(StopTag::new("3328"), "18th St & Church St".into(), vec![]);
        stop.direction_title = Some("Outbound".into());
        stop.routes.push(RouteEntry::new(RouteTag::new("33"), vec![train(10)]));
        let update = ScheduleUpdate::new(Schedule::new(vec![stop]));

        let json = serde_json::to_value(ScheduleResponse::from_update(Some(&update))).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["stops"][0]["header"], "18th St & Church St: Outbound");
        assert_eq!(json["stops"][0]["routes"][0]["route_tag"], "33");
        assert_eq!(json["stops"][0]["routes"][0]["arrivals"][0], "0m 10s");
        assert_eq!(json["stops"][0]["routes"][0]["trains"][0]["seconds"], 10);
    }
}
