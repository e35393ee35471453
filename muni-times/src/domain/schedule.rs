//! The normalized schedule handed to the display layer.
//!
//! A [`Schedule`] is built from scratch on every update cycle and replaces
//! the previous one wholesale. Nothing here is mutated after construction
//! except by the normalizer while it is assembling a new schedule.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{RouteTag, StopTag};

/// One predicted arrival of a vehicle at a stop.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrainPrediction {
    /// Predicted arrival, milliseconds since the Unix epoch.
    pub epoch_time: u64,

    /// Seconds until arrival, as reported by the feed.
    pub seconds: i64,

    /// Number of vehicles in the consist, when the feed reports it.
    pub cars: Option<u32>,

    /// Whether the feed flagged this vehicle as delayed.
    pub delayed: bool,
}

impl TrainPrediction {
    /// Whole minutes until arrival, rounded down.
    pub fn minutes(&self) -> i64 {
        self.seconds.div_euclid(60)
    }

    /// Seconds past the whole minute (0..60).
    pub fn remainder_secs(&self) -> i64 {
        self.seconds.rem_euclid(60)
    }
}

/// Predictions for one route at a stop.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RouteEntry {
    pub route_tag: RouteTag,

    /// Upcoming arrivals in feed order.
    pub trains: Vec<TrainPrediction>,
}

impl RouteEntry {
    pub fn new(route_tag: RouteTag, trains: Vec<TrainPrediction>) -> Self {
        Self { route_tag, trains }
    }
}

/// A service alert attached to a stop.
///
/// The feed's message attributes are opaque to us; they are carried through
/// in document order and serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    attributes: Vec<(String, String)>,
}

impl Message {
    pub fn new(attributes: Vec<(String, String)>) -> Self {
        Self { attributes }
    }

    /// Look up an attribute by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Everything known about one stop in a single feed response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StopEntry {
    pub stop_tag: StopTag,
    pub stop_title: String,

    /// Direction of travel; the last fragment processed for the stop wins.
    pub direction_title: Option<String>,

    pub routes: Vec<RouteEntry>,

    /// Alerts from the first fragment that mentioned this stop.
    pub messages: Vec<Message>,
}

impl StopEntry {
    pub fn new(stop_tag: StopTag, stop_title: String, messages: Vec<Message>) -> Self {
        Self {
            stop_tag,
            stop_title,
            direction_title: None,
            routes: Vec::new(),
            messages,
        }
    }

    /// Header text for display: `"<title>: <direction>"`, or the bare title.
    pub fn header(&self) -> String {
        match &self.direction_title {
            Some(direction) => format!("{}: {}", self.stop_title, direction),
            None => self.stop_title.clone(),
        }
    }
}

/// The ordered list of stops produced by one update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct Schedule {
    pub stops: Vec<StopEntry>,
}

impl Schedule {
    pub fn new(stops: Vec<StopEntry>) -> Self {
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StopEntry> {
        self.stops.iter()
    }
}
