//! Normalization of a raw feed body into a [`Schedule`].
//!
//! The feed returns one `<predictions>` fragment per (stop, route) pair, so
//! a stop served by several routes appears several times. Fragments are
//! folded into one [`StopEntry`] per stop tag, each fragment contributing one
//! [`RouteEntry`] with at most [`MAX_TRAINS_PER_ROUTE`] arrivals. Routes and
//! stops are then put in display order using the weak keys from
//! [`crate::domain::weak_order`].

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::weak_order::{ROUTE_KEY_CHARS, STOP_KEY_CHARS, sort_by_weak_key};
use crate::domain::{Message, RouteEntry, RouteTag, Schedule, StopEntry, StopTag, TrainPrediction};

use super::error::{NormalizeError, ShapeError};
use super::types::{RawBody, RawPrediction, RawPredictions};

/// Arrivals kept per route; later ones in the feed are dropped.
pub const MAX_TRAINS_PER_ROUTE: usize = 3;

/// Parse and normalize a raw feed body.
///
/// Fails on malformed XML, on an `<Error>` response, and on fragments that
/// lack required attributes. A well-formed body with no fragments yields an
/// empty schedule.
pub fn normalize(raw: &str) -> Result<Schedule, NormalizeError> {
    let body = RawBody::from_xml(raw)?;

    if let Some(error) = body.error {
        let message = error.text.trim().to_string();
        warn!(%message, "feed reported an error");
        return Err(NormalizeError::Feed(message));
    }

    if body.predictions.is_empty() {
        warn!("feed response contained no predictions");
    }
    Ok(build_schedule(&body.predictions)?)
}

/// Fold fragments into a sorted schedule.
pub fn build_schedule(fragments: &[RawPredictions]) -> Result<Schedule, ShapeError> {
    let mut stops: Vec<StopEntry> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for fragment in fragments {
        let stop_tag = required(&fragment.stop_tag, "predictions", "stopTag")?;
        let stop_title = required(&fragment.stop_title, "predictions", "stopTitle")?;
        let route_tag = required(&fragment.route_tag, "predictions", "routeTag")?;

        // Only the first direction block is read. It exists only when there
        // are predictions, and its title takes precedence over the
        // no-predictions attribute.
        let first_direction = fragment.directions.first();
        let direction_title = match first_direction {
            Some(direction) => Some(required(&direction.title, "direction", "title")?.to_string()),
            None => fragment.dir_title_because_no_predictions.clone(),
        };

        let trains = match first_direction {
            Some(direction) => direction
                .predictions
                .iter()
                .take(MAX_TRAINS_PER_ROUTE)
                .map(convert_prediction)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let index = *seen.entry(stop_tag).or_insert_with(|| {
            stops.push(new_stop_entry(stop_tag, stop_title, fragment));
            stops.len() - 1
        });
        let stop = &mut stops[index];

        stop.routes.push(RouteEntry::new(RouteTag::new(route_tag), trains));
        sort_by_weak_key(&mut stop.routes, ROUTE_KEY_CHARS, |r| r.route_tag.as_str());

        stop.direction_title = direction_title;
    }

    sort_by_weak_key(&mut stops, STOP_KEY_CHARS, |s| s.stop_title.as_str());

    debug!(
        fragments = fragments.len(),
        stops = stops.len(),
        "normalized feed response"
    );

    Ok(Schedule::new(stops))
}

/// Create the entry for a stop the first time a fragment mentions it.
///
/// Messages are taken from this first fragment only.
fn new_stop_entry(stop_tag: &str, stop_title: &str, fragment: &RawPredictions) -> StopEntry {
    let messages = fragment
        .messages
        .iter()
        .map(|m| Message::new(m.attributes.clone()))
        .collect();

    StopEntry::new(StopTag::new(stop_tag), stop_title.to_string(), messages)
}

fn required<'a>(
    value: &'a Option<String>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ShapeError> {
    value
        .as_deref()
        .ok_or(ShapeError::MissingAttribute { element, attribute })
}

fn convert_prediction(raw: &RawPrediction) -> Result<TrainPrediction, ShapeError> {
    Ok(TrainPrediction {
        epoch_time: parse_number(required(&raw.epoch_time, "prediction", "epochTime")?, "epochTime")?,
        seconds: parse_number(required(&raw.seconds, "prediction", "seconds")?, "seconds")?,
        cars: raw
            .vehicles_in_consist
            .as_deref()
            .map(|v| parse_number(v, "vehiclesInConsist"))
            .transpose()?,
        delayed: raw.delayed.as_deref().is_some_and(is_true),
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, attribute: &'static str) -> Result<T, ShapeError> {
    value.trim().parse().map_err(|_| ShapeError::InvalidNumber {
        element: "prediction",
        attribute,
        value: value.to_string(),
    })
}

/// Only an explicit `true` marks a prediction as delayed.
fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
