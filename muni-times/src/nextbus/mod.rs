//! NextBus prediction feed.
//!
//! This module fetches the `predictionsForMultiStops` XML feed and turns it
//! into a [`crate::domain::Schedule`].
//!
//! Pipeline:
//! - `client` builds the request URL and returns the raw body
//! - `types` deserializes the body into response DTOs
//! - `convert` validates fragments, folds them into stops and applies
//!   display order

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{DEFAULT_AGENCY, DEFAULT_BASE_URL, NextBusClient, NextBusConfig};
pub use convert::{MAX_TRAINS_PER_ROUTE, build_schedule, normalize};
pub use error::{FetchError, NormalizeError, ShapeError};
pub use mock::MockFeedClient;
pub use source::FeedSource;
pub use types::{RawBody, RawDirection, RawError, RawMessage, RawPrediction, RawPredictions};
