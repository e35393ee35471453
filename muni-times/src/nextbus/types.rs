//! NextBus `predictionsForMultiStops` response DTOs.
//!
//! These types map directly to the XML response via `quick_xml::de`.
//! Attributes are `@`-prefixed fields. Every attribute is an `Option` here,
//! required ones included, so a missing attribute is reported by
//! normalization as a [`ShapeError`] naming it. Numeric prediction
//! attributes stay as text and are parsed during normalization, so a bad
//! value in a prediction we would discard anyway does not fail the cycle.

use std::fmt;

use serde::Deserialize;
use serde::de::{IgnoredAny, MapAccess, Visitor};

use super::error::{NormalizeError, ShapeError};

/// Top-level element of a document.
#[derive(Debug, Deserialize)]
enum FeedDocument {
    #[serde(rename = "body")]
    Body(RawBody),

    /// Any other root element, or bare text.
    #[serde(other)]
    Other,
}

/// The `<body>` of a response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawBody {
    /// Present when the feed rejected the request.
    #[serde(rename = "Error")]
    pub error: Option<RawError>,

    /// Zero or more fragments, in document order.
    #[serde(rename = "predictions", default)]
    pub predictions: Vec<RawPredictions>,
}

/// An upstream `<Error>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawError {
    #[serde(rename = "$text", default)]
    pub text: String,
}

/// One `<predictions>` fragment, scoped to a single stop and route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawPredictions {
    #[serde(rename = "@stopTag")]
    pub stop_tag: Option<String>,

    #[serde(rename = "@stopTitle")]
    pub stop_title: Option<String>,

    #[serde(rename = "@routeTag")]
    pub route_tag: Option<String>,

    /// Direction title, present only when there are no predictions.
    #[serde(rename = "@dirTitleBecauseNoPredictions")]
    pub dir_title_because_no_predictions: Option<String>,

    #[serde(rename = "message", default)]
    pub messages: Vec<RawMessage>,

    #[serde(rename = "direction", default)]
    pub directions: Vec<RawDirection>,
}

/// A `<direction>` block with its predictions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawDirection {
    #[serde(rename = "@title")]
    pub title: Option<String>,

    #[serde(rename = "prediction", default)]
    pub predictions: Vec<RawPrediction>,
}

/// A single `<prediction>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawPrediction {
    #[serde(rename = "@epochTime")]
    pub epoch_time: Option<String>,

    #[serde(rename = "@seconds")]
    pub seconds: Option<String>,

    #[serde(rename = "@vehiclesInConsist")]
    pub vehicles_in_consist: Option<String>,

    #[serde(rename = "@delayed")]
    pub delayed: Option<String>,
}

/// A `<message>`; attributes are passed through untouched, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub attributes: Vec<(String, String)>,
}

impl RawBody {
    /// Deserialize a raw response body.
    ///
    /// Whitespace-only input is an [`ShapeError::EmptyDocument`]; a root
    /// other than `<body>` is [`ShapeError::MissingBody`].
    pub fn from_xml(raw: &str) -> Result<Self, NormalizeError> {
        if raw.trim().is_empty() {
            return Err(ShapeError::EmptyDocument.into());
        }

        match quick_xml::de::from_str(raw)? {
            FeedDocument::Body(body) => Ok(body),
            FeedDocument::Other => Err(ShapeError::MissingBody.into()),
        }
    }
}

impl<'de> Deserialize<'de> for RawMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct MessageVisitor;

        impl<'de> Visitor<'de> for MessageVisitor {
            type Value = RawMessage;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a <message> element")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut attributes = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    match key.strip_prefix('@') {
                        Some(name) => attributes.push((name.to_string(), map.next_value()?)),
                        // Child elements and text are not part of a message
                        None => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(RawMessage { attributes })
            }
        }

        deserializer.deserialize_map(MessageVisitor)
    }
}
