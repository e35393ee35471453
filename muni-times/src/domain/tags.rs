//! Stop and route identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A NextBus stop tag (e.g. `"3328"`).
///
/// Tags are opaque identifiers. They are usually numeric but the feed
/// treats them as strings, and so do we.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopTag(String);

impl StopTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopTag({})", self.0)
    }
}

impl fmt::Display for StopTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A NextBus route tag (e.g. `"N"`, `"KT"`, `"33"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTag(String);

impl RouteTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteTag({})", self.0)
    }
}

impl fmt::Display for RouteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_tag() {
        assert_eq!(StopTag::new("3328").to_string(), "3328");
        assert_eq!(RouteTag::new("KT").to_string(), "KT");
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", StopTag::new("6994")), "StopTag(6994)");
        assert_eq!(format!("{:?}", RouteTag::new("N")), "RouteTag(N)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&RouteTag::new("33")).unwrap();
        assert_eq!(json, "\"33\"");

        let tag: StopTag = serde_json::from_str("\"3328\"").unwrap();
        assert_eq!(tag.as_str(), "3328");
    }
}
