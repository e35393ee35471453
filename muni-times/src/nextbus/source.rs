//! Abstraction over where raw feed bodies come from.

use std::future::Future;

use crate::config::StopConfig;

use super::error::FetchError;

/// Something that can produce a raw predictions body for a stop config.
///
/// Implemented by the live [`super::NextBusClient`] and by
/// [`super::MockFeedClient`], so the monitor can run without network access.
pub trait FeedSource: Send + Sync + 'static {
    /// Fetch one raw response body.
    fn fetch(&self, stops: &StopConfig) -> impl Future<Output = Result<String, FetchError>> + Send;
}
