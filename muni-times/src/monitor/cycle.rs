//! A single fetch → normalize cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::StopConfig;
use crate::domain::Schedule;
use crate::nextbus::{FeedSource, FetchError, NormalizeError, normalize};

/// Why a cycle produced no schedule.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The feed could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The body could not be turned into a schedule
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A published schedule with the time it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleUpdate {
    pub schedule: Schedule,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleUpdate {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            updated_at: Utc::now(),
        }
    }
}

/// Fetch the feed once and normalize it.
pub async fn run_cycle<S: FeedSource>(
    source: &S,
    stops: &StopConfig,
) -> Result<Schedule, CycleError> {
    let body = source.fetch(stops).await?;
    Ok(normalize(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nextbus::ShapeError;

    struct StaticSource(Result<&'static str, u16>);

    impl FeedSource for StaticSource {
        async fn fetch(&self, _stops: &StopConfig) -> Result<String, FetchError> {
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(status) => Err(FetchError::Status {
                    status,
                    message: String::new(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn successful_cycle() {
        let source = StaticSource(Ok(
            r#"<body><predictions stopTag="1" stopTitle="S" routeTag="J"/></body>"#,
        ));
        let schedule = run_cycle(&source, &StopConfig::default()).await.unwrap();
        assert_eq!(schedule.len(), 1);
    }

    #[tokio::test]
    async fn transport_failure() {
        let source = StaticSource(Err(502));
        let err = run_cycle(&source, &StopConfig::default()).await.unwrap_err();
        assert!(matches!(err, CycleError::Fetch(FetchError::Status { status: 502, .. })));
    }

    #[tokio::test]
    async fn feed_error() {
        let source = StaticSource(Ok("<body><Error>bad stop</Error></body>"));
        let err = run_cycle(&source, &StopConfig::default()).await.unwrap_err();
        assert!(matches!(err, CycleError::Normalize(NormalizeError::Feed(_))));
        assert_eq!(err.to_string(), "feed reported an error: bad stop");
    }

    #[tokio::test]
    async fn shape_error() {
        let source = StaticSource(Ok("<html/>"));
        let err = run_cycle(&source, &StopConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            CycleError::Normalize(NormalizeError::Shape(ShapeError::MissingBody))
        ));
    }
}
