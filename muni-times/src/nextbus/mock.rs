//! Mock feed client for running without network access.
//!
//! Loads sample feed responses from XML files and serves them in turn as if
//! they were live responses, so successive cycles see changing data.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::config::StopConfig;

use super::error::FetchError;
use super::source::FeedSource;

/// Mock feed client that serves bodies loaded from disk.
///
/// Files are served in file-name order and wrap around after the last one.
/// The stop configuration is ignored.
#[derive(Clone)]
pub struct MockFeedClient {
    bodies: Arc<Vec<(PathBuf, String)>>,
    next: Arc<AtomicUsize>,
}

impl MockFeedClient {
    /// Load every `*.xml` file in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();

        let entries = std::fs::read_dir(data_dir).map_err(|e| FetchError::Fixture {
            message: format!("failed to read mock data directory {:?}: {}", data_dir, e),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FetchError::Fixture {
                message: format!("failed to read directory entry: {}", e),
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("xml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut bodies = Vec::with_capacity(paths.len());
        for path in paths {
            let body = std::fs::read_to_string(&path).map_err(|e| FetchError::Fixture {
                message: format!("failed to read {:?}: {}", path, e),
            })?;
            bodies.push((path, body));
        }

        Self::from_bodies(bodies).map_err(|_| FetchError::Fixture {
            message: format!("no mock feed files found in {:?}", data_dir),
        })
    }

    /// Serve the given bodies in order.
    pub fn from_bodies(bodies: Vec<(PathBuf, String)>) -> Result<Self, FetchError> {
        if bodies.is_empty() {
            return Err(FetchError::Fixture {
                message: "no mock feed bodies".to_string(),
            });
        }
        Ok(Self {
            bodies: Arc::new(bodies),
            next: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of loaded bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn next_body(&self) -> &(PathBuf, String) {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.bodies.len();
        &self.bodies[index]
    }
}

impl FeedSource for MockFeedClient {
    async fn fetch(&self, _stops: &StopConfig) -> Result<String, FetchError> {
        let (path, body) = self.next_body();
        debug!(?path, "serving mock feed response");
        Ok(body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nextbus::normalize;

    const DATA_DIR: &str = "data/mock_feeds";

    #[tokio::test]
    async fn load_mock_data() {
        let client = MockFeedClient::new(DATA_DIR).unwrap();
        assert!(client.len() >= 2);
    }

    #[tokio::test]
    async fn bodies_rotate() {
        let client = MockFeedClient::new(DATA_DIR).unwrap();
        let stops = StopConfig::default();

        let first = client.fetch(&stops).await.unwrap();
        for _ in 1..client.len() {
            client.fetch(&stops).await.unwrap();
        }
        let wrapped = client.fetch(&stops).await.unwrap();
        assert_eq!(first, wrapped);
    }

    #[tokio::test]
    async fn fixtures_normalize() {
        let client = MockFeedClient::new(DATA_DIR).unwrap();
        let stops = StopConfig::default();

        for _ in 0..client.len() {
            let body = client.fetch(&stops).await.unwrap();
            let schedule = normalize(&body).unwrap();
            assert!(!schedule.is_empty());
        }
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = MockFeedClient::new("data/does-not-exist");
        assert!(matches!(result, Err(FetchError::Fixture { .. })));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = MockFeedClient::new(dir.path());
        assert!(matches!(result, Err(FetchError::Fixture { .. })));
    }
}
