//! NextBus public XML feed HTTP client.
//!
//! Builds the `predictionsForMultiStops` request for a [`StopConfig`] and
//! returns the raw response body. Parsing is left to [`super::normalize`].

use reqwest::Url;
use tracing::debug;

use crate::config::{MonitorConfig, StopConfig};

use super::error::FetchError;
use super::source::FeedSource;

/// Default endpoint for the NextBus public XML feed.
pub const DEFAULT_BASE_URL: &str = "http://webservices.nextbus.com/service/publicXMLFeed";

/// Default agency (San Francisco Muni).
pub const DEFAULT_AGENCY: &str = "sf-muni";

/// Command name for multi-stop predictions.
const PREDICTIONS_COMMAND: &str = "predictionsForMultiStops";

/// Maximum characters of an error body kept in a `FetchError`.
const ERROR_BODY_LIMIT: usize = 500;

/// Configuration for the NextBus client.
#[derive(Debug, Clone)]
pub struct NextBusConfig {
    /// Feed endpoint (defaults to the public NextBus feed)
    pub base_url: String,
    /// Agency tag sent as the `a` parameter
    pub agency: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NextBusConfig {
    /// Create a config with default endpoint and agency.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            agency: DEFAULT_AGENCY.to_string(),
            timeout_secs: 30,
        }
    }

    /// Take endpoint and agency overrides from a monitor config.
    pub fn from_monitor(config: &MonitorConfig) -> Self {
        let mut this = Self::new();
        if let Some(url) = &config.base_url {
            this.base_url = url.clone();
        }
        if let Some(agency) = &config.agency {
            this.agency = agency.clone();
        }
        this
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the agency tag.
    pub fn with_agency(mut self, agency: impl Into<String>) -> Self {
        self.agency = agency.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for NextBusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// NextBus feed client.
#[derive(Debug, Clone)]
pub struct NextBusClient {
    http: reqwest::Client,
    base_url: Url,
    agency: String,
}

impl NextBusClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NextBusConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            agency: config.agency,
        })
    }

    /// Build the request URL for the configured stops.
    ///
    /// Appends `command` and `a`, then one `stops=<route>|<stop>` parameter
    /// per (stop, route) pair in configuration order.
    pub fn build_url(&self, stops: &StopConfig) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("command", PREDICTIONS_COMMAND);
            query.append_pair("a", &self.agency);
            for (stop, route) in stops.pairs() {
                query.append_pair("stops", &format!("{route}|{stop}"));
            }
        }
        url
    }

    /// Fetch the raw predictions XML for the configured stops.
    pub async fn fetch_predictions(&self, stops: &StopConfig) -> Result<String, FetchError> {
        let url = self.build_url(stops);
        debug!(%url, "fetching predictions");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

impl FeedSource for NextBusClient {
    async fn fetch(&self, stops: &StopConfig) -> Result<String, FetchError> {
        self.fetch_predictions(stops).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> StopConfig {
        StopConfig::from_pairs([("6994", &["J", "KT"][..]), ("3328", &["33"][..])])
    }

    #[test]
    fn config_builder() {
        let config = NextBusConfig::new()
            .with_base_url("http://localhost:8080/feed")
            .with_agency("actransit")
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080/feed");
        assert_eq!(config.agency, "actransit");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = NextBusConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.agency, DEFAULT_AGENCY);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_from_monitor_overrides() {
        let mut monitor = MonitorConfig::default();
        monitor.agency = Some("ttc".into());
        let config = NextBusConfig::from_monitor(&monitor);
        assert_eq!(config.agency, "ttc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_base_url_rejected() {
        let result = NextBusClient::new(NextBusConfig::new().with_base_url("not a url"));
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn url_lists_pairs_in_config_order() {
        let client = NextBusClient::new(NextBusConfig::new()).unwrap();
        let url = client.build_url(&stops());

        assert_eq!(
            url.as_str(),
            "http://webservices.nextbus.com/service/publicXMLFeed\
             ?command=predictionsForMultiStops&a=sf-muni\
             &stops=J%7C6994&stops=KT%7C6994&stops=33%7C3328"
        );
    }

    #[test]
    fn url_is_stable() {
        let client = NextBusClient::new(NextBusConfig::new()).unwrap();
        assert_eq!(client.build_url(&stops()), client.build_url(&stops()));
    }

    #[tokio::test]
    async fn fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("command".into(), PREDICTIONS_COMMAND.into()),
                mockito::Matcher::UrlEncoded("a".into(), "sf-muni".into()),
                mockito::Matcher::UrlEncoded("stops".into(), "J|6994".into()),
            ]))
            .with_header("content-type", "text/xml")
            .with_body("<body/>")
            .create_async()
            .await;

        let client =
            NextBusClient::new(NextBusConfig::new().with_base_url(format!("{}/feed", server.url())))
                .unwrap();
        let body = client
            .fetch_predictions(&StopConfig::from_pairs([("6994", &["J"][..])]))
            .await
            .unwrap();

        assert_eq!(body, "<body/>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .with_body("try later")
            .create_async()
            .await;

        let client = NextBusClient::new(NextBusConfig::new().with_base_url(server.url())).unwrap();
        let err = client.fetch_predictions(&stops()).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { status: 503, ref message } if message == "try later"
        ));
    }
}
