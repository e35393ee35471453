use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use muni_times::config::MonitorConfig;
use muni_times::monitor::{Monitor, MonitorHandle};
use muni_times::nextbus::{FeedSource, MockFeedClient, NextBusClient, NextBusConfig};
use muni_times::web::{AppState, create_router};

/// Listen address unless `MUNI_BIND` overrides it.
const DEFAULT_BIND: &str = "127.0.0.1:3000";

fn start_monitor<S: FeedSource>(source: S, config: &MonitorConfig) -> MonitorHandle {
    let (handle, _task) = Monitor::spawn(source, config).expect("Failed to start monitor");
    handle
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = MonitorConfig::from_env().expect("Failed to load configuration");
    info!(
        stops = config.stops.len(),
        interval_ms = config.update_interval_ms,
        "configuration loaded"
    );

    // Serve fixture responses instead of the live feed when MUNI_MOCK_DIR is set
    let monitor = match std::env::var("MUNI_MOCK_DIR") {
        Ok(dir) => {
            info!(%dir, "using mock feed data");
            let client = MockFeedClient::new(&dir).expect("Failed to load mock feed data");
            start_monitor(client, &config)
        }
        Err(_) => {
            let client = NextBusClient::new(NextBusConfig::from_monitor(&config))
                .expect("Failed to create NextBus client");
            start_monitor(client, &config)
        }
    };

    let app = create_router(AppState::new(monitor));

    let addr: SocketAddr = std::env::var("MUNI_BIND")
        .unwrap_or_else(|_| DEFAULT_BIND.to_string())
        .parse()
        .expect("MUNI_BIND must be a socket address");
    info!("MUNI board listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
