use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bus_server::cache::{CacheConfig, CachedDataMall};
use bus_server::config::AppConfig;
use bus_server::datamall::{DataMallApi, DataMallClient, DataMallConfig, MockDataMall};
use bus_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    match &config.mock_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving DataMall fixtures");
            let api = MockDataMall::from_dir(dir).expect("Failed to load DataMall fixtures");
            serve(api, &config).await;
        }
        None => {
            let mut datamall_config = DataMallConfig::new(&config.account_key);
            if let Some(url) = &config.base_url {
                datamall_config = datamall_config.with_base_url(url);
            }
            let api = DataMallClient::new(datamall_config).expect("Failed to create DataMall client");
            serve(api, &config).await;
        }
    }
}

async fn serve<A: DataMallApi + 'static>(api: A, config: &AppConfig) {
    let datamall = CachedDataMall::new(api, &CacheConfig::default());

    // Warm the reference cache so the first lookup is fast. A failure here is
    // not fatal: lookups retry the fetch.
    tracing::info!("Fetching bus stops and routes...");
    let reference = datamall.reference_data().await;
    match &reference.error {
        None => tracing::info!(
            stops = reference.data.stops.len(),
            services = reference.data.routes.service_count(),
            "Loaded reference data"
        ),
        Some(e) => tracing::warn!(
            error = %e,
            stops = reference.data.stops.len(),
            "Reference data incomplete; will retry on demand"
        ),
    }

    let state = AppState::new(datamall, config.utc_offset);
    let app = create_router(state, &config.static_dir);

    let addr: SocketAddr = config.bind_addr;
    tracing::info!("Bus arrival board listening on http://{addr}");
    tracing::info!("  GET /?stop=CODE         - Stop board page");
    tracing::info!("  GET /api/stops/:code    - Stop board as JSON");
    tracing::info!("  GET /api/alerts         - Train disruption status");
    tracing::info!("  GET /health             - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
