use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use washbay_core::observability::logging::init_tracing;
use washbay_dashboard::config::get_configuration;
use washbay_dashboard::services::api_client::ApiClient;
use washbay_dashboard::services::metrics::init_metrics;
use washbay_dashboard::startup::build_router;
use washbay_dashboard::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "washbay-dashboard",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    init_metrics().map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let api = ApiClient::new(configuration.api.clone())?;
    info!(api = %api.base_url(), "Using car wash API");
    let state = AppState::new(Arc::new(api), configuration.demo.enabled);

    let app = build_router(state, &configuration.server);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting washbay-dashboard on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
