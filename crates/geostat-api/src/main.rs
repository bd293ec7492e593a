use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geostat_api::router::{cors_layer, create_router};
use geostat_api::{ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geostat_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    let engine = config.engine_config().context("Invalid engine configuration")?;

    tracing::info!(
        port = config.port,
        config_file = ?config.config_path,
        max_radius_meters = engine.max_radius_meters.value,
        default_radius_meters = engine.default_radius_meters.value,
        feature_limit = engine.feature_limit.value,
        geometry_validity = ?engine.geometry_validity.value,
        max_upload_bytes = engine.max_upload_bytes.value,
        "Starting Geostat API server"
    );

    for (key, (value, source)) in engine.to_inspection_map() {
        tracing::debug!(setting = %key, %value, ?source, "Engine setting");
    }

    let state = Arc::new(AppState::in_memory(engine));

    let cors = cors_layer(&config.cors_origin)
        .with_context(|| format!("Invalid GEOSTAT_CORS_ORIGIN: {}", config.cors_origin))?;

    let app = create_router(state).layer(cors);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
