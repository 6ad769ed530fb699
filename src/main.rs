// JMA Weather API v0.1
use axum::http::{HeaderName, Method};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod routes;
mod services;

use config::{AppConfig, LogFormat};
use services::jma::JmaClient;

/// Maximum number of connections in the cache pool. SQLite serializes
/// writers on its file lock, so a small pool is enough.
const DB_POOL_MAX_CONNECTIONS: u32 = 4;

/// JMA Weather API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "JMA Weather API",
        version = "0.1.0",
        description = "Japanese weather forecasts from the Japan Meteorological Agency. \
            Caches the region/prefecture catalog and per-prefecture forecasts in SQLite, \
            and serves 7-day daily summaries and per-slot detail for each forecast area.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Regions", description = "Region and prefecture catalog"),
        (name = "Forecasts", description = "Daily and per-slot forecasts"),
    ),
    paths(
        routes::health::health_check,
        routes::regions::list_regions,
        routes::regions::list_prefectures,
        routes::forecasts::get_prefecture_forecast,
        routes::forecasts::get_prefecture_hourly_forecast,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::forecasts::DailyForecastResponse,
            routes::forecasts::AreaResponse,
            routes::forecasts::HourlyEntry,
            routes::forecasts::HourlyForecastResponse,
            services::aggregate::DailyAggregate,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jma_weather_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    // Open the cache
    let pool = db::connect(&config.database_url, DB_POOL_MAX_CONNECTIONS)
        .await
        .expect("Failed to open forecast cache");

    db::migrate(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let jma_client = JmaClient::new(&config.jma_base_url, &config.jma_user_agent)
        .expect("Failed to build jma.go.jp client");

    // Load the area catalog; a failure leaves the previous run's catalog in place
    match services::catalog::load_catalog(&pool, &jma_client).await {
        Ok((regions, prefectures)) => {
            tracing::info!(
                "Loaded area catalog: {} regions, {} prefectures",
                regions,
                prefectures
            );
        }
        Err(e) => {
            tracing::error!(
                "Failed to load area catalog from {}, using cached catalog: {}",
                config.jma_base_url,
                e
            );
        }
    }

    // CORS: read-only API, GET only; expose X-Forecast-Stale
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(routes::forecasts::STALE_HEADER)]);

    let app = routes::router(pool, jma_client)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
