use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when healthy, "degraded" when the cache is unreadable)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether the cache database answers queries
    pub database: bool,
    /// Prefectures in the area catalog; 0 until a catalog load has succeeded
    pub catalog_prefectures: i64,
}

/// Health check endpoint.
///
/// Counts the cached catalog; reports "degraded" (still 200) when the cache
/// cannot be read or no catalog has been loaded yet.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(pool): State<SqlitePool>) -> Json<HealthResponse> {
    let catalog = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM prefectures")
        .fetch_one(&pool)
        .await;
    let db_ok = catalog.is_ok();
    let catalog_prefectures = catalog.unwrap_or(0);

    Json(HealthResponse {
        status: if db_ok && catalog_prefectures > 0 {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_ok,
        catalog_prefectures,
    })
}
