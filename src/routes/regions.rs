//! Catalog HTTP endpoints.
//!
//! - GET /api/v1/regions
//! - GET /api/v1/regions/:region_name/prefectures

use axum::extract::{Path, State};
use axum::Json;
use sqlx::SqlitePool;

use crate::db::queries;
use crate::errors::{AppError, ErrorResponse};

/// List region names, in catalog order.
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    tag = "Regions",
    responses(
        (status = 200, description = "Region names (e.g. \"関東甲信地方\")", body = Vec<String>),
        (status = 500, description = "Cache unreadable", body = ErrorResponse),
    )
)]
pub async fn list_regions(State(pool): State<SqlitePool>) -> Result<Json<Vec<String>>, AppError> {
    let regions = queries::list_region_names(&pool).await?;
    Ok(Json(regions))
}

/// List the prefecture names of a region.
///
/// An unknown region, or one without prefectures, returns an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/regions/{region_name}/prefectures",
    tag = "Regions",
    params(
        ("region_name" = String, Path, description = "Region name as returned by /api/v1/regions"),
    ),
    responses(
        (status = 200, description = "Prefecture names in the region", body = Vec<String>),
        (status = 500, description = "Cache unreadable", body = ErrorResponse),
    )
)]
pub async fn list_prefectures(
    State(pool): State<SqlitePool>,
    Path(region_name): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let prefectures = queries::list_prefecture_names(&pool, &region_name).await?;
    Ok(Json(prefectures))
}
