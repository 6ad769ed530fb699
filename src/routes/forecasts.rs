//! Forecast HTTP endpoints.
//!
//! - GET /api/v1/forecasts/:prefecture_name
//! - GET /api/v1/forecasts/:prefecture_name/hourly?area_code=CODE

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::db::models;
use crate::errors::{AppError, ErrorResponse};
use crate::services::aggregate::DailyAggregate;
use crate::services::forecast::{get_daily_forecast, get_hourly_forecast, AreaSummary};
use crate::services::jma::JmaClient;

/// Response header set when cached data is served because jma.go.jp failed.
pub const STALE_HEADER: &str = "x-forecast-stale";

/// Shared application state for forecast endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: SqlitePool,
    pub(crate) jma_client: JmaClient,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HourlyQuery {
    /// Forecast area code (e.g. "130010"). Defaults to the first area with weather text.
    pub area_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Daily forecast for a prefecture (up to 7 days).
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyForecastResponse {
    pub prefecture_name: String,
    /// JMA office code (e.g. "130000")
    pub prefecture_code: String,
    /// Whether jma.go.jp was unreachable and cached data is served
    pub stale: bool,
    /// One entry per date, earliest first
    pub days: Vec<DailyAggregate>,
}

/// A forecast area within a prefecture.
#[derive(Debug, Serialize, ToSchema)]
pub struct AreaResponse {
    pub area_code: String,
    pub area_name: String,
}

impl From<AreaSummary> for AreaResponse {
    fn from(a: AreaSummary) -> Self {
        Self {
            area_code: a.area_code,
            area_name: a.area_name,
        }
    }
}

/// One forecast slot of an area.
#[derive(Debug, Serialize, ToSchema)]
pub struct HourlyEntry {
    /// Local date (YYYY-MM-DD)
    pub forecast_date: String,
    /// Local time of day (HH:MM)
    pub forecast_time: String,
    pub weather: String,
    pub weather_icon: String,
    /// Temperature in °C, null when not published for this slot
    pub temperature: Option<String>,
    /// Precipitation probability in %, null when not published for this slot
    pub precipitation_probability: Option<String>,
    /// When this slot was last written to the cache (ISO 8601)
    pub fetched_at: String,
}

impl From<models::ForecastObservation> for HourlyEntry {
    fn from(o: models::ForecastObservation) -> Self {
        Self {
            forecast_date: o.forecast_date.to_string(),
            forecast_time: o.forecast_time,
            weather: o.weather,
            weather_icon: o.weather_icon,
            temperature: non_empty(o.temperature),
            precipitation_probability: non_empty(o.precipitation_probability),
            fetched_at: o.created_at.to_rfc3339(),
        }
    }
}

/// Slot-by-slot forecast for one area of a prefecture.
#[derive(Debug, Serialize, ToSchema)]
pub struct HourlyForecastResponse {
    pub prefecture_name: String,
    pub prefecture_code: String,
    /// Whether jma.go.jp was unreachable and cached data is served
    pub stale: bool,
    /// Every area cached for the prefecture
    pub areas: Vec<AreaResponse>,
    /// The area `entries` belong to; null when nothing is cached
    pub area: Option<AreaResponse>,
    /// Slots ordered by date and time
    pub entries: Vec<HourlyEntry>,
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn stale_headers(is_stale: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if is_stale {
        headers.insert(
            HeaderName::from_static(STALE_HEADER),
            HeaderValue::from_static("true"),
        );
    }
    headers
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Get the daily forecast for a prefecture.
///
/// Refreshes the cache from jma.go.jp first. If that fails, the previously
/// cached days are returned with `X-Forecast-Stale: true` (an empty list
/// when nothing was cached).
#[utoipa::path(
    get,
    path = "/api/v1/forecasts/{prefecture_name}",
    tag = "Forecasts",
    params(
        ("prefecture_name" = String, Path, description = "Prefecture name (e.g. \"東京都\")"),
    ),
    responses(
        (status = 200, description = "Daily forecast", body = DailyForecastResponse,
         headers(
             ("X-Forecast-Stale" = String, description = "Set to 'true' when serving cached data because jma.go.jp is unreachable")
         )),
        (status = 404, description = "Prefecture not found", body = ErrorResponse),
    )
)]
pub async fn get_prefecture_forecast(
    State(state): State<AppState>,
    Path(prefecture_name): Path<String>,
) -> Result<(HeaderMap, Json<DailyForecastResponse>), AppError> {
    let forecast = get_daily_forecast(&state.pool, &state.jma_client, &prefecture_name).await?;

    Ok((
        stale_headers(forecast.is_stale),
        Json(DailyForecastResponse {
            prefecture_name,
            prefecture_code: forecast.prefecture_code,
            stale: forecast.is_stale,
            days: forecast.days,
        }),
    ))
}

/// Get the slot-by-slot forecast for one area of a prefecture.
#[utoipa::path(
    get,
    path = "/api/v1/forecasts/{prefecture_name}/hourly",
    tag = "Forecasts",
    params(
        ("prefecture_name" = String, Path, description = "Prefecture name (e.g. \"東京都\")"),
        HourlyQuery,
    ),
    responses(
        (status = 200, description = "Per-slot forecast for one area", body = HourlyForecastResponse,
         headers(
             ("X-Forecast-Stale" = String, description = "Set to 'true' when serving cached data because jma.go.jp is unreachable")
         )),
        (status = 404, description = "Prefecture or area not found", body = ErrorResponse),
    )
)]
pub async fn get_prefecture_hourly_forecast(
    State(state): State<AppState>,
    Path(prefecture_name): Path<String>,
    Query(params): Query<HourlyQuery>,
) -> Result<(HeaderMap, Json<HourlyForecastResponse>), AppError> {
    let hourly = get_hourly_forecast(
        &state.pool,
        &state.jma_client,
        &prefecture_name,
        params.area_code.as_deref(),
    )
    .await?;

    Ok((
        stale_headers(hourly.is_stale),
        Json(HourlyForecastResponse {
            prefecture_name,
            prefecture_code: hourly.prefecture_code,
            stale: hourly.is_stale,
            areas: hourly.areas.into_iter().map(AreaResponse::from).collect(),
            area: hourly.selected_area.map(AreaResponse::from),
            entries: hourly.entries.into_iter().map(HourlyEntry::from).collect(),
        }),
    ))
}
