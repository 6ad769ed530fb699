//! Forecast resolution service.
//!
//! Every read first tries one fetch → normalize → upsert cycle for the
//! prefecture, then answers from the cache. A failed cycle is logged and
//! the read falls back to whatever the cache already holds, flagged stale.

use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::models::ForecastObservation;
use crate::db::queries;
use crate::errors::AppError;
use crate::services::aggregate::{daily_aggregates, DailyAggregate};
use crate::services::jma::JmaClient;
use crate::services::normalize::normalize;

/// Daily rows for a prefecture.
#[derive(Debug, Clone)]
pub struct DailyForecast {
    pub prefecture_code: String,
    pub days: Vec<DailyAggregate>,
    /// The refresh cycle failed; `days` is whatever was cached before.
    pub is_stale: bool,
}

/// A forecast area seen in the cache for a prefecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaSummary {
    pub area_code: String,
    pub area_name: String,
}

/// Per-slot rows for one area of a prefecture.
#[derive(Debug, Clone)]
pub struct HourlyForecast {
    pub prefecture_code: String,
    /// Every area cached for the prefecture, ordered by code.
    pub areas: Vec<AreaSummary>,
    /// The area `entries` belong to; `None` when nothing is cached.
    pub selected_area: Option<AreaSummary>,
    pub entries: Vec<ForecastObservation>,
    pub is_stale: bool,
}

/// Look up a prefecture code by display name.
pub async fn resolve_prefecture_code(
    pool: &SqlitePool,
    prefecture_name: &str,
) -> Result<String, AppError> {
    queries::get_prefecture_code(pool, prefecture_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Prefecture '{}' not found", prefecture_name)))
}

/// Fetch the latest forecast for `prefecture_code` and upsert it into the cache.
///
/// Returns the number of rows written.
pub async fn refresh_forecast(
    pool: &SqlitePool,
    client: &JmaClient,
    prefecture_code: &str,
) -> Result<u64, AppError> {
    let raw = client.fetch_forecast(prefecture_code).await?;
    let observations = normalize(prefecture_code, &raw)?;
    let written = queries::upsert_observations(pool, &observations).await?;
    Ok(written)
}

/// Run a refresh cycle, swallowing its failure. Returns `true` when the
/// cache could not be refreshed.
async fn refresh_or_mark_stale(pool: &SqlitePool, client: &JmaClient, prefecture_code: &str) -> bool {
    match refresh_forecast(pool, client, prefecture_code).await {
        Ok(written) => {
            tracing::debug!("Refreshed {} forecast rows for {}", written, prefecture_code);
            false
        }
        Err(e) => {
            tracing::warn!(
                "Forecast refresh for {} failed, serving cached data: {}",
                prefecture_code,
                e
            );
            true
        }
    }
}

/// Daily forecast (at most 7 days) for the prefecture called `prefecture_name`.
///
/// Only an unknown prefecture name or a failing cache read is an error.
pub async fn get_daily_forecast(
    pool: &SqlitePool,
    client: &JmaClient,
    prefecture_name: &str,
) -> Result<DailyForecast, AppError> {
    let prefecture_code = resolve_prefecture_code(pool, prefecture_name).await?;
    let is_stale = refresh_or_mark_stale(pool, client, &prefecture_code).await;
    let days = daily_aggregates(pool, &prefecture_code).await?;

    Ok(DailyForecast {
        prefecture_code,
        days,
        is_stale,
    })
}

/// Slot-by-slot forecast for one area of the prefecture called `prefecture_name`.
///
/// Without `area_code` the first area (by code) carrying weather text is
/// shown. A requested area with no cached rows is an error.
pub async fn get_hourly_forecast(
    pool: &SqlitePool,
    client: &JmaClient,
    prefecture_name: &str,
    area_code: Option<&str>,
) -> Result<HourlyForecast, AppError> {
    let prefecture_code = resolve_prefecture_code(pool, prefecture_name).await?;
    let is_stale = refresh_or_mark_stale(pool, client, &prefecture_code).await;
    let observations = queries::list_observations(pool, &prefecture_code).await?;

    let areas = list_areas(&observations);
    let selected_area = match area_code {
        Some(code) => Some(
            areas
                .iter()
                .find(|a| a.area_code == code)
                .cloned()
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Area {} has no forecast for {}",
                        code, prefecture_name
                    ))
                })?,
        ),
        None => default_area(&areas, &observations),
    };

    let entries = match &selected_area {
        Some(area) => observations
            .into_iter()
            .filter(|o| o.area_code == area.area_code)
            .collect(),
        None => Vec::new(),
    };

    Ok(HourlyForecast {
        prefecture_code,
        areas,
        selected_area,
        entries,
        is_stale,
    })
}

fn list_areas(observations: &[ForecastObservation]) -> Vec<AreaSummary> {
    let mut areas: BTreeMap<&str, &str> = BTreeMap::new();
    for obs in observations {
        let name = areas.entry(obs.area_code.as_str()).or_insert("");
        if name.is_empty() {
            *name = obs.area_name.as_str();
        }
    }
    areas
        .into_iter()
        .map(|(code, name)| AreaSummary {
            area_code: code.to_string(),
            area_name: name.to_string(),
        })
        .collect()
}

fn default_area(areas: &[AreaSummary], observations: &[ForecastObservation]) -> Option<AreaSummary> {
    areas
        .iter()
        .find(|a| {
            observations
                .iter()
                .any(|o| o.area_code == a.area_code && !o.weather.is_empty())
        })
        .or_else(|| areas.first())
        .cloned()
}
