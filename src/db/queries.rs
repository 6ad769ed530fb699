use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use super::models::{ForecastObservation, Prefecture, Region};

/// Parameters for upserting one normalized forecast slot.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertObservationParams {
    pub prefecture_code: String,
    pub area_code: String,
    pub area_name: String,
    pub forecast_date: NaiveDate,
    pub forecast_time: String,
    pub weather: String,
    pub weather_icon: String,
    pub temperature: String,
    pub precipitation_probability: String,
    pub created_at: DateTime<Utc>,
}

/// Upsert the whole area catalog in one transaction.
///
/// Regions are written before prefectures so the foreign key always resolves.
pub async fn upsert_catalog(
    pool: &SqlitePool,
    regions: &[Region],
    prefectures: &[Prefecture],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for region in regions {
        sqlx::query(
            "INSERT INTO regions (region_code, region_name) VALUES ($1, $2)
             ON CONFLICT (region_code) DO UPDATE SET region_name = excluded.region_name",
        )
        .bind(&region.region_code)
        .bind(&region.region_name)
        .execute(&mut *tx)
        .await?;
    }

    for pref in prefectures {
        sqlx::query(
            "INSERT INTO prefectures (prefecture_code, prefecture_name, region_code)
             VALUES ($1, $2, $3)
             ON CONFLICT (prefecture_code) DO UPDATE SET
                 prefecture_name = excluded.prefecture_name,
                 region_code = excluded.region_code",
        )
        .bind(&pref.prefecture_code)
        .bind(&pref.prefecture_name)
        .bind(&pref.region_code)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Distinct region names, in catalog code order.
pub async fn list_region_names(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT region_name FROM regions
         GROUP BY region_name
         ORDER BY MIN(region_code)",
    )
    .fetch_all(pool)
    .await
}

/// Names of the prefectures under the region called `region_name`.
/// Unknown regions and regions without prefectures both yield an empty list.
pub async fn list_prefecture_names(
    pool: &SqlitePool,
    region_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT p.prefecture_name
         FROM prefectures p
         JOIN regions r ON p.region_code = r.region_code
         WHERE r.region_name = $1
         ORDER BY p.prefecture_code",
    )
    .bind(region_name)
    .fetch_all(pool)
    .await
}

/// Look up a prefecture code by display name.
pub async fn get_prefecture_code(
    pool: &SqlitePool,
    prefecture_name: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT prefecture_code FROM prefectures
         WHERE prefecture_name = $1
         ORDER BY prefecture_code
         LIMIT 1",
    )
    .bind(prefecture_name)
    .fetch_optional(pool)
    .await
}

/// Replace-or-insert forecast slots keyed by
/// (prefecture_code, area_code, forecast_date, forecast_time).
///
/// Runs in one transaction. Rows from earlier fetches that the new batch
/// does not mention are left untouched. Returns the number of rows written.
pub async fn upsert_observations(
    pool: &SqlitePool,
    observations: &[UpsertObservationParams],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut written = 0;

    for obs in observations {
        let result = sqlx::query(
            "INSERT INTO weather_forecasts (
                prefecture_code, area_code, area_name, forecast_date, forecast_time,
                weather, weather_icon, temperature, precipitation_probability, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (prefecture_code, area_code, forecast_date, forecast_time)
            DO UPDATE SET
                area_name = excluded.area_name,
                weather = excluded.weather,
                weather_icon = excluded.weather_icon,
                temperature = excluded.temperature,
                precipitation_probability = excluded.precipitation_probability,
                created_at = excluded.created_at",
        )
        .bind(&obs.prefecture_code)
        .bind(&obs.area_code)
        .bind(&obs.area_name)
        .bind(obs.forecast_date)
        .bind(&obs.forecast_time)
        .bind(&obs.weather)
        .bind(&obs.weather_icon)
        .bind(&obs.temperature)
        .bind(&obs.precipitation_probability)
        .bind(obs.created_at)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

/// All cached slots for a prefecture, ordered by date, time, then area code.
pub async fn list_observations(
    pool: &SqlitePool,
    prefecture_code: &str,
) -> Result<Vec<ForecastObservation>, sqlx::Error> {
    sqlx::query_as::<_, ForecastObservation>(
        "SELECT area_code, area_name, forecast_date, forecast_time,
                weather, weather_icon, temperature, precipitation_probability, created_at
         FROM weather_forecasts
         WHERE prefecture_code = $1
         ORDER BY forecast_date, forecast_time, area_code",
    )
    .bind(prefecture_code)
    .fetch_all(pool)
    .await
}
