//! Daily summary of cached forecast slots.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::db::models::ForecastObservation;
use crate::db::queries;
use crate::errors::AppError;

/// Maximum number of days in a daily forecast.
pub const MAX_DAYS: usize = 7;

/// Hour prefix of the slot whose temperature is reported as the day's minimum.
const MIN_TEMP_HOUR: &str = "09:";
/// Hour prefix of the slot whose temperature is reported as the day's maximum.
const MAX_TEMP_HOUR: &str = "15:";

/// One day of forecast, reduced from that day's cached slots.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyAggregate {
    /// Local calendar date (YYYY-MM-DD)
    pub forecast_date: NaiveDate,
    /// Temperature of the 09:xx slot, as published (°C)
    pub temp_min: Option<String>,
    /// Temperature of the 15:xx slot, as published (°C)
    pub temp_max: Option<String>,
    /// Representative weather text for the day
    pub weather: String,
    /// Pictogram for `weather`
    pub weather_icon: String,
    /// Forecast area the representative values come from
    pub area_name: String,
    /// Representative precipitation probability (%)
    pub precipitation_probability: Option<String>,
}

impl DailyAggregate {
    fn empty(forecast_date: NaiveDate) -> Self {
        Self {
            forecast_date,
            temp_min: None,
            temp_max: None,
            weather: String::new(),
            weather_icon: String::new(),
            area_name: String::new(),
            precipitation_probability: None,
        }
    }
}

/// Reduce slots into at most [`MAX_DAYS`] rows, earliest date first.
///
/// `temp_min`/`temp_max` take the first non-empty temperature of the 09:xx
/// and 15:xx slots. Weather, icon, area name and precipitation probability
/// take the last non-empty value in input order; weather and icon always
/// come from the same slot. Dates without slots never appear.
pub fn aggregate(observations: &[ForecastObservation]) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();

    for obs in observations {
        let day = days
            .entry(obs.forecast_date)
            .or_insert_with(|| DailyAggregate::empty(obs.forecast_date));

        if !obs.temperature.is_empty() {
            if day.temp_min.is_none() && obs.forecast_time.starts_with(MIN_TEMP_HOUR) {
                day.temp_min = Some(obs.temperature.clone());
            }
            if day.temp_max.is_none() && obs.forecast_time.starts_with(MAX_TEMP_HOUR) {
                day.temp_max = Some(obs.temperature.clone());
            }
        }
        if !obs.weather.is_empty() {
            day.weather = obs.weather.clone();
            day.weather_icon = obs.weather_icon.clone();
        }
        if !obs.area_name.is_empty() {
            day.area_name = obs.area_name.clone();
        }
        if !obs.precipitation_probability.is_empty() {
            day.precipitation_probability = Some(obs.precipitation_probability.clone());
        }
    }

    days.into_values().take(MAX_DAYS).collect()
}

/// Read a prefecture's cached slots and reduce them to daily rows.
pub async fn daily_aggregates(
    pool: &SqlitePool,
    prefecture_code: &str,
) -> Result<Vec<DailyAggregate>, AppError> {
    let observations = queries::list_observations(pool, prefecture_code).await?;
    Ok(aggregate(&observations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn slot(date: &str, time: &str, weather: &str, temperature: &str, pop: &str) -> ForecastObservation {
        ForecastObservation {
            area_code: "130010".into(),
            area_name: "東京地方".into(),
            forecast_date: date.parse().unwrap(),
            forecast_time: time.into(),
            weather: weather.into(),
            weather_icon: crate::services::icons::classify(weather).into(),
            temperature: temperature.into(),
            precipitation_probability: pop.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_min_max_from_fixed_slots() {
        let rows = aggregate(&[
            slot("2024-01-01", "00:00", "", "1", ""),
            slot("2024-01-01", "09:00", "晴れ", "5", "10"),
            slot("2024-01-01", "15:00", "曇り", "12", "20"),
        ]);

        assert_eq!(rows.len(), 1);
        let day = &rows[0];
        assert_eq!(day.forecast_date.to_string(), "2024-01-01");
        assert_eq!(day.temp_min.as_deref(), Some("5"));
        assert_eq!(day.temp_max.as_deref(), Some("12"));
        assert_eq!(day.area_name, "東京地方");
        assert!(["10", "20"].contains(&day.precipitation_probability.as_deref().unwrap()));
    }

    #[test]
    fn test_missing_slots_give_none() {
        let rows = aggregate(&[slot("2024-01-01", "11:00", "雨", "", "")]);

        assert_eq!(rows[0].temp_min, None);
        assert_eq!(rows[0].temp_max, None);
        assert_eq!(rows[0].precipitation_probability, None);
        assert_eq!(rows[0].weather, "雨");
        assert_eq!(rows[0].weather_icon, "🌧️");
    }

    #[test]
    fn test_weather_and_icon_come_from_same_slot() {
        let rows = aggregate(&[
            slot("2024-01-01", "06:00", "晴れ", "", ""),
            slot("2024-01-01", "12:00", "", "", "30"),
            slot("2024-01-01", "18:00", "雪", "", ""),
        ]);

        assert_eq!(rows[0].weather, "雪");
        assert_eq!(rows[0].weather_icon, "❄️");
        assert_eq!(rows[0].precipitation_probability.as_deref(), Some("30"));
    }

    #[test]
    fn test_capped_at_seven_days_in_date_order() {
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        let mut slots: Vec<ForecastObservation> = (0..10)
            .map(|d| {
                let date = (start + Duration::days(d)).to_string();
                slot(&date, "09:00", "晴れ", "5", "0")
            })
            .collect();
        slots.reverse();

        let rows = aggregate(&slots);
        assert_eq!(rows.len(), MAX_DAYS);
        assert_eq!(rows[0].forecast_date, start);
        assert_eq!(rows[6].forecast_date, start + Duration::days(6));
    }

    #[test]
    fn test_gaps_are_not_filled() {
        let rows = aggregate(&[
            slot("2024-01-01", "09:00", "晴れ", "5", ""),
            slot("2024-01-04", "09:00", "晴れ", "6", ""),
        ]);

        let dates: Vec<String> = rows.iter().map(|r| r.forecast_date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-04"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
