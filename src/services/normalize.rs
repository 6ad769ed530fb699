//! Flattens a JMA short-term forecast into per-slot cache rows.
//!
//! One row per (area, local date, local "HH:MM"). Time-series blocks that
//! describe the same slot are merged field by field: a later block only
//! overwrites a field when it carries a non-empty value for it.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

use crate::db::queries::UpsertObservationParams;
use crate::errors::AppError;
use crate::services::icons;
use crate::services::jma::{decode_short_term, ForecastReport};

/// Decode a raw forecast document and normalize its short-term block.
pub fn normalize(
    prefecture_code: &str,
    raw: &serde_json::Value,
) -> Result<Vec<UpsertObservationParams>, AppError> {
    let report = decode_short_term(raw)?;
    tracing::debug!(
        "Normalizing forecast for {} (office {:?}, reported {:?})",
        prefecture_code,
        report.publishing_office,
        report.report_datetime
    );
    Ok(normalize_report(prefecture_code, &report, Utc::now()))
}

/// Normalize an already decoded short-term report, stamping every row with `created_at`.
///
/// Rows come out in first-seen order. Missing arrays and indices past the
/// end of an array yield empty strings.
pub fn normalize_report(
    prefecture_code: &str,
    report: &ForecastReport,
    created_at: DateTime<Utc>,
) -> Vec<UpsertObservationParams> {
    let mut slots: Vec<UpsertObservationParams> = Vec::new();
    let mut index: HashMap<(String, NaiveDate, String), usize> = HashMap::new();

    for series in &report.time_series {
        for area in &series.areas {
            for (i, instant) in series.time_defines.iter().enumerate() {
                let forecast_date = instant.date_naive();
                let forecast_time = instant.format("%H:%M").to_string();

                let weather = value_at(area.weathers.as_deref(), i);
                let temperature = value_at(area.temps.as_deref(), i);
                let pop = value_at(area.pops.as_deref(), i);

                let key = (area.area.code.clone(), forecast_date, forecast_time.clone());
                match index.get(&key) {
                    Some(&pos) => {
                        let slot = &mut slots[pos];
                        merge_field(&mut slot.weather, weather);
                        merge_field(&mut slot.temperature, temperature);
                        merge_field(&mut slot.precipitation_probability, pop);
                        if !area.area.name.is_empty() {
                            slot.area_name = area.area.name.clone();
                        }
                    }
                    None => {
                        index.insert(key, slots.len());
                        slots.push(UpsertObservationParams {
                            prefecture_code: prefecture_code.to_string(),
                            area_code: area.area.code.clone(),
                            area_name: area.area.name.clone(),
                            forecast_date,
                            forecast_time,
                            weather: weather.unwrap_or_default().to_string(),
                            weather_icon: String::new(),
                            temperature: temperature.unwrap_or_default().to_string(),
                            precipitation_probability: pop.unwrap_or_default().to_string(),
                            created_at,
                        });
                    }
                }
            }
        }
    }

    // Icons are derived from the merged text.
    for slot in &mut slots {
        slot.weather_icon = icons::classify(&slot.weather).to_string();
    }

    slots
}

fn value_at(values: Option<&[String]>, i: usize) -> Option<&str> {
    values.and_then(|v| v.get(i)).map(String::as_str)
}

fn merge_field(field: &mut String, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *field = v.to_string();
    }
}
