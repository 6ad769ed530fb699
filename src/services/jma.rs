//! jma.go.jp "bosai" JSON client.
//!
//! Fetches the area catalog and per-office forecasts from the Japan
//! Meteorological Agency. Fetches return the document untouched; the
//! `decode_*` functions turn it into typed structs and are the only place
//! where an unexpected shape is reported (as [`AppError::Schema`]).

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::errors::AppError;

const AREA_CATALOG_PATH: &str = "/common/const/area.json";
const FORECAST_PATH: &str = "/forecast/data/forecast";

/// Client for the JMA forecast API.
#[derive(Debug, Clone)]
pub struct JmaClient {
    client: reqwest::Client,
    base_url: String,
}

// --- area.json ---

/// `area.json`: the region ("centers") / prefecture ("offices") hierarchy.
#[derive(Debug, Deserialize)]
pub struct AreaCatalog {
    pub centers: BTreeMap<String, CenterEntry>,
    pub offices: BTreeMap<String, OfficeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CenterEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OfficeEntry {
    pub name: String,
    /// Code of the owning center.
    pub parent: String,
}

// --- forecast/{code}.json ---

/// One publisher block of a forecast document. Index 0 is the short-term
/// (3-day) forecast, index 1 the weekly one.
#[derive(Debug, Deserialize)]
pub struct ForecastReport {
    #[serde(rename = "publishingOffice")]
    pub publishing_office: Option<String>,
    #[serde(rename = "reportDatetime")]
    pub report_datetime: Option<DateTime<FixedOffset>>,
    #[serde(rename = "timeSeries")]
    pub time_series: Vec<TimeSeries>,
}

/// Timestamps plus per-area value arrays, index-aligned with `time_defines`.
#[derive(Debug, Deserialize)]
pub struct TimeSeries {
    #[serde(rename = "timeDefines")]
    pub time_defines: Vec<DateTime<FixedOffset>>,
    pub areas: Vec<AreaSeries>,
}

/// Values for one area. Each array is absent on blocks that do not carry
/// that quantity, and may be shorter than `time_defines`.
#[derive(Debug, Deserialize)]
pub struct AreaSeries {
    pub area: AreaRef,
    pub weathers: Option<Vec<String>>,
    pub temps: Option<Vec<String>>,
    pub pops: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AreaRef {
    pub code: String,
    pub name: String,
}

impl JmaClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch `area.json`.
    pub async fn fetch_area_catalog(&self) -> Result<serde_json::Value, AppError> {
        let url = format!("{}{}", self.base_url, AREA_CATALOG_PATH);
        self.get_json(&url).await
    }

    /// Fetch the forecast document for an office code. Single attempt, no retry.
    pub async fn fetch_forecast(&self, area_code: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}{}/{}.json", self.base_url, FORECAST_PATH, area_code);
        self.get_json(&url).await
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, AppError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("jma.go.jp request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "jma.go.jp returned HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::Schema(format!("jma.go.jp JSON parse error: {}", e)))
    }
}

/// Decode a raw `area.json` document.
pub fn decode_area_catalog(raw: &serde_json::Value) -> Result<AreaCatalog, AppError> {
    AreaCatalog::deserialize(raw)
        .map_err(|e| AppError::Schema(format!("area.json structure error: {}", e)))
}

/// Decode the short-term publisher block (`doc[0]`) of a forecast document.
///
/// Later publisher blocks are not inspected, so a weekly block in an
/// unexpected shape does not prevent the short-term forecast from loading.
pub fn decode_short_term(raw: &serde_json::Value) -> Result<ForecastReport, AppError> {
    let reports = raw
        .as_array()
        .ok_or_else(|| AppError::Schema("forecast document is not an array".to_string()))?;
    let first = reports
        .first()
        .ok_or_else(|| AppError::Schema("forecast document has no publisher blocks".to_string()))?;

    ForecastReport::deserialize(first)
        .map_err(|e| AppError::Schema(format!("forecast structure error: {}", e)))
}
