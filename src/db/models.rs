use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// A JMA "center" (地方), the top level of the area hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Region {
    pub region_code: String,
    pub region_name: String,
}

/// A JMA "office" (府県), child of a [`Region`]. Forecasts are published per office.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Prefecture {
    pub prefecture_code: String,
    pub prefecture_name: String,
    pub region_code: Option<String>,
}

/// One cached forecast slot for an area, as read back for a single
/// prefecture (the prefecture code is the query key, so it is not selected).
/// Fields the provider did not publish for the slot are empty strings.
#[derive(Debug, Clone, FromRow)]
pub struct ForecastObservation {
    pub area_code: String,
    pub area_name: String,
    pub forecast_date: NaiveDate,
    /// Local time of day as "HH:MM".
    pub forecast_time: String,
    pub weather: String,
    pub weather_icon: String,
    pub temperature: String,
    pub precipitation_probability: String,
    pub created_at: DateTime<Utc>,
}
