//! Placeholder data for when no location could be fetched at all.

use crate::{
    model::{AggregationOutcome, WeatherReading},
    registry,
};

pub const FALLBACK_ICON_URL: &str = "https://cdn.weatherapi.com/weather/64x64/day/113.png";

/// Clear-sky reading for the primary location.
pub fn fallback_reading() -> WeatherReading {
    let primary = registry::primary();

    WeatherReading {
        location_name: primary.query_name.to_string(),
        country_name: "Georgia".to_string(),
        temperature_c: 22.0,
        feels_like_c: 22.0,
        humidity_pct: 60,
        pressure_mb: 1013.0,
        condition_code: 1000,
        condition_text: "Sunny".to_string(),
        condition_icon_url: FALLBACK_ICON_URL.to_string(),
        wind_speed_kph: 10.0,
    }
}

pub fn fallback_outcome() -> AggregationOutcome {
    AggregationOutcome::success(registry::primary(), fallback_reading())
}
