use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{Location, WeatherReading},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    /// Point the provider at another host, e.g. a mock server in tests.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> anyhow::Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid WeatherAPI base URL: {base_url}"))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        })
    }

    fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current_weather(&self, location: &Location) -> Result<WeatherReading, FetchError> {
        let res = self
            .http
            .get(self.current_url())
            .query(&[("key", self.api_key.as_str()), ("q", location.query_name)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(location = location.id, %status, "WeatherAPI current response received");

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        reading_from_body(&body)
    }
}

/// Parse a `current.json` body into a reading.
///
/// A body carrying the provider's `error` object is a failure even when the
/// remaining fields are present; nothing is salvaged from it.
pub fn reading_from_body(body: &str) -> Result<WeatherReading, FetchError> {
    let parsed: WaEnvelope = serde_json::from_str(body)?;

    if let Some(error) = parsed.error {
        return Err(FetchError::Upstream { code: error.code, message: error.message });
    }

    let location = parsed.location.ok_or(FetchError::MissingField("location"))?;
    let current = parsed.current.ok_or(FetchError::MissingField("current"))?;

    if current.humidity > 100 {
        return Err(FetchError::OutOfRange {
            field: "current.humidity",
            value: current.humidity.to_string(),
        });
    }

    Ok(WeatherReading {
        location_name: location.name,
        country_name: location.country,
        temperature_c: current.temp_c,
        feels_like_c: current.feelslike_c,
        humidity_pct: current.humidity,
        pressure_mb: current.pressure_mb,
        condition_code: current.condition.code,
        condition_icon_url: normalize_icon_url(&current.condition.icon),
        condition_text: current.condition.text,
        wind_speed_kph: current.wind_kph,
    })
}

/// WeatherAPI returns protocol-relative icon paths (`//cdn...`).
pub fn normalize_icon_url(icon: &str) -> String {
    match icon.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => icon.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct WaEnvelope {
    location: Option<WaLocation>,
    current: Option<WaCurrent>,
    error: Option<WaError>,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    pressure_mb: f64,
    wind_kph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
