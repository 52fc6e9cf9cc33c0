use serde::Serialize;

/// A place the upstream provider can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Short stable key, unique within the registry.
    pub id: &'static str,
    /// Name shown to users (Georgian).
    pub display_name: &'static str,
    /// Value passed as the provider's `q` parameter.
    pub query_name: &'static str,
}

/// Normalized snapshot of current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub location_name: String,
    pub country_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_mb: f64,
    pub condition_code: u32,
    pub condition_text: String,
    pub condition_icon_url: String,
    pub wind_speed_kph: f64,
}

/// What happened to one location during an aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success(WeatherReading),
    Failure { attempts: u32, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationOutcome {
    pub location: Location,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl AggregationOutcome {
    pub fn success(location: Location, reading: WeatherReading) -> Self {
        Self { location, outcome: Outcome::Success(reading) }
    }

    pub fn failure(location: Location, attempts: u32, reason: impl Into<String>) -> Self {
        Self { location, outcome: Outcome::Failure { attempts, reason: reason.into() } }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// The reading, if this location was fetched successfully.
    pub fn reading(&self) -> Option<&WeatherReading> {
        match &self.outcome {
            Outcome::Success(reading) => Some(reading),
            Outcome::Failure { .. } => None,
        }
    }
}
