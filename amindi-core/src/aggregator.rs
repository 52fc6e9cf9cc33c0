//! Sequential multi-city aggregation of current conditions.
//!
//! Locations are fetched one at a time, in order, so the shared upstream
//! rate limit is never hit by parallel requests. Each location gets its own
//! retry budget; a location that exhausts it is dropped from the output. If
//! every location fails, a single [`fallback_outcome`] is returned so callers
//! always have something to render.

use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    error::AggregateError,
    fallback::fallback_outcome,
    model::{AggregationOutcome, Location},
    provider::WeatherProvider,
    retry::{RetryPolicy, retry_with_backoff},
};

#[derive(Debug)]
pub struct WeatherAggregator {
    provider: Box<dyn WeatherProvider>,
    policy: RetryPolicy,
}

impl WeatherAggregator {
    pub fn new(provider: Box<dyn WeatherProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run one location through the retry policy.
    pub async fn fetch_location(&self, location: &Location) -> AggregationOutcome {
        let provider = self.provider.as_ref();

        match retry_with_backoff(&self.policy, move |_| provider.current_weather(location)).await {
            Ok(reading) => {
                info!(temperature_c = reading.temperature_c, "fetched current weather");
                AggregationOutcome::success(*location, reading)
            }
            Err(exhausted) => {
                warn!(attempts = exhausted.attempts, "dropping location: {exhausted}");
                AggregationOutcome::failure(*location, exhausted.attempts, exhausted.last.to_string())
            }
        }
    }

    /// One outcome per input location, in input order, failures included.
    ///
    /// Every location, including the last, is followed by the policy's
    /// inter-request delay.
    pub async fn collect_outcomes(&self, locations: &[Location]) -> Vec<AggregationOutcome> {
        let mut outcomes = Vec::with_capacity(locations.len());

        for location in locations {
            let outcome = self
                .fetch_location(location)
                .instrument(info_span!("location", id = location.id))
                .await;
            outcomes.push(outcome);

            tokio::time::sleep(self.policy.delay_between_requests()).await;
        }

        outcomes
    }

    /// Fetch current weather for `locations`.
    ///
    /// The result holds only successes, in input order, and is never empty:
    /// when every location fails it is the single fallback record. The only
    /// error is an empty input list.
    pub async fn aggregate_current_weather(
        &self,
        locations: &[Location],
    ) -> Result<Vec<AggregationOutcome>, AggregateError> {
        if locations.is_empty() {
            return Err(AggregateError::NoLocations);
        }

        info!(locations = locations.len(), "aggregating current weather");

        let outcomes = self.collect_outcomes(locations).await;
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let succeeded = successes(outcomes);

        if succeeded.is_empty() {
            error!(failed, "every location failed, substituting fallback reading");
            return Ok(vec![fallback_outcome()]);
        }

        info!(succeeded = succeeded.len(), failed, "aggregation finished");
        Ok(succeeded)
    }
}

/// Keep successful outcomes, preserving order.
pub fn successes(outcomes: Vec<AggregationOutcome>) -> Vec<AggregationOutcome> {
    outcomes.into_iter().filter(AggregationOutcome::is_success).collect()
}
