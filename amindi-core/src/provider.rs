use crate::{
    Config,
    error::FetchError,
    model::{Location, WeatherReading},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// A source of current conditions for a single location.
///
/// One call is one attempt; retries and timeouts are layered on top by the
/// aggregator.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, location: &Location) -> Result<WeatherReading, FetchError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_for_key(config.api_key(), config)
}

fn provider_for_key(
    api_key: Option<String>,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No WeatherAPI.com API key configured.\n\
                 Hint: run `amindi configure` or set the WEATHER_API_KEY environment variable."
        )
    })?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => WeatherApiProvider::with_base_url(api_key, base_url)?,
        None => WeatherApiProvider::new(api_key),
    };

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn missing_key_error_carries_configure_hint() {
        let err = provider_for_key(None, &Config::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No WeatherAPI.com API key configured"));
        assert!(msg.contains("Hint: run `amindi configure`"));
    }

    #[test]
    fn blank_stored_key_hits_configure_hint() {
        let cfg = Config { api_key: Some("   ".into()), ..Config::default() };
        let key = crate::config::resolve_api_key(None, cfg.api_key.as_deref());

        let err = provider_for_key(key, &cfg).unwrap_err();
        assert!(err.to_string().contains("Hint: run `amindi configure`"));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string()).unwrap();

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_config_rejects_invalid_base_url() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string()).unwrap();
        cfg.base_url = Some("not a url".to_string());

        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid WeatherAPI base URL"));
    }
}
