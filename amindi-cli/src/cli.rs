use amindi_core::{AggregationOutcome, Config, WeatherAggregator, provider_from_config, registry};
use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, validator::Validation};
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "amindi", version, about = "Current weather for Georgian cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure,

    /// List the registered locations.
    Locations,

    /// Show current weather for the curated cities.
    Current {
        /// Location id, e.g. "batumi". Repeatable; defaults to the configured list.
        #[arg(long = "city")]
        cities: Vec<String>,

        /// Print the result as a JSON array.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Locations => {
                for location in registry::all() {
                    println!(
                        "{:<12} {:<12} {}",
                        location.id, location.display_name, location.query_name
                    );
                }
                Ok(())
            }
            Command::Current { cities, json } => current(cities, json).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Ok(Validation::Invalid("The API key must not be empty".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key)?;
    let path = config.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn current(cities: Vec<String>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let aggregator = WeatherAggregator::new(provider, config.retry);

    let ids = if cities.is_empty() { config.curated_location_ids() } else { cities };
    let locations = registry::select(&ids);
    info!(?ids, resolved = locations.len(), "resolved locations");

    let outcomes = aggregator.aggregate_current_weather(&locations).await?;

    if json {
        let body =
            serde_json::to_string_pretty(&outcomes).context("Failed to serialize weather JSON")?;
        println!("{body}");
    } else {
        print_table(&outcomes);
    }

    Ok(())
}

fn print_table(outcomes: &[AggregationOutcome]) {
    println!("Updated {}", Local::now().format("%Y-%m-%d %H:%M"));

    for outcome in outcomes {
        let Some(reading) = outcome.reading() else {
            continue;
        };

        println!(
            "{:<12} {:>6.1}°C (feels {:>5.1}°C)  {:>3}%  {:>6.1} mb  {:>5.1} km/h  {}",
            outcome.location.display_name,
            reading.temperature_c,
            reading.feels_like_c,
            reading.humidity_pct,
            reading.pressure_mb,
            reading.wind_speed_kph,
            reading.condition_text,
        );
    }
}
