//! Core library for the `amindi` weather panel.
//!
//! This crate defines:
//! - The static registry of Georgian locations
//! - The WeatherAPI.com provider and its response normalization
//! - A data-driven retry policy with per-attempt timeouts
//! - The sequential multi-city aggregator with its fallback reading
//! - Configuration handling
//!
//! It is used by `amindi-cli`, but can also be reused by other binaries or services.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod fallback;
pub mod model;
pub mod provider;
pub mod registry;
pub mod retry;

pub use aggregator::WeatherAggregator;
pub use config::Config;
pub use error::{AggregateError, FetchError};
pub use model::{AggregationOutcome, Location, Outcome, WeatherReading};
pub use provider::{WeatherProvider, provider_from_config};
pub use retry::RetryPolicy;
