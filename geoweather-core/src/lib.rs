//! Core library for the `geoweather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Location providers and the OpenWeather client
//! - The last-response cache
//! - Presentation of a weather snapshot in Celsius or Fahrenheit
//! - The pipeline tying location, fetch, cache and rendering together
//!
//! It is used by `geoweather-cli`, but can also be reused by other front-ends.

pub mod cache;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod present;
pub mod provider;
pub mod screen;

pub use cache::{FileStore, KeyValueCache, KeyValueStore, MemoryStore, ResponseCache};
pub use config::Config;
pub use error::{FetchError, FetchErrorKind, FetchFailed, LocationError, PipelineFailure};
pub use location::{FixedLocation, GeoclueLocation, LocationAvailability, LocationProvider};
pub use model::{Coordinates, WeatherSnapshot};
pub use pipeline::{FetchContext, PipelineState, RefreshOutcome, WeatherPipeline};
pub use present::{DisplayModel, IconCategory, TemperatureUnit, UnitPolicy, render};
pub use provider::{WeatherProvider, provider_from_config};
