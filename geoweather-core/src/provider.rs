use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

/// Unit system requested from the weather service. Presentation assumes
/// Celsius input, so this is the only value the pipeline sends.
pub const METRIC_UNITS: &str = "metric";

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One network round trip. No retries.
    async fn fetch_weather(
        &self,
        coordinates: &Coordinates,
        units: &str,
    ) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let timeout = config.request_timeout_secs.map(Duration::from_secs);

    let provider = OpenWeatherProvider::with_base_url(api_key, config.base_url(), timeout)?;
    Ok(Box::new(provider))
}
