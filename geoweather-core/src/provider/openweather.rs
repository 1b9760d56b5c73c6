use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{Coordinates, WeatherSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// Client against a custom endpoint, with an optional request timeout
    /// (`None` keeps the reqwest default).
    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(
        &self,
        coordinates: &Coordinates,
        units: &str,
    ) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/weather", self.base_url);

        tracing::info!(%coordinates, units, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("units", units.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let body = truncate_body(&body);
            return Err(match status {
                StatusCode::BAD_REQUEST => FetchError::BadRequest(body),
                StatusCode::NOT_FOUND => FetchError::NotFound(body),
                _ => FetchError::Http { status, body },
            });
        }

        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;
        tracing::info!(location = %snapshot.name, "received current weather");

        Ok(snapshot)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
