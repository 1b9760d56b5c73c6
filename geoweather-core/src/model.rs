use serde::{Deserialize, Serialize};

/// A single resolved location reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One parsed current-weather response.
///
/// The field layout mirrors the OpenWeather JSON body, and the cached payload
/// is this snapshot as parsed. Unknown fields are ignored (and so never reach
/// the cache), missing ones fail the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub weather: Vec<Condition>,
    pub main: Readings,
    pub wind: Wind,
    pub name: String,
    pub sys: Sun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    /// Provider icon code, e.g. "01d".
    pub icon: String,
}

/// Temperatures are in whatever unit system was requested (metric => Celsius).
/// `temp_min <= temp <= temp_max` is not guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sun {
    pub country: String,
    /// UTC epoch seconds.
    pub sunrise: i64,
    /// UTC epoch seconds.
    pub sunset: i64,
}
