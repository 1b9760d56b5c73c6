use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Text};
use std::time::Duration;

use geoweather_core::{
    Config, Coordinates, FileStore, FixedLocation, GeoclueLocation, KeyValueCache,
    LocationProvider, PipelineFailure, RefreshOutcome, ResponseCache, TemperatureUnit,
    WeatherPipeline, present::current_locale, provider_from_config, render,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Current weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and an optional fixed location.
    Configure,

    /// Show the cached weather, then refresh it for the current location.
    Show {
        /// Latitude to use instead of locating this machine.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of locating this machine.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Temperature unit for this render; defaults to the locale's.
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,

        /// Only show the cached response.
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                unit,
                offline,
            } => {
                let fix = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                show(fix, unit.map(Into::into), offline).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.api_key = Some(api_key.trim().to_string());

    let use_fixed = Confirm::new("Use a fixed location instead of geoclue?")
        .with_default(config.location.is_some())
        .prompt()
        .context("Failed to read answer")?;

    config.location = if use_fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read longitude")?;
        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(
    fix: Option<Coordinates>,
    unit: Option<TemperatureUnit>,
    offline: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let policy = config.unit_policy();
    for entry in policy.suspicious_entries() {
        tracing::warn!(entry, "Fahrenheit locale entry can never match a locale identifier");
    }

    let unit = unit.unwrap_or_else(|| {
        let locale = current_locale().unwrap_or_default();
        policy.unit_for_locale(&locale)
    });

    let location: Box<dyn LocationProvider> = match fix.or(config.location) {
        Some(coordinates) => Box::new(FixedLocation(coordinates)),
        None => Box::new(GeoclueLocation::new(config.geoclue_command())),
    };

    let store = FileStore::new(Config::store_file_path()?);
    tracing::debug!(path = %store.path().display(), "using response store");
    let cache = KeyValueCache::new(store);

    if offline {
        match cached_view(&cache, unit) {
            Some(view) => print!("{view}"),
            None => println!("No cached weather yet. Run `geoweather show` while online."),
        }
        return Ok(());
    }

    let weather = match provider_from_config(&config) {
        Ok(weather) => weather,
        Err(err) => {
            if let Some(view) = cached_view(&cache, unit) {
                print!("{view}");
            }
            return Err(err);
        }
    };

    let pipeline = WeatherPipeline::new(location, weather, Box::new(cache), unit)
        .with_location_timeout(config.location_timeout_secs.map(Duration::from_secs));

    let cached = pipeline.start();
    if let Some(display) = &cached {
        output::print_display(display, Some("cached"));
    }

    match pipeline.refresh().await {
        RefreshOutcome::Rendered(display) => {
            if cached.is_some() {
                println!();
            }
            output::print_display(&display, None);
        }
        RefreshOutcome::Failed(PipelineFailure::Location(err)) => {
            eprintln!("{}", err.remediation());
            if err.needs_settings() {
                eprintln!(
                    "Hint: enable location services, or run `geoweather configure` \
                     to set a fixed location (or pass --lat/--lon)."
                );
            }
        }
        RefreshOutcome::Failed(failure @ PipelineFailure::Fetch(_)) => {
            eprintln!("warning: {failure}");
        }
        RefreshOutcome::Superseded => {}
    }

    Ok(())
}

/// Cached response rendered on its own, for when no refresh follows.
fn cached_view(cache: &dyn ResponseCache, unit: TemperatureUnit) -> Option<String> {
    let snapshot = cache.load()?;
    Some(output::format_display(&render(&snapshot, unit), Some("cached")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoweather_core::{
        MemoryStore, WeatherSnapshot,
        model::{Condition, Readings, Sun, Wind},
    };

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            weather: vec![Condition {
                main: "Clouds".into(),
                description: "broken clouds".into(),
                icon: "04d".into(),
            }],
            main: Readings {
                temp: 14.8,
                temp_min: 12.1,
                temp_max: 16.0,
                humidity: 72,
            },
            wind: Wind { speed: 5.1 },
            name: "Leeds".into(),
            sys: Sun {
                country: "GB".into(),
                sunrise: 1_700_000_000,
                sunset: 1_700_030_000,
            },
        }
    }

    #[test]
    fn cached_view_renders_without_a_weather_client() {
        let cache = KeyValueCache::new(MemoryStore::new());
        cache.save(&snapshot());

        let view = cached_view(&cache, TemperatureUnit::Fahrenheit).expect("cache should render");

        assert!(view.starts_with("Leeds, GB (cached)\n"));
        assert!(view.contains("57°F  53°F min  60°F max"));
    }

    #[test]
    fn empty_cache_has_no_view() {
        let cache = KeyValueCache::new(MemoryStore::new());
        assert!(cached_view(&cache, TemperatureUnit::Celsius).is_none());
    }
}
