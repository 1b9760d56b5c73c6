//! Location -> fetch -> cache -> render orchestration.
//!
//! Every [`WeatherPipeline::refresh`] takes a fresh generation number. A
//! completion whose generation is no longer the latest is dropped without
//! touching the cache, the screen or the state, so overlapping refreshes
//! resolve to the one started last.

use std::{
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::{
    cache::ResponseCache,
    error::{FetchFailed, LocationError, PipelineFailure},
    location::LocationProvider,
    model::{Coordinates, WeatherSnapshot},
    present::{DisplayModel, TemperatureUnit},
    provider::{METRIC_UNITS, WeatherProvider},
    screen::Screen,
};

/// Inputs of one fetch, fixed once the location is known.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchContext {
    pub coordinates: Coordinates,
    pub units: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    AcquiringLocation,
    Fetching(FetchContext),
    Success(DisplayModel),
    Failed(PipelineFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Rendered(DisplayModel),
    Failed(PipelineFailure),
    /// A newer refresh started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct WeatherPipeline {
    location: Box<dyn LocationProvider>,
    weather: Box<dyn WeatherProvider>,
    cache: Box<dyn ResponseCache>,
    location_timeout: Option<Duration>,
    generation: AtomicU64,
    state: Mutex<PipelineState>,
    screen: Mutex<Screen>,
}

impl WeatherPipeline {
    pub fn new(
        location: Box<dyn LocationProvider>,
        weather: Box<dyn WeatherProvider>,
        cache: Box<dyn ResponseCache>,
        unit: TemperatureUnit,
    ) -> Self {
        Self {
            location,
            weather,
            cache,
            location_timeout: None,
            generation: AtomicU64::new(0),
            state: Mutex::new(PipelineState::Idle),
            screen: Mutex::new(Screen::new(unit)),
        }
    }

    /// Give up on a location fix after `timeout`. Without one the pipeline
    /// waits as long as the provider does.
    pub fn with_location_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Cold start: render the cached response, if any, without touching the network.
    ///
    /// Returns `None` without rendering when the cache is empty or when a
    /// refresh started or committed while the cache was being read.
    pub fn start(&self) -> Option<DisplayModel> {
        let generation = self.generation.load(Ordering::SeqCst);
        let snapshot = self.cache.load()?;

        let state = self.lock_state();
        if !self.is_current(generation) || matches!(*state, PipelineState::Success(_)) {
            tracing::debug!(generation, "skipping cached render, a refresh got there first");
            return None;
        }

        tracing::info!(location = %snapshot.name, "rendering cached weather");
        Some(self.screen().show(snapshot))
    }

    /// Re-acquire the location and fetch. Nothing is retried.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.lock_state() = PipelineState::AcquiringLocation;

        let coordinates = match self.acquire_location().await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                tracing::warn!(%err, "location unavailable");
                return self.finish_failed(generation, PipelineFailure::Location(err));
            }
        };

        let context = FetchContext {
            coordinates,
            units: METRIC_UNITS.to_string(),
            generation,
        };
        {
            let mut state = self.lock_state();
            if !self.is_current(generation) {
                return self.superseded(generation);
            }
            *state = PipelineState::Fetching(context.clone());
        }

        match self.weather.fetch_weather(&context.coordinates, &context.units).await {
            Ok(snapshot) => self.finish_success(generation, snapshot),
            Err(err) => {
                tracing::warn!(kind = %err.kind(), %err, "weather fetch failed");
                self.finish_failed(generation, PipelineFailure::Fetch(FetchFailed::from(&err)))
            }
        }
    }

    /// Unit toggle for the current render.
    pub fn set_unit(&self, unit: TemperatureUnit) -> Option<DisplayModel> {
        self.screen().set_unit(unit)
    }

    pub fn state(&self) -> PipelineState {
        self.lock_state().clone()
    }

    pub fn current_display(&self) -> Option<DisplayModel> {
        self.screen().display().cloned()
    }

    async fn acquire_location(&self) -> Result<Coordinates, LocationError> {
        self.location.availability().into_result()?;

        let fix = self.location.current_fix();
        match self.location_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, fix).await.map_err(|_| LocationError::NoFix)?
            }
            None => fix.await,
        }
    }

    fn finish_success(&self, generation: u64, snapshot: WeatherSnapshot) -> RefreshOutcome {
        let mut state = self.lock_state();
        if !self.is_current(generation) {
            return self.superseded(generation);
        }

        self.cache.save(&snapshot);
        let rendered = self.screen().show(snapshot);
        tracing::info!(
            location = %rendered.name,
            temperature = %rendered.temperature,
            "weather updated"
        );

        *state = PipelineState::Success(rendered.clone());
        RefreshOutcome::Rendered(rendered)
    }

    fn finish_failed(&self, generation: u64, failure: PipelineFailure) -> RefreshOutcome {
        let mut state = self.lock_state();
        if !self.is_current(generation) {
            return self.superseded(generation);
        }

        *state = PipelineState::Failed(failure.clone());
        RefreshOutcome::Failed(failure)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn superseded(&self, generation: u64) -> RefreshOutcome {
        tracing::debug!(generation, "discarding stale refresh");
        RefreshOutcome::Superseded
    }

    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
