//! Sources of a single location fix.

use async_trait::async_trait;
use regex::Regex;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::OnceLock,
};
use tokio::process::Command;

use crate::{error::LocationError, model::Coordinates};

/// geoclue demo agent that prints one fix and exits.
pub const DEFAULT_GEOCLUE_COMMAND: &str = "/usr/lib/geoclue-2.0/demos/where-am-i";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAvailability {
    Ready,
    Disabled,
    PermissionDenied,
}

impl LocationAvailability {
    pub fn into_result(self) -> Result<(), LocationError> {
        match self {
            Self::Ready => Ok(()),
            Self::Disabled => Err(LocationError::Disabled),
            Self::PermissionDenied => Err(LocationError::PermissionDenied),
        }
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// Must be `Ready` before [`LocationProvider::current_fix`] is called.
    fn availability(&self) -> LocationAvailability;

    /// Produces at most one fix per call.
    async fn current_fix(&self) -> Result<Coordinates, LocationError>;
}

/// A location known up front (CLI flags or config).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    fn availability(&self) -> LocationAvailability {
        LocationAvailability::Ready
    }

    async fn current_fix(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Asks geoclue for a fix through its `where-am-i` agent.
///
/// `command` is either a path or a bare program name looked up on `PATH`.
#[derive(Debug, Clone)]
pub struct GeoclueLocation {
    command: String,
}

impl GeoclueLocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        let command = Path::new(&self.command);
        if command.components().count() > 1 {
            return command.is_file().then(|| command.to_path_buf());
        }

        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(command))
            .find(|candidate| candidate.is_file())
    }
}

impl Default for GeoclueLocation {
    fn default() -> Self {
        Self::new(DEFAULT_GEOCLUE_COMMAND)
    }
}

#[async_trait]
impl LocationProvider for GeoclueLocation {
    fn availability(&self) -> LocationAvailability {
        if self.resolve().is_some() {
            LocationAvailability::Ready
        } else {
            LocationAvailability::Disabled
        }
    }

    async fn current_fix(&self) -> Result<Coordinates, LocationError> {
        // A timed-out fix drops this future; the agent goes with it.
        let output = Command::new(&self.command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                LocationError::Unavailable(format!("failed to run {}: {err}", self.command))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(classify_failure(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let fix = parse_where_am_i(&stdout)?;
        tracing::debug!(coordinates = %fix, "geoclue fix");

        Ok(fix)
    }
}

fn classify_failure(stderr: &str) -> LocationError {
    let lower = stderr.to_lowercase();
    if lower.contains("denied") || lower.contains("not authorized") {
        LocationError::PermissionDenied
    } else if lower.contains("disabled") {
        LocationError::Disabled
    } else {
        LocationError::Unavailable(stderr.trim().to_string())
    }
}

static LAT_RE: OnceLock<Regex> = OnceLock::new();
static LON_RE: OnceLock<Regex> = OnceLock::new();

/// Parses the `Latitude:` / `Longitude:` lines printed by `where-am-i`.
pub fn parse_where_am_i(stdout: &str) -> Result<Coordinates, LocationError> {
    let lat_re = LAT_RE.get_or_init(|| coordinate_regex("Latitude"));
    let lon_re = LON_RE.get_or_init(|| coordinate_regex("Longitude"));

    let latitude = capture_degrees(lat_re, stdout, "latitude")?;
    let longitude = capture_degrees(lon_re, stdout, "longitude")?;

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

fn coordinate_regex(label: &str) -> Regex {
    Regex::new(&format!(r"{label}:\s*(-?\d+(?:\.\d+)?)")).expect("built-in coordinate pattern")
}

fn capture_degrees(re: &Regex, text: &str, what: &str) -> Result<f64, LocationError> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| LocationError::Unavailable(format!("no {what} in geoclue output")))
}
