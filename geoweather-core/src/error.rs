//! Failure types crossing the component seams.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single weather request did not produce a snapshot.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("bad request (HTTP 400): {0}")]
    BadRequest(String),

    #[error("not found (HTTP 404): {0}")]
    NotFound(String),

    #[error("request failed with status {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("no response from weather service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::BadRequest(_) => FetchErrorKind::BadRequest,
            Self::NotFound(_) => FetchErrorKind::NotFound,
            Self::Http { .. } => FetchErrorKind::GenericHttp,
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::InvalidBody(_) => FetchErrorKind::InvalidBody,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    BadRequest,
    NotFound,
    GenericHttp,
    Transport,
    InvalidBody,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::NotFound => "not found",
            Self::GenericHttp => "http error",
            Self::Transport => "transport error",
            Self::InvalidBody => "invalid body",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform fetch failure handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailed {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl From<&FetchError> for FetchFailed {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for FetchFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location services are turned off")]
    Disabled,

    #[error("no location fix was produced")]
    NoFix,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// User-facing remediation text.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "You have turned off location permissions required for this feature. \
                 Please enable them in your system privacy settings."
            }
            Self::Disabled => {
                "Your location provider is turned off. Please turn it on in your system settings."
            }
            Self::NoFix | Self::Unavailable(_) => {
                "Could not determine your location. Check that location services are running."
            }
        }
    }

    /// Whether the user has to change a setting before a retry can succeed.
    pub fn needs_settings(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Disabled)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineFailure {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("weather fetch failed ({0})")]
    Fetch(FetchFailed),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_kinds() {
        assert_eq!(FetchError::BadRequest("x".into()).kind(), FetchErrorKind::BadRequest);
        assert_eq!(FetchError::NotFound("x".into()).kind(), FetchErrorKind::NotFound);

        let err = FetchError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "oops".into(),
        };
        assert_eq!(err.kind(), FetchErrorKind::GenericHttp);
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn fetch_failed_carries_kind_and_message() {
        let err = FetchError::NotFound("city not found".into());
        let failed = FetchFailed::from(&err);

        assert_eq!(failed.kind, FetchErrorKind::NotFound);
        assert!(failed.message.contains("city not found"));
        assert!(failed.to_string().starts_with("not found:"));
    }

    #[test]
    fn settings_remediation_only_for_permission_and_disabled() {
        assert!(LocationError::PermissionDenied.needs_settings());
        assert!(LocationError::Disabled.needs_settings());
        assert!(!LocationError::NoFix.needs_settings());
        assert!(LocationError::Disabled.remediation().contains("turned off"));
    }
}
