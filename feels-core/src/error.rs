use thiserror::Error;

use crate::model::Coordinates;

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No authentication token found")]
    NotAuthenticated,

    #[error("Invalid API base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("Failed to send request to {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// True when the backend rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED)
    }
}

/// Failures from a position lookup.
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("User denied Geolocation")]
    PermissionDenied,

    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("{0}")]
    Platform(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Registration failed")]
    RegistrationFailed(#[source] ApiError),

    #[error("Login failed")]
    LoginFailed(#[source] ApiError),

    #[error("Failed to access stored credential: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Failures of the capture-then-report location sequence.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("No authentication token found")]
    NotAuthenticated,

    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("Failed to get location: {0}")]
    Position(#[source] GeolocationError),

    /// The position was captured but the backend did not accept it.
    #[error("Failed to update location")]
    Update {
        coords: Coordinates,
        #[source]
        source: ApiError,
    },
}

impl From<GeolocationError> for LocationError {
    fn from(err: GeolocationError) -> Self {
        match err {
            GeolocationError::Unsupported => LocationError::Unsupported,
            other => LocationError::Position(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Select how the weather feels before submitting")]
    NothingSelected,

    #[error("Survey already submitted")]
    AlreadySubmitted,

    #[error("Failed to submit feeling score")]
    Rejected(#[source] ApiError),
}
