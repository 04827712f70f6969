use crate::config::ConfigError;
use crate::enrichment::EnrichmentError;
use crate::geocode::GeocodeError;
use crate::reference::fetch::FetchError;
use crate::reference::ReferenceError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Enrichment(EnrichmentError),
    Fetch(FetchError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Enrichment(EnrichmentError::Geocode(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Enrichment(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Enrichment(EnrichmentError::Geocode(err)) => {
                write!(f, "service unavailable: {}", err)
            }
            AppError::Enrichment(EnrichmentError::Reference(err)) => {
                write!(f, "resource unavailable: {}", err)
            }
            AppError::Enrichment(err) => write!(f, "enrichment error: {}", err),
            AppError::Fetch(err) => write!(f, "fetch error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Enrichment(err) => Some(err),
            AppError::Fetch(err) => Some(err),
        }
    }
}

/// Plain-text body; the survey platform reads bodies, not JSON envelopes.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EnrichmentError> for AppError {
    fn from(value: EnrichmentError) -> Self {
        Self::Enrichment(value)
    }
}

impl From<GeocodeError> for AppError {
    fn from(value: GeocodeError) -> Self {
        Self::Enrichment(EnrichmentError::Geocode(value))
    }
}

impl From<ReferenceError> for AppError {
    fn from(value: ReferenceError) -> Self {
        Self::Enrichment(EnrichmentError::Reference(value))
    }
}

impl From<FetchError> for AppError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}
