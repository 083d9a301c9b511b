//! Trailhunt API: error types.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use trailhunt_core::error::GameError;
use trailhunt_core::message::ChannelId;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The course file could not be read.
    #[error("cannot read course file {}: {source}", path.display())]
    CourseFile {
        /// The configured path.
        path: PathBuf,
        /// The I/O failure.
        source: std::io::Error,
    },

    /// The course file is not a valid course document.
    #[error("invalid course file: {0}")]
    Course(#[from] serde_yaml::Error),

    /// The course could not be assembled into a hunt.
    #[error("invalid course: {0}")]
    Game(#[from] GameError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A fault escaped the hunt.
    Game(GameError),
    /// No team plays in the requested channel.
    TeamNotFound(ChannelId),
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self::Game(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Game(err) => {
                let (status, code) = match err {
                    GameError::ConfigurationFault { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "configuration_fault")
                    }
                    GameError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    GameError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport_error"),
                };
                (status, code, err.to_string())
            }
            Self::TeamNotFound(channel) => (
                StatusCode::NOT_FOUND,
                "team_not_found",
                format!("no team plays in channel {channel}"),
            ),
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_configuration_fault_maps_to_500() {
        assert_eq!(
            status_of(ApiError::from(GameError::ConfigurationFault {
                channel: ChannelId::new("owls"),
                reason: "no start location".into(),
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transport_maps_to_502() {
        assert_eq!(
            status_of(ApiError::from(GameError::Transport("chat down".into()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(ApiError::from(GameError::Validation("bad course".into()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_team_not_found_maps_to_404() {
        assert_eq!(
            status_of(ApiError::TeamNotFound(ChannelId::new("nobody"))),
            StatusCode::NOT_FOUND
        );
    }
}
