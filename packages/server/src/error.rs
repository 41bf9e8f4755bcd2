//! Conversion of handler failures into `{ "error": ... }` responses.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use thiserror::Error;
use zoonosis_map_dataset::DatasetError;
use zoonosis_map_prediction::PredictionError;
use zoonosis_map_server_models::{ApiError, ValidationError};

/// Any failure a route can report to the client.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request body is not a JSON document of the expected shape.
    #[error("Invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),

    /// A field is missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The model is absent or inference failed.
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// A dataset file is missing, unreadable, or unwritable.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A blocking file task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl HandlerError {
    /// HTTP status reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Body(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Dataset(DatasetError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Prediction(_) | Self::Dataset(_) | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Logs the error against `route` and builds the response.
    #[must_use]
    pub fn respond(&self, route: &str) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Error in {route}: {self}");
        } else {
            log::warn!("Rejected {route}: {self}");
        }

        HttpResponse::build(status).json(ApiError {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let missing = HandlerError::from(ValidationError::Missing {
            field: "latitude".to_string(),
        });
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Field latitude is required");

        let unavailable = HandlerError::from(PredictionError::ModelUnavailable);
        assert_eq!(unavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let inference = HandlerError::from(PredictionError::Inference("bad".to_string()));
        assert_eq!(inference.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let not_found = HandlerError::from(DatasetError::NotFound("gone".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "gone");

        let io = HandlerError::from(DatasetError::Io {
            path: "sample.geojson".to_string(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = HandlerError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert_eq!(body.status(), StatusCode::BAD_REQUEST);
    }
}
