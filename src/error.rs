//! Error handling.

use axum::{
    extract::rejection::QueryRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use strum_macros::Display;
use thiserror::Error;
use tracing::{event, Level};

use crate::metrics;

/// Crude assay server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum AssayError {
    /// One or more required query parameters were not provided
    #[error("Error: Missing required fields: {0}.")]
    MissingField(String),

    /// A volume token is not a finite, non-negative number
    #[error("Error: Volumes must be a non-negative number, got '{0}'.")]
    InvalidVolume(String),

    /// A crude ID token is not a positive integer
    #[error("Error: Crude IDs must be a positive number, got '{0}'.")]
    InvalidIdentifier(String),

    /// The volumes sum to zero, so there is nothing to blend
    #[error("Warning: All volumes are zero.")]
    AllWeightsZero,

    /// The number of crude IDs differs from the number of volumes
    #[error("Error: Length of parameters do not match ({ids} ids, {volumes} volumes).")]
    LengthMismatch { ids: usize, volumes: usize },

    /// No complete recommended assay is available for these crude IDs
    #[error("Error: No recommended data found for the following Crude ID: {0:?}")]
    IdentifiersNotFound(Vec<i64>),

    /// The volumes add up to more than can be represented
    #[error("Error: Total volume is too large, got {0}.")]
    VolumeOverflow(f64),

    /// The blended API gravity cannot be converted to a conversion factor
    #[error("Error: API gravity {0} is outside the domain of the conversion factor (must be greater than -131.5).")]
    InvalidGravityDomain(f64),

    /// Error while querying the assay store
    #[error("error querying the assay store")]
    UpstreamUnavailable(#[from] sqlx::Error),

    /// Error deserialising the request query string
    #[error("request query is not valid")]
    RequestQueryRejection(#[from] QueryRejection),

    /// Error validating the request query
    #[error("request query is not valid")]
    RequestQueryValidation(#[source] validator::ValidationErrors),

    /// Weights and matrix rows do not line up
    #[error("blend inputs are misaligned ({weights} weights, {rows} rows)")]
    Misaligned { weights: usize, rows: usize },

    /// Crude IDs of two blend inputs are not in the same order
    #[error("blend inputs are misaligned (expected crude IDs {expected:?}, found {found:?})")]
    MisalignedIdentifiers { expected: Vec<i64>, found: Vec<i64> },

    /// The blend produced a different number of yields than there are categories
    #[error("blend produced {found} yield columns, expected {expected}")]
    MisalignedColumns { expected: usize, found: usize },

    /// The store returned more than one recommended record for a crude and product
    #[error("inconsistent assay data: multiple recommended {product} records for crude {crude_id}")]
    InconsistentAssay { crude_id: i64, product: String },

    /// Placeholder for operations that do not exist yet
    #[error("Error: Currently not developed")]
    NotImplemented,
}

/// Coarse classification of an [AssayError], used for logging and metrics.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorClass {
    /// Caller or data error
    Validation,
    /// Failure talking to the assay store
    Upstream,
    /// Bug or broken invariant in this server
    Internal,
}

impl AssayError {
    /// Convert query validation errors into an error.
    ///
    /// When every failure is a missing required field, the result is a
    /// [AssayError::MissingField] listing those fields.
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let missing = {
            let field_errors = errors.field_errors();
            let only_required = !field_errors.is_empty()
                && field_errors
                    .values()
                    .all(|errs| errs.iter().all(|e| e.code == "required"));
            if only_required {
                let mut fields: Vec<&str> = field_errors.keys().copied().collect();
                fields.sort_unstable();
                Some(fields.join(", "))
            } else {
                None
            }
        };
        match missing {
            Some(fields) => Self::MissingField(fields),
            None => Self::RequestQueryValidation(errors),
        }
    }

    /// Returns the class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingField(_)
            | Self::InvalidVolume(_)
            | Self::InvalidIdentifier(_)
            | Self::AllWeightsZero
            | Self::VolumeOverflow(_)
            | Self::LengthMismatch { .. }
            | Self::IdentifiersNotFound(_)
            | Self::InvalidGravityDomain(_)
            | Self::RequestQueryRejection(_)
            | Self::RequestQueryValidation(_) => ErrorClass::Validation,
            Self::UpstreamUnavailable(_) => ErrorClass::Upstream,
            Self::Misaligned { .. }
            | Self::MisalignedIdentifiers { .. }
            | Self::MisalignedColumns { .. }
            | Self::InconsistentAssay { .. }
            | Self::NotImplemented => ErrorClass::Internal,
        }
    }
}

impl IntoResponse for AssayError {
    /// Convert from an `AssayError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    #[serde(rename = "ERROR")]
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// The body is flattened so that clients see `{"ERROR": "..."}`.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    #[serde(flatten)]
    body: ErrorBody,
}

impl ErrorResponse {
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            body: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Return a 501 not implemented ErrorResponse
    fn not_implemented<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::NOT_IMPLEMENTED, error)
    }

    /// Return a 503 service unavailable ErrorResponse
    fn service_unavailable<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, error)
    }
}

impl From<AssayError> for ErrorResponse {
    /// Convert from an `AssayError` into an `ErrorResponse`.
    fn from(error: AssayError) -> Self {
        let response = match &error {
            // Bad request
            AssayError::MissingField(_)
            | AssayError::InvalidVolume(_)
            | AssayError::InvalidIdentifier(_)
            | AssayError::AllWeightsZero
            | AssayError::VolumeOverflow(_)
            | AssayError::LengthMismatch { .. }
            | AssayError::IdentifiersNotFound(_)
            | AssayError::InvalidGravityDomain(_)
            | AssayError::RequestQueryRejection(_)
            | AssayError::RequestQueryValidation(_) => Self::bad_request(&error),

            // Not implemented
            AssayError::NotImplemented => Self::not_implemented(&error),

            // Internal server error
            AssayError::Misaligned { .. }
            | AssayError::MisalignedIdentifiers { .. }
            | AssayError::MisalignedColumns { .. }
            | AssayError::InconsistentAssay { .. } => Self::internal_server_error(&error),

            AssayError::UpstreamUnavailable(sqlx_error) => match sqlx_error {
                // The store could not be reached in time.
                sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed => Self::service_unavailable(&error),

                // Anything else means the query itself or the decoding of its rows failed.
                _ => Self::internal_server_error(&error),
            },
        };

        metrics::record_error_class(error.class());

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, class = %error.class(), "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        } else {
            event!(Level::DEBUG, class = %error.class(), "{}", error.to_string());
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
