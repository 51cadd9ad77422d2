use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures a content store is allowed to report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("metadata is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Catalog root '{0}' not found")]
    CatalogRootMissing(String),

    #[error("Catalog root '{0}' is not a directory")]
    InvalidCatalogStructure(String),

    #[error("Course '{0}' not found")]
    CourseNotFound(String),

    #[error("Course path for '{0}' is not a directory")]
    InvalidCourseStructure(String),

    #[error("Malformed metadata for '{slug}': {source}")]
    MalformedMetadata {
        slug: String,
        #[source]
        source: MetadataError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{error}: {details}")]
    Internal { error: String, details: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CatalogRootMissing(root) => {
                AppError::NotFound(format!("Course directory '{}' not found in repository.", root))
            }
            CatalogError::CourseNotFound(slug) => {
                AppError::NotFound(format!("Course metadata not found for '{}'", slug))
            }
            CatalogError::InvalidCourseStructure(slug) => {
                AppError::NotFound(format!("Course path not found or invalid for '{}'", slug))
            }
            CatalogError::InvalidCatalogStructure(root) => AppError::Internal {
                error: "Invalid course directory structure in repository.".to_string(),
                details: format!("'{}' is not a directory", root),
            },
            CatalogError::MalformedMetadata { slug, source } => AppError::Internal {
                error: format!("Failed to fetch details for course '{}'", slug),
                details: format!("Failed to parse metadata: {}", source),
            },
            CatalogError::Store(StoreError::NotFound(path)) => {
                AppError::NotFound(format!("'{}' not found in repository", path))
            }
            CatalogError::Store(StoreError::Unavailable(details)) => AppError::Internal {
                error: "Failed to fetch courses from repository".to_string(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse { error: msg, details: None },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse { error: msg, details: None },
            ),
            AppError::Internal { error, details } => {
                error!("request failed: {} ({})", error, details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse { error, details: Some(details) },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
