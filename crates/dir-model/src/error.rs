//! # Model Errors
//!
//! This module defines the error types shared by every data-access operation.
//! By centralizing error definitions, every resource kind surfaces the same
//! taxonomy to the transport layer, whether the failure came from the cache
//! or from a live directory round trip.

use serde::Serialize;

/// A single field-level problem reported by a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldError {
    /// The field was required but absent.
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: "MissingParameter".to_string(),
            message: None,
        }
    }

    /// The field was present but its value is not acceptable.
    pub fn invalid(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: "Invalid".to_string(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Errors returned by the data-access operations and request adapters.
///
/// `ModelError` is `Clone` because failures are cached as value snapshots
/// (see [`crate::cache::CacheEntry`]).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Submitted data is malformed.
    #[error("{message}")]
    ValidationFailed {
        message: String,
        errors: Vec<FieldError>,
    },
    /// A request parameter (e.g. a route variable) is malformed.
    #[error("{message}")]
    InvalidParameter {
        message: String,
        errors: Vec<FieldError>,
    },
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    ResourceNotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
    /// The directory could not be reached. Never cached.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ModelError {
    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        ModelError::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        ModelError::InvalidParameter {
            message: message.into(),
            errors,
        }
    }

    /// True when the failure only reflects the directory being temporarily
    /// unreachable.
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::ServiceUnavailable(_))
    }

    /// True for errors a resource kind raises because a record is invalid for
    /// that kind. List skips such records with a warning.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ModelError::ValidationFailed { .. } | ModelError::InvalidParameter { .. }
        )
    }

    pub fn rest_code(&self) -> &'static str {
        match self {
            ModelError::ValidationFailed { .. } => "ValidationFailed",
            ModelError::InvalidParameter { .. } => "InvalidParameter",
            ModelError::Unauthorized(_) => "NotAuthorized",
            ModelError::ResourceNotFound(_) => "ResourceNotFound",
            ModelError::Conflict(_) => "Conflict",
            ModelError::Internal(_) => "InternalError",
            ModelError::ServiceUnavailable(_) => "ServiceUnavailable",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ModelError::ValidationFailed { .. } | ModelError::InvalidParameter { .. } => 422,
            ModelError::Unauthorized(_) => 403,
            ModelError::ResourceNotFound(_) => 404,
            ModelError::Conflict(_) => 409,
            ModelError::Internal(_) => 500,
            ModelError::ServiceUnavailable(_) => 503,
        }
    }

    /// The JSON error body sent to clients: `{code, message, errors?}`.
    pub fn body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "code": self.rest_code(),
            "message": self.to_string(),
        });
        if let ModelError::ValidationFailed { errors, .. }
        | ModelError::InvalidParameter { errors, .. } = self
        {
            body["errors"] = serde_json::to_value(errors).unwrap_or_default();
        }
        body
    }
}

/// Errors reported by a [`Directory`](crate::directory::Directory) backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The backend could not be reached right now.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
    #[error("no such object: {0}")]
    NoSuchObject(String),
    #[error("entry already exists: {0}")]
    AlreadyExists(String),
    #[error("directory error: {0}")]
    Other(String),
}

impl From<DirectoryError> for ModelError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unavailable(msg) => ModelError::ServiceUnavailable(msg),
            DirectoryError::NoSuchObject(dn) => {
                ModelError::ResourceNotFound(format!("{dn} not found"))
            }
            DirectoryError::AlreadyExists(dn) => {
                ModelError::Conflict(format!("{dn} already exists"))
            }
            DirectoryError::Other(msg) => ModelError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(ModelError::ServiceUnavailable("down".into()).is_transient());
        assert!(!ModelError::ResourceNotFound("gone".into()).is_transient());
        assert!(!ModelError::Internal("boom".into()).is_transient());
    }

    #[test]
    fn test_directory_error_mapping() {
        let err: ModelError = DirectoryError::Unavailable("timeout".into()).into();
        assert_eq!(err.status_code(), 503);

        let err: ModelError = DirectoryError::NoSuchObject("uuid=1,o=test".into()).into();
        assert_eq!(err.rest_code(), "ResourceNotFound");

        let err: ModelError = DirectoryError::AlreadyExists("uuid=1,o=test".into()).into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let err = ModelError::validation(
            "invalid image data: name",
            vec![FieldError::missing("name")],
        );
        let body = err.body();
        assert_eq!(body["code"], "ValidationFailed");
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][0]["code"], "MissingParameter");
        assert!(body["errors"][0].get("message").is_none());
    }
}
