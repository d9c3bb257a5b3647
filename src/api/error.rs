use serde_json::{json, Value};
use thiserror::Error;

use crate::patch::PatchError;
use crate::user_actor::UserError;
use crate::validation::ValidationReport;

use super::request::{ApiResponse, Method};

/// Everything a request can fail with. [`ApiError::status`] is the only
/// place where failures become status codes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("No record with id {0} found in the system.")]
    NotFound(String),
    #[error("No route matches '{0}'.")]
    RouteNotFound(String),
    #[error("The HTTP method '{0}' is not supported for '{1}'.")]
    MethodNotAllowed(Method, String),
    #[error("The HTTP resource that matches the request URI '{path}' does not support the API version '{version}'.")]
    UnsupportedApiVersion { path: String, version: String },
    #[error("The following API versions were requested: {0}. At most, only a single API version may be specified.")]
    AmbiguousApiVersion(String),
    #[error(transparent)]
    Patch(PatchError),
    #[error("One or more validation errors occurred.")]
    Validation(ValidationReport),
    #[error("Encountered an unexpected fault. Try again later.")]
    Unexpected(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_)
            | ApiError::UnsupportedApiVersion { .. }
            | ApiError::AmbiguousApiVersion(_)
            | ApiError::Patch(_)
            | ApiError::Validation(_) => 400,
            ApiError::NotFound(_) | ApiError::RouteNotFound(_) => 404,
            ApiError::MethodNotAllowed(..) => 405,
            ApiError::Unexpected(_) => 500,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::NotFound(_) => "NotFound",
            ApiError::RouteNotFound(_) => "RouteNotFound",
            ApiError::MethodNotAllowed(..) => "MethodNotAllowed",
            ApiError::UnsupportedApiVersion { .. } => "UnsupportedApiVersion",
            ApiError::AmbiguousApiVersion(_) => "AmbiguousApiVersion",
            ApiError::Patch(e) => e.kind.code(),
            ApiError::Validation(_) => "ValidationFailed",
            ApiError::Unexpected(_) => "UnexpectedFault",
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Patch(e) => json!({
                "error": self.code(),
                "message": e.kind.to_string(),
                "index": e.index,
                "op": e.op.as_str(),
                "path": e.path,
            }),
            ApiError::Validation(report) => json!({
                "title": self.to_string(),
                "status": self.status(),
                "errors": report.by_field(),
            }),
            _ => json!({
                "error": self.code(),
                "message": self.to_string(),
            }),
        }
    }

    pub fn into_response(self) -> ApiResponse {
        ApiResponse::new(self.status(), Some(self.body()))
    }
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound(id) => ApiError::NotFound(id),
            UserError::Patch(e) => ApiError::Patch(e),
            UserError::Validation(report) => ApiError::Validation(report),
            e @ UserError::IdMismatch { .. } => ApiError::BadRequest(e.to_string()),
            UserError::ActorCommunicationError(reason) => ApiError::Unexpected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{OperationKind, PatchErrorKind};

    #[test]
    fn test_patch_error_body_names_operation() {
        let error = ApiError::Patch(PatchError {
            index: 0,
            op: OperationKind::Replace,
            path: "/Nonexistent".to_string(),
            kind: PatchErrorKind::PathNotFound("/Nonexistent".to_string()),
        });
        let response = error.into_response();
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            Some(json!({
                "error": "PathNotFound",
                "message": "the target location '/Nonexistent' was not found",
                "index": 0,
                "op": "replace",
                "path": "/Nonexistent",
            }))
        );
    }

    #[test]
    fn test_unexpected_hides_details() {
        let response = ApiError::Unexpected("expected value at line 1".into()).into_response();
        assert_eq!(response.status, 500);
        assert_eq!(
            response.body.unwrap()["message"],
            "Encountered an unexpected fault. Try again later."
        );
    }

    #[test]
    fn test_user_errors_map_to_statuses() {
        assert_eq!(ApiError::from(UserError::NotFound("4".into())).status(), 404);
        assert_eq!(
            ApiError::from(UserError::Validation(ValidationReport::default())).status(),
            400
        );
        assert_eq!(
            ApiError::from(UserError::ActorCommunicationError("Actor closed".into())).status(),
            500
        );
    }
}
