use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::patch::PatchError;
use crate::validation::ValidationReport;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("User validation error: {0}")]
    Validation(ValidationReport),
    #[error("Body id {body} does not match route id {route}")]
    IdMismatch { route: i32, body: i32 },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<UserError>> for UserError {
    fn from(error: FrameworkError<UserError>) -> Self {
        match error {
            FrameworkError::NotFound(id) => UserError::NotFound(id),
            FrameworkError::Entity(inner) => inner,
            other @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                UserError::ActorCommunicationError(other.to_string())
            }
        }
    }
}
