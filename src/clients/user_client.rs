use tracing::{debug, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate};
use crate::user_actor::{UserError, UserPatch, UserReplacement};

/// Client for interacting with the User actor.
///
/// Converts framework errors into [`UserError`] so callers only deal with
/// one error type.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        debug!("Sending request");
        self.inner.list().await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(UserError::from)
    }

    #[instrument(skip(self, user), fields(user_name = %user.name))]
    pub async fn create_user(&self, user: UserCreate) -> Result<i32, UserError> {
        debug!("Sending request");
        self.inner.create(user).await.map_err(UserError::from)
    }

    #[instrument(skip(self, replacement))]
    pub async fn replace_user(&self, id: i32, replacement: UserReplacement) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.replace(id, replacement).await.map_err(UserError::from)
    }

    #[instrument(skip(self, patch), fields(operations = patch.document.len()))]
    pub async fn patch_user(&self, id: i32, patch: UserPatch) -> Result<User, UserError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(UserError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> Result<(), UserError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(UserError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::FrameworkError;
    use crate::mock_framework::{create_mock_client, expect_get};

    #[tokio::test]
    async fn test_framework_errors_map_to_user_errors() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let task = tokio::spawn(async move { client.get_user(3).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, 3);
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(UserError::ActorCommunicationError("Actor dropped".to_string())));
    }
}
