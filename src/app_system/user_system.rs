use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::api::UsersApi;
use crate::clients::UserClient;
use crate::config::AppConfig;
use crate::domain::{seed_users, User};

/// The running application: the user store actor plus the API in front of it.
///
/// Responsible for starting the actor, seeding it, and handling shutdown.
pub struct UserSystem {
    pub user_client: UserClient,
    pub api: UsersApi,
    handle: tokio::task::JoinHandle<()>,
}

impl UserSystem {
    pub fn new(config: &AppConfig) -> Self {
        // Ids continue after the largest stored id.
        let next_user_id = |last: Option<&i32>| last.map_or(1, |id| id + 1);

        let (user_actor, user_resource_client) = ResourceActor::<User>::new(config.buffer_size, next_user_id);
        let user_actor = user_actor.with_items(seed_users());
        let handle = tokio::spawn(user_actor.run());

        let user_client = UserClient::new(user_resource_client);
        let api = UsersApi::new(user_client.clone(), config.default_version);
        info!(default_version = %config.default_version, "User system started");

        Self { user_client, api, handle }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // The actor stops once every client is gone.
        drop(self.user_client);
        drop(self.api);

        if let Err(e) = self.handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(format!("Actor task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
