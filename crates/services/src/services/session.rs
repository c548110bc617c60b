//! Signed-in identity handed to the editor and the admin shell.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("sign out failed: {0}")]
    SignOut(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Source of the current identity. Implemented by the auth integration.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Option<UserIdentity>;

    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Session holding one identity in memory until sign-out
#[derive(Debug, Default)]
pub struct StaticSession {
    user: RwLock<Option<UserIdentity>>,
}

impl StaticSession {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.user.read().await.clone()
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let previous = self.user.write().await.take();
        match previous {
            Some(user) => {
                info!(user_id = %user.id, "Signed out");
                Ok(())
            }
            None => Err(SessionError::NotSignedIn),
        }
    }
}
