use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// An authenticated session issued by the identity provider.
///
/// Observed by the application, never mutated by it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// External identity provider contract.
///
/// `watch_session` is the change-notification channel: the receiver observes
/// every session transition (sign-in, sign-out, external expiry). Dropping the
/// receiver unsubscribes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>>;

    async fn sign_up(&self, credentials: Credentials) -> Result<Session>;

    async fn sign_in(&self, credentials: Credentials) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    fn watch_session(&self) -> watch::Receiver<Option<Session>>;
}

/// Resolve the current session or fail with an authentication error.
pub async fn require_session(identity: &dyn IdentityProvider) -> Result<Session> {
    identity
        .current_session()
        .await?
        .ok_or_else(|| AppError::Auth("User not authenticated".to_string()))
}
