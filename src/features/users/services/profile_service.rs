use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::backend::identity::{require_session, IdentityProvider};
use crate::backend::records::ProfileRecord;
use crate::backend::store::{DataStore, StoreError};
use crate::core::error::{AppError, Result};
use crate::features::users::dtos::SetUsernameDto;
use crate::shared::constants::ANONYMOUS_USERNAME;

/// Service for profile onboarding and username resolution
pub struct ProfileService {
    store: Arc<dyn DataStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DataStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Persist the current user's username. Allowed exactly once; a second
    /// attempt, or a username someone else holds, is a conflict.
    pub async fn set_username(&self, dto: SetUsernameDto) -> Result<ProfileRecord> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = require_session(self.identity.as_ref()).await?;

        let profile = ProfileRecord {
            user_id: session.user_id,
            username: dto.username,
        };

        match self.store.insert_profile(profile.clone()).await {
            Ok(()) => {
                info!("Username '{}' set for user {}", profile.username, profile.user_id);
                Ok(profile)
            }
            Err(StoreError::UniqueViolation { constraint }) if constraint.contains("username") => {
                Err(AppError::Conflict("Username already taken".to_string()))
            }
            Err(StoreError::UniqueViolation { .. }) => Err(AppError::Conflict(
                "A username is already set for this account".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<ProfileRecord>> {
        Ok(self.store.profile_by_user(user_id).await?)
    }

    /// Whether the user has completed onboarding.
    ///
    /// A failed lookup counts as incomplete: the route guard must fall toward
    /// the lower-privilege state, never toward the dashboard.
    pub async fn is_complete(&self, user_id: Uuid) -> bool {
        match self.store.profile_by_user(user_id).await {
            Ok(Some(profile)) => !profile.username.is_empty(),
            Ok(None) => false,
            Err(e) => {
                warn!("Profile completeness lookup failed for {}: {}", user_id, e);
                false
            }
        }
    }

    /// Display name for an author id, degrading to a placeholder when the
    /// profile is missing or the lookup fails. Never an error.
    pub async fn username_of(&self, user_id: Uuid) -> String {
        match self.store.profile_by_user(user_id).await {
            Ok(Some(profile)) if !profile.username.is_empty() => profile.username,
            Ok(_) => ANONYMOUS_USERNAME.to_string(),
            Err(e) => {
                debug!("Username lookup failed for {}: {}", user_id, e);
                ANONYMOUS_USERNAME.to_string()
            }
        }
    }
}
