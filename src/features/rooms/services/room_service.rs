use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::backend::identity::{require_session, IdentityProvider};
use crate::backend::object::ObjectStore;
use crate::backend::records::{MembershipRecord, RoomRecord};
use crate::backend::store::{DataStore, StoreError};
use crate::core::error::{AppError, Result};
use crate::features::rooms::allocator::JoinCodeAllocator;
use crate::features::rooms::dtos::{CreateRoomDto, JoinRoomDto};
use crate::shared::constants::JOIN_CODE_MAX_ATTEMPTS;

/// Service for room lifecycle: creation, join-code redemption, listing and
/// cascaded deletion.
pub struct RoomService {
    store: Arc<dyn DataStore>,
    objects: Arc<dyn ObjectStore>,
    identity: Arc<dyn IdentityProvider>,
    allocator: JoinCodeAllocator,
}

impl RoomService {
    pub fn new(
        store: Arc<dyn DataStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
        allocator: JoinCodeAllocator,
    ) -> Self {
        Self {
            store,
            objects,
            identity,
            allocator,
        }
    }

    /// Create a room with a freshly allocated join code.
    ///
    /// The probe in the allocator cannot rule out a concurrent insert of the
    /// same code, so a uniqueness violation here restarts the whole creation
    /// (new code, new insert) rather than failing outright.
    pub async fn create_room(&self, dto: CreateRoomDto) -> Result<RoomRecord> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = require_session(self.identity.as_ref()).await?;

        for attempt in 1..=JOIN_CODE_MAX_ATTEMPTS {
            let join_code = self.allocator.allocate().await?;
            let room = RoomRecord {
                id: Uuid::new_v4(),
                name: dto.name.clone(),
                created_by: session.user_id,
                join_code,
            };

            match self.store.insert_room(room.clone()).await {
                Ok(()) => {
                    info!(
                        "Room '{}' created by {} with join code {}",
                        room.name, room.created_by, room.join_code
                    );
                    return Ok(room);
                }
                Err(StoreError::UniqueViolation { constraint })
                    if constraint.contains("join_code") =>
                {
                    warn!(
                        "Join code '{}' lost an insert race (attempt {}), regenerating",
                        room.join_code, attempt
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a unique join code, please retry".to_string(),
        ))
    }

    /// Redeem a join code. Already being a member is a no-op, not an error.
    pub async fn join_room(&self, dto: JoinRoomDto) -> Result<RoomRecord> {
        // Codes are shown uppercase; accept them however the user typed them
        let dto = JoinRoomDto {
            join_code: dto.join_code.trim().to_uppercase(),
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = require_session(self.identity.as_ref()).await?;

        let room = self
            .store
            .room_by_join_code(&dto.join_code)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        if self
            .store
            .membership_exists(room.id, session.user_id)
            .await?
        {
            return Ok(room);
        }

        match self
            .store
            .insert_membership(MembershipRecord {
                room_id: room.id,
                user_id: session.user_id,
            })
            .await
        {
            Ok(()) => {
                info!("User {} joined room {}", session.user_id, room.id);
                Ok(room)
            }
            // Raced with ourselves from another tab; membership exists either way
            Err(StoreError::UniqueViolation { .. }) => Ok(room),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_room(&self, room_id: Uuid) -> Result<RoomRecord> {
        self.store
            .room_by_id(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
    }

    /// Rooms the user created (dashboard, with join codes visible)
    pub async fn list_created(&self, user_id: Uuid) -> Result<Vec<RoomRecord>> {
        Ok(self.store.rooms_created_by(user_id).await?)
    }

    /// Rooms the user joined via code, excluding their own
    pub async fn list_joined(&self, user_id: Uuid) -> Result<Vec<RoomRecord>> {
        let memberships = self.store.memberships_for_user(user_id).await?;
        let room_ids: Vec<Uuid> = memberships.iter().map(|m| m.room_id).collect();
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rooms = self.store.rooms_by_ids(&room_ids).await?;
        Ok(rooms
            .into_iter()
            .filter(|r| r.created_by != user_id)
            .collect())
    }

    /// Delete a room and everything hanging off it: storage blobs first, then
    /// comment, file and membership rows, then the room itself.
    ///
    /// Only the creator may delete. Each step is idempotent, so a failure
    /// reported mid-way leaves the operation safe to retry.
    pub async fn delete_room(&self, room_id: Uuid) -> Result<()> {
        let session = require_session(self.identity.as_ref()).await?;

        let room = self
            .store
            .room_by_id(room_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        if room.created_by != session.user_id {
            return Err(AppError::Forbidden(
                "Only the room creator can delete it".to_string(),
            ));
        }

        let files = self.store.files_for_room(room_id).await?;
        let keys: Vec<String> = files.into_iter().map(|f| f.object_key).collect();
        if !keys.is_empty() {
            self.objects.remove(&keys).await?;
        }

        self.store.delete_comments_for_room(room_id).await?;
        self.store.delete_files_for_room(room_id).await?;
        self.store.delete_memberships_for_room(room_id).await?;
        self.store.delete_room(room_id, session.user_id).await?;

        info!("Room {} deleted by {}", room_id, session.user_id);
        Ok(())
    }
}
