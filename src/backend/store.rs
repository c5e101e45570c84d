use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::records::{
    CommentRecord, FileRecord, MembershipRecord, ProfileRecord, RoomRecord,
};

/// Errors reported by the external data store.
///
/// Uniqueness violations are distinguishable from other failures so callers
/// can retry (join-code races) or downgrade to a no-op (membership races).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// External data store contract: typed row operations over the five tables.
///
/// Single-row fetches return `None` for missing rows. Deletes are idempotent;
/// deleting absent rows succeeds and reports zero rows affected.
#[async_trait]
pub trait DataStore: Send + Sync {
    // profiles
    async fn insert_profile(&self, profile: ProfileRecord) -> StoreResult<()>;
    async fn profile_by_user(&self, user_id: Uuid) -> StoreResult<Option<ProfileRecord>>;

    // rooms
    async fn insert_room(&self, room: RoomRecord) -> StoreResult<()>;
    async fn room_by_id(&self, room_id: Uuid) -> StoreResult<Option<RoomRecord>>;
    async fn room_by_join_code(&self, join_code: &str) -> StoreResult<Option<RoomRecord>>;
    async fn rooms_created_by(&self, user_id: Uuid) -> StoreResult<Vec<RoomRecord>>;
    async fn rooms_by_ids(&self, room_ids: &[Uuid]) -> StoreResult<Vec<RoomRecord>>;
    async fn delete_room(&self, room_id: Uuid, created_by: Uuid) -> StoreResult<u64>;

    // memberships
    async fn insert_membership(&self, membership: MembershipRecord) -> StoreResult<()>;
    async fn membership_exists(&self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRecord>>;
    async fn delete_memberships_for_room(&self, room_id: Uuid) -> StoreResult<u64>;

    // files
    async fn insert_file(&self, file: FileRecord) -> StoreResult<()>;
    async fn files_for_room(&self, room_id: Uuid) -> StoreResult<Vec<FileRecord>>;
    async fn delete_file_by_object_key(&self, object_key: &str) -> StoreResult<u64>;
    async fn delete_files_for_room(&self, room_id: Uuid) -> StoreResult<u64>;

    // comments
    async fn insert_comment(&self, comment: CommentRecord) -> StoreResult<()>;
    async fn comments_for_room(&self, room_id: Uuid) -> StoreResult<Vec<CommentRecord>>;
    async fn delete_comments_for_room(&self, room_id: Uuid) -> StoreResult<u64>;
}
