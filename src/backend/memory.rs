//! In-memory backend implementing all four external ports on one struct.
//!
//! Used as the injectable test double and as a self-contained local backend.
//! Uniqueness constraints match the hosted schema, and file/comment mutations
//! are echoed onto the change feed the way the hosted backend pushes them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tracing::debug;
use uuid::Uuid;

use crate::backend::feed::{ChangeEvent, ChangeFeed, ChangeKind, FeedRow, FeedSubscription, FeedTable};
use crate::backend::identity::{Credentials, IdentityProvider, Session};
use crate::backend::object::ObjectStore;
use crate::backend::records::{
    CommentRecord, FileRecord, MembershipRecord, ProfileRecord, RoomRecord,
};
use crate::backend::store::{DataStore, StoreError, StoreResult};
use crate::core::error::{AppError, Result};

struct FeedSender {
    table: FeedTable,
    room_id: Uuid,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

pub struct MemoryBackend {
    bucket: String,

    // identity
    accounts: Mutex<HashMap<String, (String, Uuid)>>,
    session_tx: watch::Sender<Option<Session>>,

    // data store
    profiles: Mutex<Vec<ProfileRecord>>,
    rooms: Mutex<Vec<RoomRecord>>,
    memberships: Mutex<Vec<MembershipRecord>>,
    files: Mutex<Vec<FileRecord>>,
    comments: Mutex<Vec<CommentRecord>>,

    // object store
    objects: Mutex<HashMap<String, Vec<u8>>>,

    // change feed
    subscribers: Mutex<Vec<FeedSender>>,

    // failure injection
    fail_profile_lookups: AtomicBool,
    fail_object_removals: AtomicBool,
    room_insert_conflicts: AtomicU32,
}

impl MemoryBackend {
    pub fn new(bucket: impl Into<String>) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            bucket: bucket.into(),
            accounts: Mutex::new(HashMap::new()),
            session_tx,
            profiles: Mutex::new(Vec::new()),
            rooms: Mutex::new(Vec::new()),
            memberships: Mutex::new(Vec::new()),
            files: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            fail_profile_lookups: AtomicBool::new(false),
            fail_object_removals: AtomicBool::new(false),
            room_insert_conflicts: AtomicU32::new(0),
        }
    }

    /// Simulate external session expiry (the provider revoking the session
    /// without a local sign-out).
    pub fn expire_session(&self) {
        let _ = self.session_tx.send(None);
    }

    /// Make subsequent profile lookups fail with a backend error.
    pub fn set_fail_profile_lookups(&self, fail: bool) {
        self.fail_profile_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent object removals fail with a storage error.
    pub fn set_fail_object_removals(&self, fail: bool) {
        self.fail_object_removals.store(fail, Ordering::SeqCst);
    }

    /// Force the next `n` room inserts to report a join-code uniqueness
    /// violation, simulating a lost probe/insert race.
    pub fn inject_room_insert_conflicts(&self, n: u32) {
        self.room_insert_conflicts.store(n, Ordering::SeqCst);
    }

    /// Keys currently present in the object store (test observability).
    pub fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn set_session(&self, session: Session) {
        let _ = self.session_tx.send(Some(session));
    }

    fn emit(&self, table: FeedTable, room_id: Uuid, event: ChangeEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|s| {
            if s.table == table && s.room_id == room_id {
                s.tx.send(event.clone()).is_ok()
            } else {
                !s.tx.is_closed()
            }
        });
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session_tx.borrow().clone())
    }

    async fn sign_up(&self, credentials: Credentials) -> Result<Session> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&credentials.email) {
            return Err(AppError::Auth("Email already registered".to_string()));
        }

        let user_id = Uuid::new_v4();
        accounts.insert(credentials.email.clone(), (credentials.password, user_id));
        drop(accounts);

        let session = Session { user_id };
        self.set_session(session.clone());
        debug!("Signed up user {}", user_id);
        Ok(session)
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
        let accounts = self.accounts.lock().unwrap();
        let (password, user_id) = accounts
            .get(&credentials.email)
            .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

        if *password != credentials.password {
            return Err(AppError::Auth("Invalid email or password".to_string()));
        }

        let session = Session { user_id: *user_id };
        drop(accounts);

        self.set_session(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let _ = self.session_tx.send(None);
        Ok(())
    }

    fn watch_session(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }
}

#[async_trait]
impl DataStore for MemoryBackend {
    async fn insert_profile(&self, profile: ProfileRecord) -> StoreResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(StoreError::UniqueViolation {
                constraint: "profiles_pkey".to_string(),
            });
        }
        if profiles.iter().any(|p| p.username == profile.username) {
            return Err(StoreError::UniqueViolation {
                constraint: "profiles_username_key".to_string(),
            });
        }
        profiles.push(profile);
        Ok(())
    }

    async fn profile_by_user(&self, user_id: Uuid) -> StoreResult<Option<ProfileRecord>> {
        if self.fail_profile_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("profile lookup failed".to_string()));
        }
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn insert_room(&self, room: RoomRecord) -> StoreResult<()> {
        if self.room_insert_conflicts.load(Ordering::SeqCst) > 0 {
            self.room_insert_conflicts.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::UniqueViolation {
                constraint: "rooms_join_code_key".to_string(),
            });
        }

        let mut rooms = self.rooms.lock().unwrap();
        if rooms.iter().any(|r| r.id == room.id) {
            return Err(StoreError::UniqueViolation {
                constraint: "rooms_pkey".to_string(),
            });
        }
        if rooms.iter().any(|r| r.join_code == room.join_code) {
            return Err(StoreError::UniqueViolation {
                constraint: "rooms_join_code_key".to_string(),
            });
        }
        rooms.push(room);
        Ok(())
    }

    async fn room_by_id(&self, room_id: Uuid) -> StoreResult<Option<RoomRecord>> {
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms.iter().find(|r| r.id == room_id).cloned())
    }

    async fn room_by_join_code(&self, join_code: &str) -> StoreResult<Option<RoomRecord>> {
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms.iter().find(|r| r.join_code == join_code).cloned())
    }

    async fn rooms_created_by(&self, user_id: Uuid) -> StoreResult<Vec<RoomRecord>> {
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms
            .iter()
            .filter(|r| r.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn rooms_by_ids(&self, room_ids: &[Uuid]) -> StoreResult<Vec<RoomRecord>> {
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms
            .iter()
            .filter(|r| room_ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn delete_room(&self, room_id: Uuid, created_by: Uuid) -> StoreResult<u64> {
        let mut rooms = self.rooms.lock().unwrap();
        let before = rooms.len();
        rooms.retain(|r| !(r.id == room_id && r.created_by == created_by));
        Ok((before - rooms.len()) as u64)
    }

    async fn insert_membership(&self, membership: MembershipRecord) -> StoreResult<()> {
        let mut memberships = self.memberships.lock().unwrap();
        if memberships
            .iter()
            .any(|m| m.room_id == membership.room_id && m.user_id == membership.user_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "room_members_room_id_user_id_key".to_string(),
            });
        }
        memberships.push(membership);
        Ok(())
    }

    async fn membership_exists(&self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let memberships = self.memberships.lock().unwrap();
        Ok(memberships
            .iter()
            .any(|m| m.room_id == room_id && m.user_id == user_id))
    }

    async fn memberships_for_user(&self, user_id: Uuid) -> StoreResult<Vec<MembershipRecord>> {
        let memberships = self.memberships.lock().unwrap();
        Ok(memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_memberships_for_room(&self, room_id: Uuid) -> StoreResult<u64> {
        let mut memberships = self.memberships.lock().unwrap();
        let before = memberships.len();
        memberships.retain(|m| m.room_id != room_id);
        Ok((before - memberships.len()) as u64)
    }

    async fn insert_file(&self, file: FileRecord) -> StoreResult<()> {
        {
            let mut files = self.files.lock().unwrap();
            if files.iter().any(|f| f.object_key == file.object_key) {
                return Err(StoreError::UniqueViolation {
                    constraint: "files_object_key_key".to_string(),
                });
            }
            files.push(file.clone());
        }
        self.emit(
            FeedTable::Files,
            file.room_id,
            ChangeEvent {
                kind: ChangeKind::Insert,
                row: FeedRow::File(file),
            },
        );
        Ok(())
    }

    async fn files_for_room(&self, room_id: Uuid) -> StoreResult<Vec<FileRecord>> {
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .filter(|f| f.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn delete_file_by_object_key(&self, object_key: &str) -> StoreResult<u64> {
        let removed = {
            let mut files = self.files.lock().unwrap();
            let idx = files.iter().position(|f| f.object_key == object_key);
            idx.map(|i| files.remove(i))
        };
        match removed {
            Some(file) => {
                self.emit(
                    FeedTable::Files,
                    file.room_id,
                    ChangeEvent {
                        kind: ChangeKind::Delete,
                        row: FeedRow::File(file),
                    },
                );
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_files_for_room(&self, room_id: Uuid) -> StoreResult<u64> {
        let removed: Vec<FileRecord> = {
            let mut files = self.files.lock().unwrap();
            let (gone, kept): (Vec<_>, Vec<_>) =
                files.drain(..).partition(|f| f.room_id == room_id);
            *files = kept;
            gone
        };
        let count = removed.len() as u64;
        for file in removed {
            self.emit(
                FeedTable::Files,
                room_id,
                ChangeEvent {
                    kind: ChangeKind::Delete,
                    row: FeedRow::File(file),
                },
            );
        }
        Ok(count)
    }

    async fn insert_comment(&self, comment: CommentRecord) -> StoreResult<()> {
        {
            let mut comments = self.comments.lock().unwrap();
            if comments.iter().any(|c| c.id == comment.id) {
                return Err(StoreError::UniqueViolation {
                    constraint: "comments_pkey".to_string(),
                });
            }
            comments.push(comment.clone());
        }
        self.emit(
            FeedTable::Comments,
            comment.room_id,
            ChangeEvent {
                kind: ChangeKind::Insert,
                row: FeedRow::Comment(comment),
            },
        );
        Ok(())
    }

    async fn comments_for_room(&self, room_id: Uuid) -> StoreResult<Vec<CommentRecord>> {
        let comments = self.comments.lock().unwrap();
        let mut rows: Vec<CommentRecord> = comments
            .iter()
            .filter(|c| c.room_id == room_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn delete_comments_for_room(&self, room_id: Uuid) -> StoreResult<u64> {
        let removed: Vec<CommentRecord> = {
            let mut comments = self.comments.lock().unwrap();
            let (gone, kept): (Vec<_>, Vec<_>) =
                comments.drain(..).partition(|c| c.room_id == room_id);
            *comments = kept;
            gone
        };
        let count = removed.len() as u64;
        for comment in removed {
            self.emit(
                FeedTable::Comments,
                room_id,
                ChangeEvent {
                    kind: ChangeKind::Delete,
                    row: FeedRow::Comment(comment),
                },
            );
        }
        Ok(count)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let mut objects = self.objects.lock().unwrap();
        objects.insert(key.to_string(), data);
        debug!("Uploaded object '{}' to bucket '{}'", key, self.bucket);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://storage.local/{}/{}", self.bucket, key)
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        if self.fail_object_removals.load(Ordering::SeqCst) {
            return Err(AppError::Storage("object removal failed".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, table: FeedTable, room_id: Uuid) -> Result<FeedSubscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(FeedSender {
            table,
            room_id,
            tx,
        });
        Ok(FeedSubscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_record(room_id: Uuid) -> FileRecord {
        FileRecord {
            room_id,
            uploaded_by: Uuid::new_v4(),
            file_name: "notes.pdf".to_string(),
            object_key: format!("rooms/{}/notes/1_notes.pdf", room_id),
            url: "https://storage.local/uploads/x".to_string(),
            size: 42,
            category: crate::backend::records::FileCategory::Notes,
        }
    }

    #[tokio::test]
    async fn test_duplicate_join_code_is_distinguishable() {
        let backend = MemoryBackend::new("uploads");
        let creator = Uuid::new_v4();
        let room = RoomRecord {
            id: Uuid::new_v4(),
            name: "physics".to_string(),
            created_by: creator,
            join_code: "ABC123".to_string(),
        };
        backend.insert_room(room.clone()).await.unwrap();

        let clash = RoomRecord {
            id: Uuid::new_v4(),
            ..room
        };
        match backend.insert_room(clash).await {
            Err(StoreError::UniqueViolation { constraint }) => {
                assert_eq!(constraint, "rooms_join_code_key");
            }
            other => panic!("expected unique violation, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_feed_scoped_to_room_and_table() {
        let backend = MemoryBackend::new("uploads");
        let room_a = Uuid::new_v4();
        let room_b = Uuid::new_v4();

        let mut sub = backend.subscribe(FeedTable::Files, room_a).await.unwrap();

        backend.insert_file(file_record(room_b)).await.unwrap();
        backend.insert_file(file_record(room_a)).await.unwrap();

        let event = sub.next_event().await.expect("event for room A");
        match event.row {
            FeedRow::File(file) => assert_eq!(file.room_id, room_a),
            other => panic!("unexpected row: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let backend = MemoryBackend::new("uploads");
        let room = Uuid::new_v4();

        let sub = backend.subscribe(FeedTable::Files, room).await.unwrap();
        drop(sub);

        backend.insert_file(file_record(room)).await.unwrap();
        assert!(backend.subscribers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_notifies_watchers() {
        let backend = MemoryBackend::new("uploads");
        let mut rx = backend.watch_session();

        backend
            .sign_up(Credentials {
                email: "a@b.c".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        backend.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_idempotent_deletes_report_zero_rows() {
        let backend = MemoryBackend::new("uploads");
        assert_eq!(
            backend.delete_file_by_object_key("missing").await.unwrap(),
            0
        );
        assert_eq!(
            backend
                .delete_memberships_for_room(Uuid::new_v4())
                .await
                .unwrap(),
            0
        );
    }
}
