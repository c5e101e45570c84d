//! Dependency wiring.
//!
//! The context owns one instance of every service, all sharing the same four
//! backend ports. Swapping the backend (in-memory for tests, a hosted BaaS in
//! production) happens here and nowhere else.

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::feed::ChangeFeed;
use crate::backend::identity::IdentityProvider;
use crate::backend::memory::MemoryBackend;
use crate::backend::object::ObjectStore;
use crate::backend::store::DataStore;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::features::auth::SessionController;
use crate::features::comments::CommentService;
use crate::features::files::FileService;
use crate::features::realtime::LiveRoom;
use crate::features::rooms::{JoinCodeAllocator, RandomCodeGenerator, RoomService};
use crate::features::users::ProfileService;
use crate::modules::navlog::RoomNavlog;

pub struct AppContext {
    config: Config,
    identity: Arc<dyn IdentityProvider>,
    feed: Arc<dyn ChangeFeed>,
    pub profiles: Arc<ProfileService>,
    pub rooms: RoomService,
    pub files: FileService,
    pub comments: CommentService,
}

impl AppContext {
    /// Wire all services onto a concrete backend.
    pub fn wire(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DataStore>,
        objects: Arc<dyn ObjectStore>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        let profiles = Arc::new(ProfileService::new(store.clone(), identity.clone()));
        let allocator = JoinCodeAllocator::new(store.clone(), Arc::new(RandomCodeGenerator));
        let rooms = RoomService::new(
            store.clone(),
            objects.clone(),
            identity.clone(),
            allocator,
        );
        let files = FileService::new(store.clone(), objects, identity.clone());
        let comments = CommentService::new(store, identity.clone(), profiles.clone());

        Self {
            config,
            identity,
            feed,
            profiles,
            rooms,
            files,
            comments,
        }
    }

    /// Context backed entirely by an in-process backend.
    pub fn in_memory(config: Config) -> Self {
        let backend = Arc::new(MemoryBackend::new(config.storage.bucket.clone()));
        Self::wire(
            config,
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the session controller with the navlog from the configured path.
    pub fn controller(&self) -> SessionController {
        let navlog = RoomNavlog::load(self.config.navlog.path.clone());
        SessionController::new(self.identity.clone(), self.profiles.clone(), navlog)
    }

    /// Open a realtime replica for one room.
    pub async fn open_room(&self, room_id: Uuid) -> Result<LiveRoom> {
        LiveRoom::open(room_id, self.feed.clone(), self.profiles.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{NavlogConfig, StorageConfig};
    use crate::features::auth::{Routing, Screen};
    use crate::features::comments::dtos::PostCommentDto;
    use crate::features::rooms::dtos::{CreateRoomDto, JoinRoomDto};
    use crate::features::users::dtos::SetUsernameDto;
    use crate::backend::identity::IdentityProvider;
    use crate::backend::records::FileCategory;
    use crate::backend::store::DataStore;
    use crate::shared::test_helpers::fake_credentials;

    fn test_config() -> Config {
        Config {
            storage: StorageConfig {
                bucket: "uploads".to_string(),
            },
            navlog: NavlogConfig {
                path: std::env::temp_dir().join(format!("navlog-{}.json", Uuid::new_v4())),
            },
        }
    }

    fn memory_context() -> (AppContext, Arc<MemoryBackend>) {
        let config = test_config();
        let backend = Arc::new(MemoryBackend::new(config.storage.bucket.clone()));
        let ctx = AppContext::wire(
            config,
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
        );
        (ctx, backend)
    }

    async fn signed_up_user(
        ctx: &AppContext,
        backend: &MemoryBackend,
        username: &str,
    ) -> (Uuid, crate::backend::identity::Credentials) {
        let creds = fake_credentials();
        let session = backend.sign_up(creds.clone()).await.unwrap();
        ctx.profiles
            .set_username(SetUsernameDto {
                username: username.to_string(),
            })
            .await
            .unwrap();
        (session.user_id, creds)
    }

    #[tokio::test]
    async fn test_room_deletion_cascade_clears_everything() {
        let (ctx, backend) = memory_context();
        let mut ctrl = ctx.controller();
        ctrl.bootstrap().await;

        // Creator sets up a room with content and a member
        let (creator, creator_creds) = signed_up_user(&ctx, &backend, "alice").await;
        let room = ctx
            .rooms
            .create_room(CreateRoomDto {
                name: "Physics".to_string(),
            })
            .await
            .unwrap();
        ctrl.apply_session(backend.current_session().await.unwrap())
            .await;
        ctrl.record_room_created(room.id);

        ctx.files
            .upload(room.id, "syllabus.pdf", vec![1, 2], FileCategory::Assignment)
            .await
            .unwrap();
        ctx.files
            .upload(room.id, "notes.md", vec![3], FileCategory::Notes)
            .await
            .unwrap();
        for content in ["first", "second", "third"] {
            ctx.comments
                .post(
                    room.id,
                    PostCommentDto {
                        content: content.to_string(),
                    },
                )
                .await
                .unwrap();
        }

        // Second account joins by code, then the creator returns
        backend.sign_out().await.unwrap();
        let (member, _) = signed_up_user(&ctx, &backend, "bob").await;
        ctx.rooms
            .join_room(JoinRoomDto {
                join_code: room.join_code.clone(),
            })
            .await
            .unwrap();
        backend.sign_out().await.unwrap();
        backend.sign_in(creator_creds).await.unwrap();

        ctx.rooms.delete_room(room.id).await.unwrap();
        ctrl.record_room_deleted(room.id);

        // Every row and blob tied to the room is gone
        assert!(backend.object_keys().is_empty());
        assert!(backend.files_for_room(room.id).await.unwrap().is_empty());
        assert!(backend.comments_for_room(room.id).await.unwrap().is_empty());
        assert!(backend
            .room_by_join_code(&room.join_code)
            .await
            .unwrap()
            .is_none());
        assert!(backend
            .memberships_for_user(member)
            .await
            .unwrap()
            .is_empty());
        assert!(backend.rooms_created_by(creator).await.unwrap().is_empty());

        // Back navigation into the dead room is rerouted
        let routing = ctrl.evaluate(Screen::Room(room.id));
        assert_eq!(routing.back_intercept, Some(Screen::Dashboard));
    }

    #[tokio::test]
    async fn test_open_room_sees_uploads_from_context_services() {
        let (ctx, backend) = memory_context();
        signed_up_user(&ctx, &backend, "alice").await;
        let room = ctx
            .rooms
            .create_room(CreateRoomDto {
                name: "Chemistry".to_string(),
            })
            .await
            .unwrap();

        let live = ctx.open_room(room.id).await.unwrap();
        ctx.files
            .upload(room.id, "lab.pdf", vec![9], FileCategory::Assignment)
            .await
            .unwrap();

        crate::shared::test_helpers::eventually(|| async {
            live.snapshot().await.files().len() == 1
        })
        .await;
    }

    #[tokio::test]
    async fn test_in_memory_context_guards_until_sign_in() {
        let ctx = AppContext::in_memory(test_config());
        let mut ctrl = ctx.controller();
        ctrl.bootstrap().await;

        assert_eq!(
            ctrl.evaluate(Screen::Dashboard).action,
            Routing::redirect(Screen::SignIn).action
        );
    }
}
