use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::backend::feed::{ChangeFeed, ChangeKind, FeedRow, FeedTable};
use crate::backend::records::FileRecord;
use crate::core::error::Result;
use crate::features::comments::models::CommentView;
use crate::features::comments::CommentService;
use crate::features::files::FileService;
use crate::features::realtime::reconciler::RoomView;
use crate::features::users::ProfileService;

/// Scoped realtime replica of one open room.
///
/// Opening subscribes to the file and comment feeds for the room and pumps
/// pushed changes into the shared [`RoomView`]. Dropping the value aborts the
/// pump and releases both subscriptions, so events arriving after the screen
/// is left are discarded instead of being applied to a stale view.
pub struct LiveRoom {
    room_id: Uuid,
    view: Arc<RwLock<RoomView>>,
    pump: JoinHandle<()>,
}

impl LiveRoom {
    pub async fn open(
        room_id: Uuid,
        feed: Arc<dyn ChangeFeed>,
        profiles: Arc<ProfileService>,
    ) -> Result<Self> {
        let mut files_sub = feed.subscribe(FeedTable::Files, room_id).await?;
        let mut comments_sub = feed.subscribe(FeedTable::Comments, room_id).await?;

        let view = Arc::new(RwLock::new(RoomView::new()));
        let pump_view = Arc::clone(&view);

        let pump = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = files_sub.next_event() => match event {
                        Some(event) => {
                            if let FeedRow::File(file) = event.row {
                                pump_view.write().await.apply_file(event.kind, file);
                            }
                        }
                        None => break,
                    },
                    event = comments_sub.next_event() => match event {
                        Some(event) => {
                            if let FeedRow::Comment(record) = event.row {
                                // Enrich before merging; a failed lookup falls
                                // back to the placeholder and never blocks
                                let username = profiles.username_of(record.user_id).await;
                                pump_view
                                    .write()
                                    .await
                                    .apply_comment(event.kind, CommentView::enrich(record, username));
                            }
                        }
                        None => break,
                    },
                }
            }
            debug!("Change feed pump for room {} stopped", room_id);
        });

        Ok(Self {
            room_id,
            view,
            pump,
        })
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    /// Seed the replica from the store.
    ///
    /// Both lists are fetched concurrently and merged through the keyed
    /// reconciler, so feed echoes that already landed are absorbed rather
    /// than duplicated.
    pub async fn load(&self, files: &FileService, comments: &CommentService) -> Result<()> {
        let (file_rows, comment_rows) = futures::future::try_join(
            files.list(self.room_id),
            comments.list(self.room_id),
        )
        .await?;

        let mut view = self.view.write().await;
        for file in file_rows {
            view.apply_file(ChangeKind::Insert, file);
        }
        for comment in comment_rows {
            view.apply_comment(ChangeKind::Insert, comment);
        }
        Ok(())
    }

    /// Merge a locally-initiated file mutation (optimistic update)
    pub async fn apply_local_file(&self, kind: ChangeKind, file: FileRecord) {
        self.view.write().await.apply_file(kind, file);
    }

    /// Merge a locally-initiated comment mutation (optimistic update)
    pub async fn apply_local_comment(&self, kind: ChangeKind, comment: CommentView) {
        self.view.write().await.apply_comment(kind, comment);
    }

    pub async fn snapshot(&self) -> RoomView {
        self.view.read().await.clone()
    }
}

impl Drop for LiveRoom {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
