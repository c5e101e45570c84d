use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::backend::identity::{require_session, IdentityProvider};
use crate::backend::records::CommentRecord;
use crate::backend::store::DataStore;
use crate::core::error::{AppError, Result};
use crate::features::comments::dtos::PostCommentDto;
use crate::features::comments::models::CommentView;
use crate::features::users::ProfileService;

/// Service for posting and listing room comments.
///
/// Comments are never edited; deletion is intentionally not part of the
/// surface.
pub struct CommentService {
    store: Arc<dyn DataStore>,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<ProfileService>,
}

impl CommentService {
    pub fn new(
        store: Arc<dyn DataStore>,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<ProfileService>,
    ) -> Self {
        Self {
            store,
            identity,
            profiles,
        }
    }

    /// Post a comment to a room, returning the enriched view.
    pub async fn post(&self, room_id: Uuid, dto: PostCommentDto) -> Result<CommentView> {
        let content = dto.content.trim().to_string();
        let dto = PostCommentDto { content };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let session = require_session(self.identity.as_ref()).await?;

        let record = CommentRecord {
            id: Uuid::new_v4(),
            room_id,
            user_id: session.user_id,
            content: dto.content,
            created_at: Utc::now(),
        };
        self.store.insert_comment(record.clone()).await?;

        info!("Comment {} posted to room {}", record.id, room_id);

        let username = self.profiles.username_of(record.user_id).await;
        Ok(CommentView::enrich(record, username))
    }

    /// Comments for a room in non-decreasing creation order, with usernames
    /// resolved best-effort.
    pub async fn list(&self, room_id: Uuid) -> Result<Vec<CommentView>> {
        let records = self.store.comments_for_room(room_id).await?;

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let username = self.profiles.username_of(record.user_id).await;
            views.push(CommentView::enrich(record, username));
        }
        Ok(views)
    }
}
