//! Idempotent merge of local and remote mutations into one room replica.
//!
//! Every change, whether this client initiated it or the change feed pushed
//! it, goes through the same keyed merge: files by object key, comments by
//! id. A local optimistic insert and its feed echo therefore collapse into
//! one entry no matter the arrival order, and duplicate deletes are no-ops.

use crate::backend::feed::ChangeKind;
use crate::backend::records::FileRecord;
use crate::features::comments::models::CommentView;

/// Local replica of one room's files and comments
#[derive(Debug, Clone, Default)]
pub struct RoomView {
    files: Vec<FileRecord>,
    comments: Vec<CommentView>,
}

impl RoomView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Comments in non-decreasing creation order
    pub fn comments(&self) -> &[CommentView] {
        &self.comments
    }

    pub fn apply_file(&mut self, kind: ChangeKind, file: FileRecord) {
        match kind {
            ChangeKind::Insert => {
                if !self.files.iter().any(|f| f.object_key == file.object_key) {
                    self.files.push(file);
                }
            }
            ChangeKind::Update => {
                if let Some(existing) = self
                    .files
                    .iter_mut()
                    .find(|f| f.object_key == file.object_key)
                {
                    *existing = file;
                }
            }
            ChangeKind::Delete => {
                self.files.retain(|f| f.object_key != file.object_key);
            }
        }
    }

    pub fn apply_comment(&mut self, kind: ChangeKind, comment: CommentView) {
        match kind {
            ChangeKind::Insert => {
                if !self.comments.iter().any(|c| c.id == comment.id) {
                    self.comments.push(comment);
                    self.resort_comments();
                }
            }
            ChangeKind::Update => {
                if let Some(existing) = self.comments.iter_mut().find(|c| c.id == comment.id) {
                    *existing = comment;
                    self.resort_comments();
                }
            }
            ChangeKind::Delete => {
                self.comments.retain(|c| c.id != comment.id);
            }
        }
    }

    // Append-then-resort: a late echo of an older comment lands in position
    fn resort_comments(&mut self) {
        self.comments
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::records::FileCategory;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn file(key: &str) -> FileRecord {
        FileRecord {
            room_id: Uuid::new_v4(),
            uploaded_by: Uuid::new_v4(),
            file_name: key.to_string(),
            object_key: key.to_string(),
            url: format!("https://storage.local/uploads/{}", key),
            size: 1,
            category: FileCategory::Notes,
        }
    }

    fn comment(id: Uuid, offset_secs: i64, content: &str) -> CommentView {
        CommentView {
            id,
            room_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_file_insert_is_idempotent() {
        let mut view = RoomView::new();
        view.apply_file(ChangeKind::Insert, file("a"));
        view.apply_file(ChangeKind::Insert, file("a"));
        assert_eq!(view.files().len(), 1);
    }

    #[test]
    fn test_file_delete_is_idempotent() {
        let mut view = RoomView::new();
        view.apply_file(ChangeKind::Insert, file("a"));
        view.apply_file(ChangeKind::Delete, file("a"));
        view.apply_file(ChangeKind::Delete, file("a"));
        assert!(view.files().is_empty());
    }

    #[test]
    fn test_file_update_replaces_by_key() {
        let mut view = RoomView::new();
        view.apply_file(ChangeKind::Insert, file("a"));

        let mut renamed = file("a");
        renamed.file_name = "renamed.md".to_string();
        view.apply_file(ChangeKind::Update, renamed);

        assert_eq!(view.files()[0].file_name, "renamed.md");
        assert_eq!(view.files().len(), 1);

        // Update for an unknown key is ignored, not inserted
        view.apply_file(ChangeKind::Update, file("b"));
        assert_eq!(view.files().len(), 1);
    }

    #[test]
    fn test_local_insert_and_echo_commute() {
        // Same pair of events in both orders ends in the same state
        let mut local_first = RoomView::new();
        local_first.apply_file(ChangeKind::Insert, file("a"));
        local_first.apply_file(ChangeKind::Insert, file("a")); // echo

        let mut echo_first = RoomView::new();
        echo_first.apply_file(ChangeKind::Insert, file("a")); // echo
        echo_first.apply_file(ChangeKind::Insert, file("a"));

        assert_eq!(local_first.files(), echo_first.files());
        assert_eq!(local_first.files().len(), 1);
    }

    #[test]
    fn test_interleaved_insert_delete_sequences_converge() {
        // Final state must match the last effective event per key
        let mut view = RoomView::new();
        view.apply_file(ChangeKind::Insert, file("a"));
        view.apply_file(ChangeKind::Insert, file("b"));
        view.apply_file(ChangeKind::Delete, file("a"));
        view.apply_file(ChangeKind::Insert, file("a")); // re-upload
        view.apply_file(ChangeKind::Delete, file("b"));
        view.apply_file(ChangeKind::Delete, file("b")); // duplicate echo

        let keys: Vec<&str> = view.files().iter().map(|f| f.object_key.as_str()).collect();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn test_comment_double_add_is_deduplicated() {
        let id = Uuid::new_v4();
        let mut view = RoomView::new();
        view.apply_comment(ChangeKind::Insert, comment(id, 0, "hi"));
        view.apply_comment(ChangeKind::Insert, comment(id, 0, "hi"));
        assert_eq!(view.comments().len(), 1);
    }

    #[test]
    fn test_late_arriving_older_comment_lands_in_position() {
        let mut view = RoomView::new();
        view.apply_comment(ChangeKind::Insert, comment(Uuid::new_v4(), 10, "newer"));
        view.apply_comment(ChangeKind::Insert, comment(Uuid::new_v4(), 0, "older"));

        let contents: Vec<&str> = view.comments().iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["older", "newer"]);
    }

    #[test]
    fn test_comment_delete_unknown_id_is_noop() {
        let mut view = RoomView::new();
        view.apply_comment(ChangeKind::Insert, comment(Uuid::new_v4(), 0, "hi"));
        view.apply_comment(ChangeKind::Delete, comment(Uuid::new_v4(), 0, "other"));
        assert_eq!(view.comments().len(), 1);
    }
}
