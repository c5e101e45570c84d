use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::identity::{require_session, IdentityProvider};
use crate::backend::object::ObjectStore;
use crate::backend::records::{FileCategory, FileRecord};
use crate::backend::store::DataStore;
use crate::core::error::{AppError, Result};

/// Service for room file uploads and deletion.
///
/// A file's blob and its row always travel together: an upload whose row
/// insert fails rolls the blob back, and deletion removes the blob before the
/// row so a retry never leaves an orphan in either place.
pub struct FileService {
    store: Arc<dyn DataStore>,
    objects: Arc<dyn ObjectStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl FileService {
    pub fn new(
        store: Arc<dyn DataStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            objects,
            identity,
        }
    }

    /// Upload a file into a room.
    ///
    /// # Arguments
    /// * `room_id` - The room the file belongs to
    /// * `file_name` - The original file name
    /// * `data` - The file content as bytes
    /// * `category` - Which shelf the file is filed under
    pub async fn upload(
        &self,
        room_id: Uuid,
        file_name: &str,
        data: Vec<u8>,
        category: FileCategory,
    ) -> Result<FileRecord> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(AppError::Validation("File name cannot be empty".to_string()));
        }

        let session = require_session(self.identity.as_ref()).await?;

        let object_key = format!(
            "rooms/{}/{}/{}_{}",
            room_id,
            category.as_str(),
            Utc::now().timestamp_millis(),
            file_name
        );
        let size = data.len() as i64;

        self.objects.upload(&object_key, data).await?;
        debug!("Uploaded blob '{}'", object_key);

        let record = FileRecord {
            room_id,
            uploaded_by: session.user_id,
            file_name: file_name.to_string(),
            object_key: object_key.clone(),
            url: self.objects.public_url(&object_key),
            size,
            category,
        };

        if let Err(e) = self.store.insert_file(record.clone()).await {
            // Roll the blob back so a failed insert leaves no orphan
            if let Err(cleanup) = self.objects.remove(&[object_key.clone()]).await {
                warn!(
                    "Could not remove blob '{}' after failed insert: {}",
                    object_key, cleanup
                );
            }
            return Err(e.into());
        }

        info!(
            "File '{}' ({} bytes) uploaded to room {} by {}",
            record.file_name, record.size, room_id, record.uploaded_by
        );
        Ok(record)
    }

    /// Delete a file. Only the uploader may delete; blob first, then row.
    pub async fn delete(&self, file: &FileRecord) -> Result<()> {
        let session = require_session(self.identity.as_ref()).await?;

        if file.uploaded_by != session.user_id {
            return Err(AppError::Forbidden(
                "Only the uploader can delete this file".to_string(),
            ));
        }

        self.objects.remove(&[file.object_key.clone()]).await?;
        self.store
            .delete_file_by_object_key(&file.object_key)
            .await?;

        info!("File '{}' deleted from room {}", file.file_name, file.room_id);
        Ok(())
    }

    pub async fn list(&self, room_id: Uuid) -> Result<Vec<FileRecord>> {
        Ok(self.store.files_for_room(room_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::identity::Credentials;
    use crate::backend::memory::MemoryBackend;

    fn service(backend: &Arc<MemoryBackend>) -> FileService {
        FileService::new(backend.clone(), backend.clone(), backend.clone())
    }

    async fn sign_up(backend: &MemoryBackend, email: &str) -> Uuid {
        backend
            .sign_up(Credentials {
                email: email.to_string(),
                password: "hunter2222".to_string(),
            })
            .await
            .unwrap()
            .user_id
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_row() {
        let backend = Arc::new(MemoryBackend::new("uploads"));
        let uploader = sign_up(&backend, "a@example.com").await;
        let files = service(&backend);
        let room_id = Uuid::new_v4();

        let record = files
            .upload(room_id, "homework.pdf", vec![1, 2, 3], FileCategory::Assignment)
            .await
            .unwrap();

        assert_eq!(record.uploaded_by, uploader);
        assert_eq!(record.size, 3);
        assert!(record.object_key.contains("assignment"));
        assert!(record.url.ends_with(&record.object_key));
        assert_eq!(backend.object_keys(), vec![record.object_key.clone()]);
        assert_eq!(files.list(room_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_blank_name() {
        let backend = Arc::new(MemoryBackend::new("uploads"));
        sign_up(&backend, "a@example.com").await;
        let files = service(&backend);

        let result = files
            .upload(Uuid::new_v4(), "   ", vec![1], FileCategory::Notes)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(backend.object_keys().is_empty());
    }

    #[tokio::test]
    async fn test_only_uploader_may_delete() {
        let backend = Arc::new(MemoryBackend::new("uploads"));
        sign_up(&backend, "a@example.com").await;
        let files = service(&backend);
        let record = files
            .upload(Uuid::new_v4(), "notes.md", vec![1], FileCategory::Notes)
            .await
            .unwrap();

        sign_up(&backend, "b@example.com").await;
        let result = files.delete(&record).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(backend.object_keys().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_blob_and_row() {
        let backend = Arc::new(MemoryBackend::new("uploads"));
        sign_up(&backend, "a@example.com").await;
        let files = service(&backend);
        let room_id = Uuid::new_v4();
        let record = files
            .upload(room_id, "notes.md", vec![1], FileCategory::Notes)
            .await
            .unwrap();

        files.delete(&record).await.unwrap();
        assert!(backend.object_keys().is_empty());
        assert!(files.list(room_id).await.unwrap().is_empty());

        // Second delete of the same file is a no-op
        files.delete(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_surfaces_storage_failure_before_row_delete() {
        let backend = Arc::new(MemoryBackend::new("uploads"));
        sign_up(&backend, "a@example.com").await;
        let files = service(&backend);
        let room_id = Uuid::new_v4();
        let record = files
            .upload(room_id, "notes.md", vec![1], FileCategory::Notes)
            .await
            .unwrap();

        backend.set_fail_object_removals(true);
        let result = files.delete(&record).await;
        assert!(matches!(result, Err(AppError::Storage(_))));

        // Row survives, so a retry can still find the blob reference
        assert_eq!(files.list(room_id).await.unwrap().len(), 1);

        backend.set_fail_object_removals(false);
        files.delete(&record).await.unwrap();
        assert!(files.list(room_id).await.unwrap().is_empty());
    }
}
