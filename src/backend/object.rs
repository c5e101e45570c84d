use async_trait::async_trait;

use crate::core::error::Result;

/// External object store contract for room file blobs.
///
/// `remove` takes a batch of keys and succeeds for keys that are already
/// absent, which keeps deletion steps retryable.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<()>;

    fn public_url(&self, key: &str) -> String;

    async fn remove(&self, keys: &[String]) -> Result<()>;
}
