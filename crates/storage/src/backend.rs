use crate::{BucketDescriptor, BucketStatus, ObjectPage, PutOptions, StorageError};
use bytes::Bytes;

/// Object-storage operations needed by a sync run
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create the bucket. An existing bucket owned by the caller is
    /// `Ok(BucketStatus::AlreadyOwned)`; one owned by someone else is
    /// `Err(StorageError::BucketNameTaken)`.
    async fn create_bucket(&self, bucket: &BucketDescriptor) -> Result<BucketStatus, StorageError>;

    /// Store `body` under `key`, replacing any existing object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> Result<(), StorageError>;

    /// Fetch a single page of keys, starting after `continuation`
    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StorageError>;

    /// Fetch the full payload of an object
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;
}
