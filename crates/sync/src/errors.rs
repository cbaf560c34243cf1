use bucketsync_filesystem::FileSystemError;
use bucketsync_storage::StorageError;
use thiserror::Error;

/// Every variant is fatal to a run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Bucket name '{0}' already exists and is owned by another account")]
    NameConflict(String),

    #[error("Local I/O error: {0}")]
    LocalIo(#[from] FileSystemError),

    #[error("Storage service error: {0}")]
    Service(StorageError),
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BucketNameTaken(bucket) => SyncError::NameConflict(bucket),
            other => SyncError::Service(other),
        }
    }
}
