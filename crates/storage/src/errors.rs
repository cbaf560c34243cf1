use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "s3")]
    #[error("S3 SDK error: {0}")]
    S3SdkError(String),

    #[error("Bucket name '{0}' is already in use by another account")]
    BucketNameTaken(String),

    #[error("Bucket creation failed for '{0}': {1}")]
    CreateBucketError(String, String),

    #[error("Bucket not found: {0}")]
    NoSuchBucket(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Upload failed for '{0}': {1}")]
    UploadError(String, String),

    #[error("Listing failed for bucket '{0}': {1}")]
    ListError(String, String),

    #[error("Download failed for '{0}': {1}")]
    DownloadError(String, String),

    #[error("Delete failed for '{0}': {1}")]
    DeleteError(String, String),

    #[error("Invalid storage configuration: {0}")]
    ConfigError(String),
}
