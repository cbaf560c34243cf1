use crate::backend::StorageBackend;
use crate::{BucketDescriptor, BucketStatus, ObjectPage, PutOptions, StorageError};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Marker file recording which account created a bucket directory
const OWNER_MARKER: &str = ".bucketsync-owner";

/// Directory-backed storage: each bucket is a sub-directory of `root`
/// and each object a file inside it.
pub struct LocalBackend {
    root: PathBuf,
    owner: String,
    page_size: usize,
}

impl LocalBackend {
    pub fn new(root: PathBuf, owner: String, page_size: usize) -> Self {
        Self {
            root,
            owner,
            page_size: page_size.max(1),
        }
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        if !is_single_segment(bucket) {
            return Err(StorageError::ConfigError(format!("invalid bucket name '{}'", bucket)));
        }
        Ok(self.root.join(bucket))
    }

    async fn existing_bucket_dir(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        let dir = self.bucket_dir(bucket)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StorageError::NoSuchBucket(bucket.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NoSuchBucket(bucket.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        if !is_single_segment(key) || key == OWNER_MARKER {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.existing_bucket_dir(bucket).await?.join(key))
    }
}

fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.is_empty()
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
}

#[async_trait::async_trait]
impl StorageBackend for LocalBackend {
    async fn create_bucket(&self, bucket: &BucketDescriptor) -> Result<BucketStatus, StorageError> {
        let dir = self.bucket_dir(&bucket.name)?;
        let marker = dir.join(OWNER_MARKER);

        if dir.exists() {
            let owner = match tokio::fs::read_to_string(&marker).await {
                Ok(owner) => owner,
                Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
                Err(e) => return Err(e.into()),
            };

            return if owner.trim() == self.owner {
                Ok(BucketStatus::AlreadyOwned)
            } else {
                Err(StorageError::BucketNameTaken(bucket.name.clone()))
            };
        }

        tracing::debug!(
            "Creating local bucket {} at {} (region {} is not used locally)",
            bucket.name,
            dir.display(),
            bucket.region
        );

        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(&marker, &self.owner).await?;

        Ok(BucketStatus::Created)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key).await?;

        tracing::debug!(
            "Writing {} ({} bytes, public_read={}) to local bucket {}",
            key,
            body.len(),
            options.public_read,
            bucket
        );

        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), e.to_string()))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StorageError> {
        let dir = self.existing_bucket_dir(bucket).await?;

        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::ListError(bucket.to_string(), e.to_string()))?;
        let mut keys = Vec::new();

        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| StorageError::ListError(bucket.to_string(), e.to_string()))?
        {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name != OWNER_MARKER {
                keys.push(name);
            }
        }

        keys.sort();

        let mut remaining: Vec<String> = match continuation.as_deref() {
            Some(token) => keys.into_iter().filter(|k| k.as_str() > token).collect(),
            None => keys,
        };

        let next_token = if remaining.len() > self.page_size {
            remaining.truncate(self.page_size);
            remaining.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage {
            keys: remaining,
            next_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(bucket, key).await?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::ObjectNotFound(key.to_string())),
            Err(e) => Err(StorageError::DownloadError(key.to_string(), e.to_string())),
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key).await?;

        // Deleting a missing key succeeds, as DeleteObject does
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteError(key.to_string(), e.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
