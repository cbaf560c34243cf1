use crate::backend::StorageBackend;
use crate::{BucketDescriptor, BucketStatus, ObjectPage, PutOptions, StorageError};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl};
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;

/// Region that rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings beyond the region. Empty values defer to the SDK's
/// environment resolution.
#[derive(Debug, Clone, Default)]
pub struct S3ClientOptions {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub force_path_style: bool,
}

/// S3-compatible storage backend
/// Compatible with: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces, etc.
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    pub async fn new(region: String, options: S3ClientOptions) -> Result<Self, StorageError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));

        match (options.access_key_id.is_empty(), options.secret_access_key.is_empty()) {
            (false, false) => {
                let credentials = Credentials::new(
                    options.access_key_id,
                    options.secret_access_key,
                    None,
                    None,
                    "bucketsync-static",
                );
                loader = loader.credentials_provider(credentials);
            }
            (true, true) => {
                tracing::debug!("Using credentials from the environment");
            }
            _ => {
                return Err(StorageError::ConfigError(
                    "access_key_id and secret_access_key must be set together".to_string(),
                ));
            }
        }

        if !options.endpoint_url.is_empty() {
            loader = loader.endpoint_url(options.endpoint_url);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(options.force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }
}

/// `us-east-1` must be requested without a location constraint
fn location_constraint(region: &str) -> Option<BucketLocationConstraint> {
    if region == DEFAULT_REGION {
        None
    } else {
        Some(BucketLocationConstraint::from(region))
    }
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
    async fn create_bucket(&self, bucket: &BucketDescriptor) -> Result<BucketStatus, StorageError> {
        tracing::info!("Creating S3 bucket {} in {}", bucket.name, bucket.region);

        let mut request = self.client.create_bucket().bucket(&bucket.name);
        if let Some(constraint) = location_constraint(&bucket.region) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(BucketStatus::Created),
            Err(err) => match err.as_service_error() {
                Some(e) if e.is_bucket_already_owned_by_you() => Ok(BucketStatus::AlreadyOwned),
                Some(e) if e.is_bucket_already_exists() => {
                    Err(StorageError::BucketNameTaken(bucket.name.clone()))
                }
                _ => Err(StorageError::CreateBucketError(
                    bucket.name.clone(),
                    DisplayErrorContext(&err).to_string(),
                )),
            },
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        options: &PutOptions,
    ) -> Result<(), StorageError> {
        tracing::info!("Uploading {} to S3 bucket {}", key, bucket);

        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        if options.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }
        if let Some(content_type) = &options.content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), DisplayErrorContext(&e).to_string()))?;

        tracing::info!("Upload complete: {}", key);
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| StorageError::ListError(bucket.to_string(), DisplayErrorContext(&e).to_string()))?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();

        let next_token = if output.is_truncated() == Some(true) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage { keys, next_token })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        tracing::info!("Downloading {} from S3 bucket {}", key, bucket);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(e) if e.is_no_such_key() => StorageError::ObjectNotFound(key.to_string()),
                _ => StorageError::DownloadError(key.to_string(), DisplayErrorContext(&err).to_string()),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3SdkError(e.to_string()))?;

        Ok(data.into_bytes())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        tracing::info!("Deleting {} from S3 bucket {}", key, bucket);

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteError(key.to_string(), DisplayErrorContext(&e).to_string()))?;

        tracing::info!("Delete complete: {}", key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
