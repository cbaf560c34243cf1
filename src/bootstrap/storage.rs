use bucketsync_config::{Config, StorageBackend as StorageBackendType};
use bucketsync_storage::{LocalBackend, StorageBackend};
#[cfg(feature = "s3")]
use bucketsync_storage::{S3Backend, S3ClientOptions};
use anyhow::Result;
use std::sync::Arc;

pub async fn initialize(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    match config.storage.backend {
        StorageBackendType::Local => {
            let local = &config.storage.local;
            let backend = LocalBackend::new(
                std::path::PathBuf::from(&local.root),
                local.owner.clone(),
                local.page_size,
            );

            tracing::info!("Initialized local storage backend: root={}", local.root);

            Ok(Arc::new(backend) as Arc<dyn StorageBackend>)
        }
        #[cfg(feature = "s3")]
        StorageBackendType::S3 => {
            let s3 = &config.storage.s3;
            let options = S3ClientOptions {
                endpoint_url: s3.endpoint_url.clone(),
                access_key_id: s3.access_key_id.clone(),
                secret_access_key: s3.secret_access_key.clone(),
                force_path_style: s3.force_path_style,
            };

            let backend = S3Backend::new(config.bucket.region.clone(), options).await?;

            tracing::info!(
                "Initialized S3 storage backend: region={}, endpoint={}, static_credentials={}",
                config.bucket.region,
                if s3.endpoint_url.is_empty() { "default" } else { s3.endpoint_url.as_str() },
                s3.has_static_credentials()
            );

            Ok(Arc::new(backend) as Arc<dyn StorageBackend>)
        }
        #[cfg(not(feature = "s3"))]
        StorageBackendType::S3 => {
            anyhow::bail!(
                "S3 backend selected but not compiled. Rebuild with --features s3 to enable S3 support."
            )
        }
    }
}
