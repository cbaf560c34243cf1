use super::defaults::DEFAULT_CONFIG_TEMPLATE;
use super::errors::ConfigError;
use super::migration::migrate_config_if_needed;
use super::models::Config;
use std::path::Path;
use std::sync::Arc;

pub const ENV_BUCKET: &str = "BUCKETSYNC_BUCKET";
pub const ENV_REGION: &str = "BUCKETSYNC_REGION";

impl Config {
    /// Loads configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_file_with_events(path, None).await
    }

    /// Loads configuration from a file with optional event bus for notifications
    pub async fn from_file_with_events<P: AsRef<Path>>(
        path: P,
        events: Option<&Arc<bucketsync_events::EventBus>>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        // Create default config if it doesn't exist
        if !path.exists() {
            create_default_config(path).await?;
        }

        migrate_config_if_needed(path, events).await?;

        let content = tokio::fs::read_to_string(path).await?;
        let mut config = Self::from_toml(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Bucket name and region may be overridden from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_BUCKET).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Bucket name overridden by {}", ENV_BUCKET);
            self.bucket.name = name.trim().to_string();
        }
        if let Some(region) = lookup(ENV_REGION).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Region overridden by {}", ENV_REGION);
            self.bucket.region = region.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("bucket.name must not be empty".to_string()));
        }
        if self.bucket.region.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("bucket.region must not be empty".to_string()));
        }
        if self.sync.source_dir.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("sync.source_dir must not be empty".to_string()));
        }
        if self.storage.local.page_size == 0 {
            return Err(ConfigError::InvalidConfig("storage.local.page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Creates a default configuration file
async fn create_default_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ListMode, StorageBackend};

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG_TEMPLATE).unwrap();

        assert_eq!(config.bucket.name, "bucketsync-test");
        assert_eq!(config.bucket.region, "eu-central-1");
        assert!(config.bucket.public_read);
        assert_eq!(config.sync.source_dir, "files");
        assert_eq!(config.sync.download_dir, ".");
        assert_eq!(config.sync.list_mode, ListMode::All);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert!(!config.storage.s3.has_static_credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml("[bucket]\nname = \"photos\"\n").unwrap();

        assert_eq!(config.bucket.name, "photos");
        assert_eq!(config.bucket.region, "eu-central-1");
        assert_eq!(config.storage.local.page_size, 1000);
    }

    #[test]
    fn test_list_mode_and_backend_values() {
        let config = Config::from_toml(
            "[sync]\nlist_mode = \"first_page\"\n[storage]\nbackend = \"local\"\n",
        )
        .unwrap();

        assert_eq!(config.sync.list_mode, ListMode::FirstPage);
        assert_eq!(config.storage.backend, StorageBackend::Local);

        assert!(Config::from_toml("[sync]\nlist_mode = \"some\"\n").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            ENV_BUCKET => Some("override-bucket".to_string()),
            ENV_REGION => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.bucket.name, "override-bucket");
        // blank values are ignored
        assert_eq!(config.bucket.region, "eu-central-1");
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let mut config = Config::default();
        config.bucket.name = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

        let mut config = Config::default();
        config.storage.local.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_from_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucketsync.toml");

        let config = Config::from_file(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(config.sync.source_dir, "files");
    }

    #[tokio::test]
    async fn test_from_file_reports_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucketsync.toml");
        tokio::fs::write(&path, "[storage.local]\npage_size = 0\n").await.unwrap();

        let err = Config::from_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucketsync.toml");
        tokio::fs::write(&path, "[sync]\nlist_mode = \"sometimes\"\n").await.unwrap();

        let err = Config::from_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseError(_)));
    }
}
