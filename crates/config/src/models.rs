use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "super::defaults::bucket_settings")]
    pub bucket: BucketSettings,
    #[serde(default = "super::defaults::sync_settings")]
    pub sync: SyncSettings,
    #[serde(default = "super::defaults::storage_settings")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketSettings {
    #[serde(default = "super::defaults::bucket_name")]
    pub name: String,
    #[serde(default = "super::defaults::region")]
    pub region: String,
    /// Apply the public-read canned ACL to uploaded objects
    #[serde(default = "super::defaults::public_read")]
    pub public_read: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    #[serde(default = "super::defaults::source_dir")]
    pub source_dir: String,
    #[serde(default = "super::defaults::download_dir")]
    pub download_dir: String,
    #[serde(default = "super::defaults::list_mode")]
    pub list_mode: ListMode,
}

/// How much of the bucket listing drives the download/delete phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// Follow continuation tokens until the listing is exhausted
    All,
    /// Only the first page returned by the service
    FirstPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "super::defaults::storage_backend")]
    pub backend: StorageBackend,
    #[serde(default = "super::defaults::s3_settings")]
    pub s3: S3Settings,
    #[serde(default = "super::defaults::local_settings")]
    pub local: LocalSettings,
}

/// Empty strings defer to the SDK's environment resolution
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct S3Settings {
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3Settings {
    pub fn has_static_credentials(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalSettings {
    #[serde(default = "super::defaults::local_root")]
    pub root: String,
    #[serde(default = "super::defaults::local_owner")]
    pub owner: String,
    #[serde(default = "super::defaults::local_page_size")]
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: super::defaults::bucket_settings(),
            sync: super::defaults::sync_settings(),
            storage: super::defaults::storage_settings(),
        }
    }
}
