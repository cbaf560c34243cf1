/// Default values for configuration fields

pub fn bucket_name() -> String {
    "bucketsync-test".to_string()
}

pub fn region() -> String {
    "eu-central-1".to_string()
}

pub fn public_read() -> bool {
    true
}

pub fn bucket_settings() -> super::models::BucketSettings {
    super::models::BucketSettings {
        name: bucket_name(),
        region: region(),
        public_read: public_read(),
    }
}

pub fn source_dir() -> String {
    "files".to_string()
}

pub fn download_dir() -> String {
    ".".to_string()  // process working directory
}

pub fn list_mode() -> super::models::ListMode {
    super::models::ListMode::All
}

pub fn sync_settings() -> super::models::SyncSettings {
    super::models::SyncSettings {
        source_dir: source_dir(),
        download_dir: download_dir(),
        list_mode: list_mode(),
    }
}

// Storage defaults
pub fn storage_backend() -> super::models::StorageBackend {
    super::models::StorageBackend::S3
}

pub fn s3_settings() -> super::models::S3Settings {
    super::models::S3Settings::default()
}

pub fn local_root() -> String {
    "bucketsync-local".to_string()
}

pub fn local_owner() -> String {
    "local".to_string()
}

pub fn local_page_size() -> usize {
    1000  // same page size as ListObjectsV2
}

pub fn local_settings() -> super::models::LocalSettings {
    super::models::LocalSettings {
        root: local_root(),
        owner: local_owner(),
        page_size: local_page_size(),
    }
}

pub fn storage_settings() -> super::models::StorageSettings {
    super::models::StorageSettings {
        backend: storage_backend(),
        s3: s3_settings(),
        local: local_settings(),
    }
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# BucketSync Configuration
# ===============================================================================

[bucket]
name = "bucketsync-test"             # Bucket to create, fill and drain
region = "eu-central-1"              # Region the bucket is created in
public_read = true                   # Upload objects with the public-read ACL

[sync]
source_dir = "files"                 # Directory whose regular files are uploaded (not recursive)
download_dir = "."                   # Where downloaded objects are written ("." = working directory)
list_mode = "all"                    # "all" = follow every listing page | "first_page" = first page only

# ===============================================================================
# STORAGE BACKEND
# ===============================================================================
[storage]
backend = "s3"                       # Storage backend: "s3" or "local"

# S3 Configuration (only used if backend = "s3")
[storage.s3]
endpoint_url = ""                    # Custom endpoint for S3-compatible services (empty = AWS)
access_key_id = ""                   # Empty = credentials from the environment
secret_access_key = ""               # Empty = credentials from the environment
force_path_style = false             # Path-style addressing (MinIO and similar)

# Local Configuration (only used if backend = "local")
[storage.local]
root = "bucketsync-local"            # Directory holding one sub-directory per bucket
owner = "local"                      # Account id recorded on buckets created here
page_size = 1000                     # Keys returned per listing page
"#;
