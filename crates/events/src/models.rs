use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    // Application lifecycle
    Starting,
    Completed {
        uploaded: usize,
        downloaded: usize,
        remaining: usize,
        elapsed: Duration,
    },
    Aborted { phase: String, error: String },

    // Configuration
    ConfigLoading { path: String },
    ConfigCreated { path: String },
    ConfigMigrated { added_fields: Vec<String> },
    ConfigLoaded { bucket: String, region: String },

    // Storage
    StorageReady { backend: String, bucket: String },
    PhaseStarted { phase: String },

    // Bucket creation
    BucketCreated { bucket: String, region: String },
    BucketAlreadyOwned { bucket: String },
    BucketNameTaken { bucket: String },

    // Upload
    SourceScanned { dir: String, files: Vec<String>, skipped_dirs: Vec<String> },
    Uploading { key: String, size: usize },
    UploadCompleted { count: usize },

    // Listing
    ObjectsListed { count: usize, complete: bool },

    // Download + delete
    Downloading { key: String, path: String },
    Deleting { key: String },

    // Final listing
    Verified { remaining: Vec<String> },

    // Errors
    Error { context: String, error: String },
}

pub struct EventBus {
    pub(super) silent_mode: bool,
    /// Emitted events, kept only by buses built with `EventBus::recording`
    pub(super) history: Option<Mutex<Vec<AppEvent>>>,
}
