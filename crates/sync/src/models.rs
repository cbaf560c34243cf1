use bucketsync_config::{Config, ListMode};
use bucketsync_events::EventBus;
use bucketsync_storage::{BucketDescriptor, BucketStatus, StorageBackend};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source_dir: PathBuf,
    pub download_dir: PathBuf,
    pub public_read: bool,
    pub list_mode: ListMode,
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: PathBuf::from(&config.sync.source_dir),
            download_dir: PathBuf::from(&config.sync.download_dir),
            public_read: config.bucket.public_read,
            list_mode: config.sync.list_mode,
        }
    }
}

/// Stages of a single run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Init,
    EnsureBucket,
    Upload,
    List,
    Transfer,
    Verify,
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Init => "init",
            SyncPhase::EnsureBucket => "ensure-bucket",
            SyncPhase::Upload => "upload",
            SyncPhase::List => "list",
            SyncPhase::Transfer => "download+delete",
            SyncPhase::Verify => "verify",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Keys returned by a listing, in service order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub keys: Vec<String>,
    /// False when more pages existed but were not fetched
    pub complete: bool,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub bucket_status: BucketStatus,
    pub uploaded: usize,
    pub downloaded: Vec<PathBuf>,
    /// Keys still present in the final listing
    pub remaining: Vec<String>,
    pub elapsed: Duration,
}

/// Drives one bucket round trip: create, upload, list, download+delete, verify
pub struct SyncOrchestrator {
    pub(crate) storage: Arc<dyn StorageBackend>,
    pub(crate) events: Arc<EventBus>,
    pub(crate) bucket: BucketDescriptor,
    pub(crate) options: SyncOptions,
}
