use super::errors::SyncError;
use super::models::{Listing, SyncOptions, SyncOrchestrator, SyncPhase, SyncReport};
use bucketsync_config::ListMode;
use bucketsync_events::{AppEvent, EventBus};
use bucketsync_filesystem::{FileSystem, FileSystemError, LocalFileEntry};
use bucketsync_storage::{BucketDescriptor, BucketStatus, ObjectPage, PutOptions, StorageBackend, StorageError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

type Result<T> = std::result::Result<T, SyncError>;

impl SyncOrchestrator {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        events: Arc<EventBus>,
        bucket: BucketDescriptor,
        options: SyncOptions,
    ) -> Self {
        Self {
            storage,
            events,
            bucket,
            options,
        }
    }

    /// Runs every phase in order. The first error aborts the run and is
    /// returned after an `Aborted` event naming the phase it happened in.
    pub async fn run(&self) -> Result<SyncReport> {
        let started = Instant::now();
        let mut phase = SyncPhase::Init;

        match self.run_phases(&mut phase, started).await {
            Ok(report) => {
                self.events.emit(AppEvent::Completed {
                    uploaded: report.uploaded,
                    downloaded: report.downloaded.len(),
                    remaining: report.remaining.len(),
                    elapsed: report.elapsed,
                });
                Ok(report)
            }
            Err(e) => {
                self.events.emit(AppEvent::Aborted {
                    phase: phase.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_phases(&self, phase: &mut SyncPhase, started: Instant) -> Result<SyncReport> {
        self.enter(phase, SyncPhase::EnsureBucket);
        let bucket_status = self.ensure_bucket_exists().await?;

        self.enter(phase, SyncPhase::Upload);
        let uploaded = self.upload_all().await?;

        self.enter(phase, SyncPhase::List);
        let listing = self.list_all().await?;

        self.enter(phase, SyncPhase::Transfer);
        let mut downloaded = Vec::with_capacity(listing.keys.len());
        for key in &listing.keys {
            downloaded.push(self.download_and_remove(key).await?);
        }

        self.enter(phase, SyncPhase::Verify);
        let remaining = self.verify_empty().await?;

        self.enter(phase, SyncPhase::Done);
        Ok(SyncReport {
            bucket_status,
            uploaded,
            downloaded,
            remaining,
            elapsed: started.elapsed(),
        })
    }

    fn enter(&self, phase: &mut SyncPhase, next: SyncPhase) {
        tracing::debug!("{} -> {}", phase, next);
        *phase = next;
        self.events.emit(AppEvent::PhaseStarted {
            phase: next.to_string(),
        });
    }

    /// Creates the bucket, treating an existing bucket owned by the caller
    /// as success. A name owned by another account is `NameConflict`.
    pub async fn ensure_bucket_exists(&self) -> Result<BucketStatus> {
        match self.storage.create_bucket(&self.bucket).await {
            Ok(BucketStatus::Created) => {
                self.events.emit(AppEvent::BucketCreated {
                    bucket: self.bucket.name.clone(),
                    region: self.bucket.region.clone(),
                });
                Ok(BucketStatus::Created)
            }
            Ok(BucketStatus::AlreadyOwned) => {
                self.events.emit(AppEvent::BucketAlreadyOwned {
                    bucket: self.bucket.name.clone(),
                });
                Ok(BucketStatus::AlreadyOwned)
            }
            Err(StorageError::BucketNameTaken(bucket)) => {
                self.events.emit(AppEvent::BucketNameTaken {
                    bucket: bucket.clone(),
                });
                Err(SyncError::NameConflict(bucket))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Uploads every regular file directly inside the source directory.
    /// Sub-directories are skipped; each key is the file's base name.
    pub async fn upload_all(&self) -> Result<usize> {
        let entries = FileSystem::read_entries(&self.options.source_dir).await?;
        let (skipped, files): (Vec<LocalFileEntry>, Vec<LocalFileEntry>) =
            entries.into_iter().partition(|entry| entry.is_directory);

        self.events.emit(AppEvent::SourceScanned {
            dir: self.options.source_dir.display().to_string(),
            files: files.iter().map(LocalFileEntry::file_name).collect(),
            skipped_dirs: skipped.iter().map(LocalFileEntry::file_name).collect(),
        });

        let mut uploaded = 0;
        for entry in &files {
            let key = FileSystem::object_key(&entry.path)
                .ok_or_else(|| FileSystemError::InvalidKey(entry.path.display().to_string()))?;
            let payload = FileSystem::read_payload(&entry.path).await?;

            self.events.emit(AppEvent::Uploading {
                key: key.clone(),
                size: payload.len(),
            });

            let options = PutOptions {
                public_read: self.options.public_read,
                content_type: Some(FileSystem::content_type(&entry.path)),
            };
            self.storage
                .put_object(&self.bucket.name, &key, payload, &options)
                .await?;
            uploaded += 1;
        }

        self.events.emit(AppEvent::UploadCompleted { count: uploaded });
        Ok(uploaded)
    }

    /// Lists the bucket according to the configured list mode
    pub async fn list_all(&self) -> Result<Listing> {
        let listing = self.collect_keys(self.options.list_mode).await?;

        self.events.emit(AppEvent::ObjectsListed {
            count: listing.keys.len(),
            complete: listing.complete,
        });
        Ok(listing)
    }

    async fn collect_keys(&self, mode: ListMode) -> Result<Listing> {
        let mut keys = Vec::new();
        let mut token = None;

        loop {
            let ObjectPage { keys: page, next_token } =
                self.storage.list_objects(&self.bucket.name, token).await?;
            keys.extend(page);

            match next_token {
                None => return Ok(Listing { keys, complete: true }),
                Some(_) if mode == ListMode::FirstPage => {
                    return Ok(Listing { keys, complete: false });
                }
                Some(next) => token = Some(next),
            }
        }
    }

    /// Fetches `key` into the download directory, then deletes it from the
    /// bucket. A failed delete leaves the local copy in place.
    pub async fn download_and_remove(&self, key: &str) -> Result<PathBuf> {
        let target = FileSystem::download_path(&self.options.download_dir, key)?;

        self.events.emit(AppEvent::Downloading {
            key: key.to_string(),
            path: target.display().to_string(),
        });
        let payload = self.storage.get_object(&self.bucket.name, key).await?;
        let written = FileSystem::write_payload(&self.options.download_dir, key, &payload).await?;

        self.events.emit(AppEvent::Deleting { key: key.to_string() });
        self.storage.delete_object(&self.bucket.name, key).await?;

        Ok(written)
    }

    /// Final listing; always follows every page so leftovers are reported
    async fn verify_empty(&self) -> Result<Vec<String>> {
        let listing = self.collect_keys(ListMode::All).await?;

        self.events.emit(AppEvent::Verified {
            remaining: listing.keys.clone(),
        });
        Ok(listing.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucketsync_events::AppEvent;
    use bucketsync_storage::LocalBackend;
    use bytes::Bytes;
    use std::path::Path;

    /// Wraps `LocalBackend`, failing uploads of one key or every delete
    struct FlakyBackend {
        inner: Arc<LocalBackend>,
        fail_put: Option<&'static str>,
        fail_delete: bool,
    }

    #[async_trait::async_trait]
    impl StorageBackend for FlakyBackend {
        async fn create_bucket(&self, bucket: &BucketDescriptor) -> std::result::Result<BucketStatus, StorageError> {
            self.inner.create_bucket(bucket).await
        }

        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: Bytes,
            options: &PutOptions,
        ) -> std::result::Result<(), StorageError> {
            if self.fail_put == Some(key) {
                return Err(StorageError::UploadError(key.to_string(), "boom".to_string()));
            }
            self.inner.put_object(bucket, key, body, options).await
        }

        async fn list_objects(
            &self,
            bucket: &str,
            continuation: Option<String>,
        ) -> std::result::Result<ObjectPage, StorageError> {
            self.inner.list_objects(bucket, continuation).await
        }

        async fn get_object(&self, bucket: &str, key: &str) -> std::result::Result<Bytes, StorageError> {
            self.inner.get_object(bucket, key).await
        }

        async fn delete_object(&self, bucket: &str, key: &str) -> std::result::Result<(), StorageError> {
            if self.fail_delete {
                return Err(StorageError::DeleteError(key.to_string(), "denied".to_string()));
            }
            self.inner.delete_object(bucket, key).await
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn aborted_phase(events: &EventBus) -> Option<String> {
        events.recorded().into_iter().find_map(|event| match event {
            AppEvent::Aborted { phase, .. } => Some(phase),
            _ => None,
        })
    }

    fn phases(events: &EventBus) -> Vec<String> {
        events
            .recorded()
            .into_iter()
            .filter_map(|event| match event {
                AppEvent::PhaseStarted { phase } => Some(phase),
                _ => None,
            })
            .collect()
    }

    struct Fixture {
        _root: tempfile::TempDir,
        store: PathBuf,
        source: PathBuf,
        downloads: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let store = root.path().join("store");
            let source = root.path().join("files");
            let downloads = root.path().join("downloads");
            std::fs::create_dir_all(&source).unwrap();

            Self {
                _root: root,
                store,
                source,
                downloads,
            }
        }

        fn write_source(&self, name: &str, payload: &[u8]) {
            std::fs::write(self.source.join(name), payload).unwrap();
        }

        fn storage(&self, owner: &str, page_size: usize) -> Arc<LocalBackend> {
            Arc::new(LocalBackend::new(self.store.clone(), owner.to_string(), page_size))
        }

        fn orchestrator(&self, storage: Arc<LocalBackend>, list_mode: ListMode) -> SyncOrchestrator {
            self.orchestrator_with(storage, EventBus::new(true), list_mode)
        }

        fn orchestrator_with(
            &self,
            storage: Arc<dyn StorageBackend>,
            events: Arc<EventBus>,
            list_mode: ListMode,
        ) -> SyncOrchestrator {
            SyncOrchestrator::new(
                storage,
                events,
                BucketDescriptor::new("photos", "eu-central-1"),
                SyncOptions {
                    source_dir: self.source.clone(),
                    download_dir: self.downloads.clone(),
                    public_read: true,
                    list_mode,
                },
            )
        }
    }

    async fn bucket_keys(storage: &LocalBackend) -> Vec<String> {
        storage.list_objects("photos", None).await.unwrap().keys
    }

    fn read(path: &Path) -> Vec<u8> {
        std::fs::read(path).unwrap()
    }

    #[tokio::test]
    async fn test_run_skips_directories_and_drains_bucket() {
        let fixture = Fixture::new();
        fixture.write_source("a.txt", b"hello");
        std::fs::create_dir(fixture.source.join("sub")).unwrap();
        std::fs::write(fixture.source.join("sub").join("inner.txt"), b"inner").unwrap();

        let storage = fixture.storage("alice", 1000);
        let report = fixture.orchestrator(storage.clone(), ListMode::All).run().await.unwrap();

        assert_eq!(report.bucket_status, BucketStatus::Created);
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.downloaded, vec![fixture.downloads.join("a.txt")]);
        assert!(report.remaining.is_empty());
        assert_eq!(read(&fixture.downloads.join("a.txt")), b"hello");
        assert!(!fixture.downloads.join("inner.txt").exists());
        assert!(bucket_keys(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_uses_base_names() {
        let fixture = Fixture::new();
        fixture.write_source("b.bin", &[0, 1, 2, 255]);
        fixture.write_source("a.txt", b"hello");

        let storage = fixture.storage("alice", 1000);
        let sync = fixture.orchestrator(storage.clone(), ListMode::All);
        sync.ensure_bucket_exists().await.unwrap();

        assert_eq!(sync.upload_all().await.unwrap(), 2);
        assert_eq!(bucket_keys(&storage).await, vec!["a.txt", "b.bin"]);
    }

    #[tokio::test]
    async fn test_round_trip_payload_is_identical() {
        let fixture = Fixture::new();
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        fixture.write_source("data.bin", &payload);

        let storage = fixture.storage("alice", 1000);
        fixture.orchestrator(storage, ListMode::All).run().await.unwrap();

        assert_eq!(read(&fixture.downloads.join("data.bin")), payload);
    }

    #[tokio::test]
    async fn test_empty_source_dir_still_runs_every_phase() {
        let fixture = Fixture::new();

        let storage = fixture.storage("alice", 1000);
        let report = fixture.orchestrator(storage, ListMode::All).run().await.unwrap();

        assert_eq!(report.uploaded, 0);
        assert!(report.downloaded.is_empty());
        assert!(report.remaining.is_empty());
    }

    #[tokio::test]
    async fn test_bucket_already_owned_is_success() {
        let fixture = Fixture::new();
        fixture.write_source("a.txt", b"hello");

        let storage = fixture.storage("alice", 1000);
        let sync = fixture.orchestrator(storage, ListMode::All);

        assert_eq!(sync.ensure_bucket_exists().await.unwrap(), BucketStatus::Created);
        assert_eq!(sync.ensure_bucket_exists().await.unwrap(), BucketStatus::AlreadyOwned);

        let report = sync.run().await.unwrap();
        assert_eq!(report.bucket_status, BucketStatus::AlreadyOwned);
        assert_eq!(report.uploaded, 1);
    }

    #[tokio::test]
    async fn test_name_conflict_aborts_before_upload() {
        let fixture = Fixture::new();
        fixture.write_source("a.txt", b"hello");

        let other = fixture.storage("bob", 1000);
        other
            .create_bucket(&BucketDescriptor::new("photos", "eu-central-1"))
            .await
            .unwrap();

        let err = fixture
            .orchestrator(fixture.storage("alice", 1000), ListMode::All)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::NameConflict(name) if name == "photos"));
        assert!(bucket_keys(&other).await.is_empty());
        assert!(!fixture.downloads.exists());
    }

    #[tokio::test]
    async fn test_all_pages_are_drained() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c", "d", "e"] {
            fixture.write_source(name, name.as_bytes());
        }

        let storage = fixture.storage("alice", 2);
        let report = fixture.orchestrator(storage.clone(), ListMode::All).run().await.unwrap();

        assert_eq!(report.uploaded, 5);
        assert_eq!(report.downloaded.len(), 5);
        assert!(report.remaining.is_empty());
        assert!(bucket_keys(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_first_page_mode_leaves_later_pages() {
        let fixture = Fixture::new();
        for name in ["a", "b", "c"] {
            fixture.write_source(name, name.as_bytes());
        }

        let storage = fixture.storage("alice", 2);
        let sync = fixture.orchestrator(storage.clone(), ListMode::FirstPage);
        sync.ensure_bucket_exists().await.unwrap();
        sync.upload_all().await.unwrap();

        let listing = sync.list_all().await.unwrap();
        assert_eq!(listing.keys, vec!["a", "b"]);
        assert!(!listing.complete);

        let report = sync.run().await.unwrap();
        assert_eq!(report.downloaded.len(), 2);
        assert_eq!(report.remaining, vec!["c"]);
        assert_eq!(bucket_keys(&storage).await, vec!["c"]);
    }

    #[tokio::test]
    async fn test_missing_source_dir_is_local_io_error() {
        let fixture = Fixture::new();
        std::fs::remove_dir(&fixture.source).unwrap();

        let err = fixture
            .orchestrator(fixture.storage("alice", 1000), ListMode::All)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::LocalIo(FileSystemError::Read { .. })));
    }

    #[tokio::test]
    async fn test_download_of_missing_key_is_service_error() {
        let fixture = Fixture::new();
        let storage = fixture.storage("alice", 1000);
        let sync = fixture.orchestrator(storage, ListMode::All);
        sync.ensure_bucket_exists().await.unwrap();

        let err = sync.download_and_remove("ghost.txt").await.unwrap_err();
        assert!(matches!(err, SyncError::Service(StorageError::ObjectNotFound(_))));
        assert!(!fixture.downloads.join("ghost.txt").exists());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_local_copy_and_object() {
        let fixture = Fixture::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fixture.write_source(name, name.as_bytes());
        }

        let local = fixture.storage("alice", 1000);
        let flaky = Arc::new(FlakyBackend {
            inner: local.clone(),
            fail_put: None,
            fail_delete: true,
        });
        let events = EventBus::recording();

        let err = fixture
            .orchestrator_with(flaky, events.clone(), ListMode::All)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Service(StorageError::DeleteError(key, _)) if key == "a.txt"));
        assert_eq!(read(&fixture.downloads.join("a.txt")), b"a.txt");
        assert!(!fixture.downloads.join("b.txt").exists());
        assert_eq!(bucket_keys(&local).await, vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(aborted_phase(&events).as_deref(), Some("download+delete"));
    }

    #[tokio::test]
    async fn test_failed_upload_stops_before_listing() {
        let fixture = Fixture::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fixture.write_source(name, name.as_bytes());
        }

        let local = fixture.storage("alice", 1000);
        let flaky = Arc::new(FlakyBackend {
            inner: local.clone(),
            fail_put: Some("b.txt"),
            fail_delete: false,
        });
        let events = EventBus::recording();

        let err = fixture
            .orchestrator_with(flaky, events.clone(), ListMode::All)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Service(StorageError::UploadError(key, _)) if key == "b.txt"));
        assert_eq!(bucket_keys(&local).await, vec!["a.txt"]);
        assert!(!fixture.downloads.exists());
        assert_eq!(aborted_phase(&events).as_deref(), Some("upload"));
        assert_eq!(phases(&events), vec!["ensure-bucket", "upload"]);
    }

    #[tokio::test]
    async fn test_failed_write_aborts_before_delete() {
        let fixture = Fixture::new();
        fixture.write_source("a.txt", b"hello");
        // a plain file where the download directory should be
        std::fs::write(&fixture.downloads, b"not a directory").unwrap();

        let local = fixture.storage("alice", 1000);
        let events = EventBus::recording();

        let err = fixture
            .orchestrator_with(local.clone(), events.clone(), ListMode::All)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::LocalIo(FileSystemError::Write { .. })));
        assert_eq!(bucket_keys(&local).await, vec!["a.txt"]);
        assert_eq!(aborted_phase(&events).as_deref(), Some("download+delete"));
        assert!(!events
            .recorded()
            .iter()
            .any(|event| matches!(event, AppEvent::Deleting { .. })));
    }

    #[tokio::test]
    async fn test_successful_run_walks_every_phase() {
        let fixture = Fixture::new();
        fixture.write_source("a.txt", b"hello");

        let events = EventBus::recording();
        fixture
            .orchestrator_with(fixture.storage("alice", 1000), events.clone(), ListMode::All)
            .run()
            .await
            .unwrap();

        assert_eq!(
            phases(&events),
            vec!["ensure-bucket", "upload", "list", "download+delete", "verify", "done"]
        );
        assert_eq!(aborted_phase(&events), None);
        assert!(events
            .recorded()
            .iter()
            .any(|event| matches!(event, AppEvent::Completed { uploaded: 1, .. })));
    }
}
