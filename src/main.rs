mod bootstrap;

use bucketsync_events::{AppEvent, EventBus};
use bucketsync_storage::BucketDescriptor;
use bucketsync_sync::{SyncOptions, SyncOrchestrator, SyncReport};
use crate::bootstrap::{config, logging, storage};
use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::initialize();

    let events = EventBus::new(false);
    events.emit(AppEvent::Starting);

    match run(&events).await {
        Ok(report) => {
            tracing::info!(
                uploaded = report.uploaded,
                downloaded = report.downloaded.len(),
                remaining = report.remaining.len(),
                "Sync finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Sync failures were already reported with their phase
            if e.downcast_ref::<bucketsync_sync::SyncError>().is_none() {
                events.emit(AppEvent::Error {
                    context: "Startup failed".to_string(),
                    error: format!("{:#}", e),
                });
            }
            eprintln!("bucketsync: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(events: &Arc<EventBus>) -> Result<SyncReport> {
    let config_path = config::config_path();
    let config = config::load(&config_path, events).await?;

    let storage = storage::initialize(&config).await?;

    let bucket = BucketDescriptor::new(config.bucket.name.clone(), config.bucket.region.clone());
    events.emit(AppEvent::StorageReady {
        backend: storage.name().to_string(),
        bucket: bucket.name.clone(),
    });

    let orchestrator = SyncOrchestrator::new(
        storage,
        Arc::clone(events),
        bucket,
        SyncOptions::from_config(&config),
    );

    Ok(orchestrator.run().await?)
}
