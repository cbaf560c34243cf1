use super::models::{AppEvent, EventBus};
use colored::Colorize;
use std::sync::{Arc, Mutex, PoisonError};

/// Console text for a bucket name owned by another account
pub fn bucket_taken_message(bucket: &str) -> String {
    format!("Bucket name already in use: {}", bucket)
}

/// Console text for a bucket that already exists under the caller's account
pub fn bucket_owned_message(bucket: &str) -> String {
    format!("Bucket exists and is owned by you: {}", bucket)
}

impl EventBus {
    pub fn new(silent_mode: bool) -> Arc<Self> {
        Arc::new(Self {
            silent_mode,
            history: None,
        })
    }

    /// Silent bus that keeps every emitted event for later inspection
    pub fn recording() -> Arc<Self> {
        Arc::new(Self {
            silent_mode: true,
            history: Some(Mutex::new(Vec::new())),
        })
    }

    /// Events emitted so far; always empty unless built with `recording`
    pub fn recorded(&self) -> Vec<AppEvent> {
        self.history
            .as_ref()
            .map(|h| h.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .unwrap_or_default()
    }

    pub fn is_silent(&self) -> bool {
        self.silent_mode
    }

    /// Records the event through tracing and, unless silent, renders it to the console.
    pub fn emit(&self, event: AppEvent) {
        self.trace(&event);

        if !self.silent_mode {
            self.render(&event);
        }

        if let Some(history) = &self.history {
            history.lock().unwrap_or_else(PoisonError::into_inner).push(event);
        }
    }

    fn trace(&self, event: &AppEvent) {
        match event {
            AppEvent::BucketNameTaken { bucket } => {
                tracing::error!(bucket = %bucket, "bucket name already in use by another account");
            }
            AppEvent::Aborted { phase, error } => {
                tracing::error!(phase = %phase, "sync aborted: {}", error);
            }
            AppEvent::Error { context, error } => {
                tracing::error!("{}: {}", context, error);
            }
            AppEvent::Verified { remaining } if !remaining.is_empty() => {
                tracing::warn!(count = remaining.len(), "objects left in bucket after run");
            }
            AppEvent::ObjectsListed { count, complete: false } => {
                tracing::warn!(count, "listing stopped after the first page");
            }
            AppEvent::ConfigCreated { path } => {
                tracing::warn!("Configuration file not found");
                tracing::info!("Created default configuration at: {}", path);
            }
            other => {
                tracing::debug!(event = ?other, "event");
            }
        }
    }

    fn render(&self, event: &AppEvent) {
        match event {
            // Application lifecycle
            AppEvent::Starting => {
                println!("\n{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
                println!("  {}", "BucketSync - Folder/Bucket Round Trip".white().bold());
                println!("  {} {}", "Version".dimmed(), env!("CARGO_PKG_VERSION").cyan());
                println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());
            }
            AppEvent::Completed { uploaded, downloaded, remaining, elapsed } => {
                println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".green());
                println!("  {} {}", "Uploaded  ".white(), uploaded.to_string().cyan());
                println!("  {} {}", "Downloaded".white(), downloaded.to_string().cyan());
                if *remaining > 0 {
                    println!("  {} {}", "Remaining ".white(), remaining.to_string().yellow());
                }
                println!("  {} {:.2?}", "Elapsed   ".white(), elapsed);
                println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".green());
            }
            AppEvent::Aborted { phase, error } => {
                println!("\n  {} Aborted during {}: {}", "✗".red(), phase.cyan(), error.red());
            }

            // Configuration
            AppEvent::ConfigLoading { path } => {
                println!("  {} {}", "Loading config".dimmed(), path.cyan());
            }
            AppEvent::ConfigCreated { .. } => {
                // Reported through tracing only
            }
            AppEvent::ConfigMigrated { added_fields } => {
                if !added_fields.is_empty() {
                    println!("  {} Config updated: added {}",
                        "↻".blue(),
                        added_fields.join(", ").dimmed()
                    );
                }
            }
            AppEvent::ConfigLoaded { bucket, region } => {
                println!("  {} Bucket {} ({})", "✓".green(), bucket.cyan(), region.dimmed());
            }

            // Storage
            AppEvent::StorageReady { backend, bucket } => {
                println!("  {} {} backend for {}", "→".dimmed(), backend.cyan(), bucket.cyan());
            }
            AppEvent::PhaseStarted { .. } => {
                // Silent - reduce verbosity
            }

            // Bucket creation
            AppEvent::BucketCreated { bucket, region } => {
                println!("  {} Created bucket {} in {}", "+".green(), bucket.cyan(), region.cyan());
            }
            AppEvent::BucketAlreadyOwned { bucket } => {
                println!("  {} {}", "✓".green(), bucket_owned_message(bucket));
            }
            AppEvent::BucketNameTaken { bucket } => {
                println!("  {} {}", "✗".red(), bucket_taken_message(bucket).red());
            }

            // Upload
            AppEvent::SourceScanned { dir, files, skipped_dirs } => {
                println!("  {} {} file(s) in {}", "→".dimmed(), files.len().to_string().cyan(), dir.cyan());
                if !skipped_dirs.is_empty() {
                    println!("  {} Skipping directories: {}", "⚠".yellow(), skipped_dirs.join(", ").dimmed());
                }
            }
            AppEvent::Uploading { key, size } => {
                println!("  {} Uploading {} ({} bytes)", "↑".blue(), key.cyan(), size.to_string().dimmed());
            }
            AppEvent::UploadCompleted { count } => {
                println!("  {} Uploaded {} object(s)", "✓".green(), count.to_string().cyan());
            }

            // Listing
            AppEvent::ObjectsListed { count, complete } => {
                if *complete {
                    println!("  {} {} object(s) in bucket", "✓".green(), count.to_string().cyan());
                } else {
                    println!("  {} {} object(s) on first page (more not listed)", "⚠".yellow(), count.to_string().cyan());
                }
            }

            // Download + delete
            AppEvent::Downloading { key, path } => {
                println!("  {} Downloading {} → {}", "↓".blue(), key.cyan(), path.dimmed());
            }
            AppEvent::Deleting { key } => {
                println!("  {} Deleting {}", "-".red(), key.cyan());
            }

            // Final listing
            AppEvent::Verified { remaining } => {
                if remaining.is_empty() {
                    println!("  {} Bucket is empty", "✓".green());
                } else {
                    println!("  {} {} object(s) still in bucket: {}",
                        "⚠".yellow(),
                        remaining.len().to_string().yellow(),
                        remaining.join(", ").dimmed()
                    );
                }
            }

            // Errors
            AppEvent::Error { .. } => {
                // Reported through tracing only
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_messages() {
        assert_eq!(bucket_taken_message("photos"), "Bucket name already in use: photos");
        assert_eq!(bucket_owned_message("photos"), "Bucket exists and is owned by you: photos");
    }

    #[test]
    fn test_plain_bus_keeps_no_history() {
        let bus = EventBus::new(true);
        assert!(bus.is_silent());

        bus.emit(AppEvent::Starting);
        bus.emit(AppEvent::ObjectsListed { count: 3, complete: false });
        assert!(bus.recorded().is_empty());
    }

    #[test]
    fn test_recording_bus_keeps_events_in_order() {
        let bus = EventBus::recording();
        assert!(bus.is_silent());

        bus.emit(AppEvent::BucketNameTaken { bucket: "taken".to_string() });
        bus.emit(AppEvent::Verified { remaining: vec!["a.txt".to_string()] });

        let recorded = bus.recorded();
        assert_eq!(recorded.len(), 2);
        assert!(matches!(&recorded[0], AppEvent::BucketNameTaken { bucket } if bucket == "taken"));
        assert!(matches!(&recorded[1], AppEvent::Verified { remaining } if remaining.len() == 1));
    }
}
