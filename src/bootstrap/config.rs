use bucketsync_config::Config;
use bucketsync_events::{AppEvent, EventBus};
use bucketsync_filesystem::FileSystem;
use anyhow::Result;
use std::sync::Arc;

pub const ENV_CONFIG_PATH: &str = "BUCKETSYNC_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "bucketsync.toml";

pub fn config_path() -> String {
    std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub async fn load(config_path: &str, events: &Arc<EventBus>) -> Result<Config> {
    let abs_config_path = FileSystem::get_absolute_path_string(config_path)?;

    events.emit(AppEvent::ConfigLoading {
        path: abs_config_path.clone(),
    });

    let config_exists = std::path::Path::new(config_path).exists();
    let config = Config::from_file_with_events(config_path, Some(events)).await?;

    if !config_exists {
        events.emit(AppEvent::ConfigCreated {
            path: abs_config_path,
        });
    }

    events.emit(AppEvent::ConfigLoaded {
        bucket: config.bucket.name.clone(),
        region: config.bucket.region.clone(),
    });

    Ok(config)
}
