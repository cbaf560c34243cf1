mod models;
mod defaults;
mod loader;
mod migration;
mod errors;

pub use models::*;
pub use errors::ConfigError;
pub use migration::migrate_config_if_needed;
pub use defaults::DEFAULT_CONFIG_TEMPLATE;
