mod errors;
mod models;
mod orchestrator;

pub use errors::SyncError;
pub use models::{Listing, SyncOptions, SyncOrchestrator, SyncPhase, SyncReport};
