mod bus;
mod models;

pub use bus::{bucket_owned_message, bucket_taken_message};
pub use models::{AppEvent, EventBus};
