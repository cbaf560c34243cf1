mod errors;
mod models;
mod operations;

pub use errors::FileSystemError;
pub use models::{FileSystem, LocalFileEntry};
