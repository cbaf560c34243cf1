use std::path::PathBuf;

/// Local filesystem helpers used by the sync phases
pub struct FileSystem;

/// One direct entry of a scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileEntry {
    pub path: PathBuf,
    pub is_directory: bool,
}

impl LocalFileEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
