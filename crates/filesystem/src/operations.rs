use super::errors::FileSystemError;
use super::models::{FileSystem, LocalFileEntry};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

type Result<T> = std::result::Result<T, FileSystemError>;

impl FileSystem {
    /// Lists the direct entries of `dir`, sorted by file name.
    /// Symlinks are classified by what they point to.
    pub async fn read_entries(dir: &Path) -> Result<Vec<LocalFileEntry>> {
        let read_err = |source| FileSystemError::Read {
            path: dir.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(dir).await.map_err(read_err)?;
        if !metadata.is_dir() {
            return Err(FileSystemError::NotADirectory(dir.to_path_buf()));
        }

        let mut reader = fs::read_dir(dir).await.map_err(read_err)?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await.map_err(read_err)? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(read_err)?;

            let is_directory = if file_type.is_symlink() {
                fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };

            entries.push(LocalFileEntry { path, is_directory });
        }

        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        tracing::debug!("Read {} entries from {}", entries.len(), dir.display());

        Ok(entries)
    }

    /// Object key for a local file: its last path segment
    pub fn object_key(path: &Path) -> Option<String> {
        path.file_name().map(|n| n.to_string_lossy().to_string())
    }

    pub async fn read_payload(path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(|source| FileSystemError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Bytes::from(data))
    }

    /// Writes `payload` to `dir/key`, creating `dir` when missing and
    /// overwriting any existing file.
    pub async fn write_payload(dir: &Path, key: &str, payload: &[u8]) -> Result<PathBuf> {
        let target = Self::download_path(dir, key)?;

        Self::create_directory(dir).await?;
        fs::write(&target, payload)
            .await
            .map_err(|source| FileSystemError::Write {
                path: target.clone(),
                source,
            })?;

        tracing::debug!("    Wrote: {} ({} bytes)", target.display(), payload.len());
        Ok(target)
    }

    /// Local destination for a downloaded key. Keys that would escape `dir`
    /// are refused.
    pub fn download_path(dir: &Path, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let single_segment = relative.components().count() == 1
            && matches!(relative.components().next(), Some(Component::Normal(_)));

        if key.is_empty() || !single_segment {
            return Err(FileSystemError::InvalidKey(key.to_string()));
        }
        Ok(dir.join(relative))
    }

    /// MIME type guessed from the file extension
    pub fn content_type(path: &Path) -> String {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    async fn create_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .map_err(|source| FileSystemError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing::debug!("    Created: {}", path.display());
        }
        Ok(())
    }

    fn get_absolute_path(path: &Path) -> std::io::Result<PathBuf> {
        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Ok(abs_path)
    }

    pub fn get_absolute_path_string(path: &str) -> std::io::Result<String> {
        let path_buf = PathBuf::from(path);
        let abs = Self::get_absolute_path(&path_buf)?;
        Ok(abs.to_string_lossy().to_string())
    }
}
