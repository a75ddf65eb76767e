use std::io;
use std::path::{Path, PathBuf};

use anyhow::bail;
use tokio::fs;
use tracing::info;

use crate::models::{Paste, StoredPaste};

const EXTENSION: &str = "json";

/// Pastes kept as one JSON document per key in a single directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open the store at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir: PathBuf = dir.into();

        info!("checking paste directory at {}", dir.display());

        if !dir.exists() {
            info!("paste directory at {} doesn't exist, creating it", dir.display());
            fs::create_dir_all(&dir).await?;
        }

        if !dir.is_dir() {
            bail!("{} is not a directory", dir.display());
        }

        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a paste, replacing whatever was stored under `key`.
    ///
    /// `key` must already be a safe file name stem.
    pub async fn put_paste(&self, key: &str, paste: &Paste) -> crate::ApiResult<()> {
        let data = serde_json::to_vec(&StoredPaste::from(paste))?;
        fs::write(self.path_for(key), data).await?;
        Ok(())
    }

    /// Read the paste stored under a sanitized `key`.
    pub async fn get_paste(&self, key: &str) -> crate::ApiResult<Paste> {
        let data = match fs::read(self.path_for(key)).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(crate::ApiError::NotFound),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&data)?)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        debug_assert!(!key.contains(['/', '\\', '.']));
        self.dir.join(format!("{key}.{EXTENSION}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;

    fn paste(content: &str, note: &str) -> Paste {
        Paste {
            content: content.into(),
            note: note.into(),
        }
    }

    #[tokio::test]
    async fn open_creates_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("pastes");

        let storage = FileStorage::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn open_rejects_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("not-a-dir");
        std::fs::write(&file, b"").unwrap();

        assert!(FileStorage::open(&file).await.is_err());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp.path()).await.unwrap();

        storage.put_paste("abcDE", &paste("hello", "n1")).await.unwrap();

        assert_eq!(
            storage.get_paste("abcDE").await.unwrap(),
            paste("hello", "n1")
        );
        assert!(temp.path().join("abcDE.json").is_file());
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp.path()).await.unwrap();

        storage.put_paste("dupe1", &paste("first", "")).await.unwrap();
        storage.put_paste("dupe1", &paste("second", "")).await.unwrap();

        assert_eq!(storage.get_paste("dupe1").await.unwrap().content, "second");
    }

    #[tokio::test]
    async fn missing_key_is_not_found_and_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(temp.path()).await.unwrap();

        assert!(matches!(
            storage.get_paste("nope1").await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(storage.get_paste("").await, Err(ApiError::NotFound)));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn reads_documents_with_lowercase_keys() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("lower.json"),
            br#"{"content":"x","note":"y"}"#,
        )
        .unwrap();
        let storage = FileStorage::open(temp.path()).await.unwrap();

        assert_eq!(storage.get_paste("lower").await.unwrap(), paste("x", "y"));
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("broke.json"), b"{\"Content\": \"trunc").unwrap();
        let storage = FileStorage::open(temp.path()).await.unwrap();

        assert!(matches!(
            storage.get_paste("broke").await,
            Err(ApiError::CorruptPaste { .. })
        ));
    }
}
