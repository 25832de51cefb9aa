//! File-backed motion store.
//!
//! Every operation reads the CBOR snapshot from disk, so several processes
//! can share one file. Writers hold an advisory lock on a sibling `.lock`
//! file (see `MotionStore::lock`) across their find-then-save, and each save
//! writes a uniquely named temp file in the same directory and renames it
//! over the snapshot, so readers never see a torn file.

use super::traits::{MotionStore, StoreError, StoreLock, StoreResult};
use crate::motion::{Motion, MotionId};
use crate::serialization::{from_cbor, to_cbor};
use async_trait::async_trait;
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    motions: Vec<Motion>,
}

pub struct FileMotionStore {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Advisory lock on the store's `.lock` file. Closing the file releases it.
struct FileLock {
    _file: File,
}

impl FileMotionStore {
    /// Open a store, validating the snapshot at `path` if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "motions".into());
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);

        let store = Self { path, lock_path };
        let count = store.read_snapshot().await?.len();
        debug!(path = %store.path.display(), count, "motion store opened");

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    async fn read_snapshot(&self) -> StoreResult<Vec<Motion>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = from_cbor(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Corrupt(format!(
                "{}: unsupported snapshot version {}",
                self.path.display(),
                snapshot.version
            )));
        }
        Ok(snapshot.motions)
    }

    async fn write_snapshot(&self, motions: Vec<Motion>) -> StoreResult<()> {
        let bytes = to_cbor(&Snapshot {
            version: SNAPSHOT_VERSION,
            motions,
        })?;
        let dir = self.directory();
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

#[async_trait]
impl MotionStore for FileMotionStore {
    async fn lock(&self, id: MotionId) -> StoreResult<StoreLock> {
        let dir = self.directory();
        let lock_path = self.lock_path.clone();

        let file = tokio::task::spawn_blocking(move || -> StoreResult<File> {
            std::fs::create_dir_all(&dir)?;
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

        debug!(motion = %id, path = %self.lock_path.display(), "store lock acquired");
        Ok(StoreLock::holding(FileLock { _file: file }))
    }

    /// Read-modify-write of the whole snapshot. Callers updating an existing
    /// motion hold `lock` for the duration of their find-then-save.
    async fn save(&self, motion: Motion) -> StoreResult<Motion> {
        let mut motions = self.read_snapshot().await?;
        match motions.iter_mut().find(|m| m.id() == motion.id()) {
            Some(existing) => *existing = motion.clone(),
            None => motions.push(motion.clone()),
        }

        self.write_snapshot(motions).await?;
        Ok(motion)
    }

    async fn find_by_id(&self, id: MotionId) -> StoreResult<Option<Motion>> {
        Ok(self
            .read_snapshot()
            .await?
            .into_iter()
            .find(|m| m.id() == id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Motion>> {
        self.read_snapshot().await
    }
}
