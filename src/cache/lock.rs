//! Per-source advisory file locks.
//!
//! Cloning or refreshing a source takes an exclusive lock on
//! `<cache>/.locks/<name>.lock`, so two cuco invocations never run git against
//! the same cache directory at the same time. The lock is released when the
//! [`CacheLock`] is dropped. Lock files are left in place.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock on one cache entry.
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Blocks until the lock for `source_name` is held.
    ///
    /// Waiting happens on the blocking thread pool so the runtime stays free.
    pub async fn acquire(cache_dir: &Path, source_name: &str) -> Result<Self> {
        let locks_dir = cache_dir.join(".locks");
        tokio::fs::create_dir_all(&locks_dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                anyhow::anyhow!(
                    "Permission denied: cannot create locks directory at {}",
                    locks_dir.display()
                )
            } else {
                anyhow::anyhow!("Failed to create directory {}: {}", locks_dir.display(), e)
            }
        })?;

        let lock_path = locks_dir.join(format!("{source_name}.lock"));
        let lock_path_clone = lock_path.clone();
        let source_name = source_name.to_string();

        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&lock_path_clone)
                .with_context(|| format!("Failed to open lock file: {}", lock_path_clone.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire lock for: {source_name}"))?;

            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        debug!("Acquired cache lock {}", lock_path.display());

        Ok(Self {
            file,
            path: lock_path,
        })
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cache_lock_acquire_and_release() {
        let temp_dir = TempDir::new().unwrap();
        let lock = CacheLock::acquire(temp_dir.path(), "acme").await.unwrap();

        let lock_path = temp_dir.path().join(".locks").join("acme.lock");
        assert!(lock_path.exists());

        drop(lock);
        assert!(lock_path.exists());

        // Reacquire after release.
        let _again = CacheLock::acquire(temp_dir.path(), "acme").await.unwrap();
    }

    #[tokio::test]
    async fn test_second_acquire_waits_for_release() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().to_path_buf();

        let first = CacheLock::acquire(&cache_dir, "acme").await.unwrap();
        let acquired = Arc::new(AtomicBool::new(false));

        let flag = acquired.clone();
        let dir = cache_dir.clone();
        let waiter = tokio::spawn(async move {
            let _lock = CacheLock::acquire(&dir, "acme").await.unwrap();
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!acquired.load(Ordering::SeqCst));

        drop(first);
        waiter.await.unwrap();
        assert!(acquired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_different_sources_do_not_block() {
        let temp_dir = TempDir::new().unwrap();
        let _a = CacheLock::acquire(temp_dir.path(), "a").await.unwrap();
        let _b = CacheLock::acquire(temp_dir.path(), "b").await.unwrap();
    }
}
