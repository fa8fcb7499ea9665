//! Advisory `flock` locks on sidecar `.lock` files.
//!
//! Threads and processes sharing a directory exclude each other as long as they lock
//! the same path.

use std::{
    fs::{File, OpenOptions},
    path::Path,
};

use nix::fcntl::{Flock, FlockArg};

use crate::error::{LockError, LockResult};

/// An exclusive lock, released on drop.
///
/// The lock file stays on disk. Deleting it while someone waits on it would let a
/// third party lock a fresh inode and run alongside the current holder.
pub struct FileLock {
    _guard: Flock<File>,
}

impl FileLock {
    /// Blocks until the lock on `path` is held, creating the file if needed.
    pub fn acquire<P: AsRef<Path>>(path: P) -> LockResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let guard = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            LockError::AcquireFailed {
                path: path.to_path_buf(),
                errno,
            }
        })?;

        Ok(Self { _guard: guard })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_lock_file_survives_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.tar.gz.lock");

        drop(FileLock::acquire(&path).unwrap());
        assert!(path.exists());

        let _again = FileLock::acquire(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_acquire_waits_for_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.tar.gz.lock");
        let held = FileLock::acquire(&path).unwrap();
        let released = Arc::new(AtomicBool::new(false));

        let waiter = {
            let path = path.clone();
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _lock = FileLock::acquire(&path).unwrap();
                assert!(released.load(Ordering::SeqCst));
            })
        };

        thread::sleep(Duration::from_millis(100));
        released.store(true, Ordering::SeqCst);
        drop(held);

        waiter.join().unwrap();
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let result = FileLock::acquire(dir.path().join("missing/x.lock"));
        assert!(matches!(result, Err(LockError::Io(_))));
    }
}
