use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates `path` and its parents unless it already is a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::create_dir_all(path).map_err(|source| {
        FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "create",
            source,
        }
    })
}

/// Replaces the contents of `path` with `data`.
///
/// The bytes go to a hidden sibling file that is synced and then renamed over `path`,
/// so readers see the old file or the whole new one. The sibling is removed on failure.
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> FileSystemResult<()> {
    let path = path.as_ref();
    let staging = staging_path(path);

    let result = write_synced(&staging, data).and_then(|()| {
        fs::rename(&staging, path).map_err(|source| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "rename",
                source,
            }
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_synced(path: &Path, data: &[u8]) -> FileSystemResult<()> {
    let failed = |action| {
        move |source| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action,
                source,
            }
        }
    };

    let mut file = File::create(path).map_err(failed("create"))?;
    file.write_all(data).map_err(failed("write"))?;
    file.sync_all().map_err(failed("sync"))
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// `.{name}.{pid}.{seq}.tmp` next to `path`; unique per call within and across processes.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
}
