//! In-memory file tree read from a gzip-compressed tar archive.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::Read,
};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::trace;

use crate::error::{ErrorContext, PackageError, Result};

/// A regular file held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub data: Vec<u8>,
    pub mode: u32,
    pub mtime: u64,
}

impl FileEntry {
    pub fn new(data: impl Into<Vec<u8>>, mode: u32, mtime: u64) -> Self {
        Self {
            data: data.into(),
            mode,
            mtime,
        }
    }
}

/// Regular files keyed by their slash-separated path.
///
/// Directories are implicit: a directory exists when some file path goes through it.
#[derive(Clone, Debug, Default)]
pub struct FileTree {
    entries: BTreeMap<String, FileEntry>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every regular file of a `.tar.gz` stream into memory.
    ///
    /// Directories, links and extension headers (such as the pax global header
    /// GitLab prepends) are skipped.
    pub fn from_tar_gz<R: Read>(reader: R) -> Result<Self> {
        let mut archive = Archive::new(GzDecoder::new(reader));
        let mut tree = Self::new();

        let entries = archive
            .entries()
            .with_context(|| "reading source archive".to_string())?;

        for entry in entries {
            let mut entry = entry.with_context(|| "reading source archive entry".to_string())?;

            if !entry.header().entry_type().is_file() {
                continue;
            }

            let path = entry
                .path()
                .with_context(|| "decoding archive entry path".to_string())?
                .to_string_lossy()
                .into_owned();
            let mode = entry.header().mode().unwrap_or(0o644);
            let mtime = entry.header().mtime().unwrap_or(0);

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .with_context(|| format!("reading {path} from source archive"))?;

            trace!(path = %path, size = data.len(), "read archive entry");
            tree.insert(path, FileEntry { data, mode, mtime });
        }

        Ok(tree)
    }

    /// Inserts a file, normalizing its path. Empty paths are ignored.
    pub fn insert(&mut self, path: impl AsRef<str>, entry: FileEntry) {
        let path = normalize(path.as_ref());
        if !path.is_empty() {
            self.entries.insert(path, entry);
        }
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct first path segments.
    pub fn roots(&self) -> BTreeSet<&str> {
        self.entries
            .keys()
            .map(|path| path.split('/').next().unwrap_or(path))
            .collect()
    }

    /// Name of the single top-level directory all files live under.
    ///
    /// A file sitting directly at the top level counts as its own root, so an
    /// archive without a wrapping directory is rejected too.
    pub fn single_root(&self) -> Result<&str> {
        let roots = self.roots();
        match roots.len() {
            0 => Err(PackageError::EmptyArchive),
            1 => {
                let root = roots.into_iter().next().ok_or(PackageError::EmptyArchive)?;
                if self.entries.contains_key(root) {
                    Err(PackageError::MultipleRoots(1))
                } else {
                    Ok(root)
                }
            }
            n => Err(PackageError::MultipleRoots(n)),
        }
    }

    /// Nested view of the files below `root`, keyed by path segment.
    pub(crate) fn subtree(&self, root: &str) -> Dir<'_> {
        let prefix = format!("{root}/");
        let mut dir = Dir::default();

        for (path, entry) in &self.entries {
            if let Some(relative) = path.strip_prefix(&prefix) {
                let segments: Vec<&str> = relative.split('/').collect();
                dir.insert(&segments, entry);
            }
        }

        dir
    }
}

#[derive(Debug, Default)]
pub(crate) struct Dir<'a> {
    pub children: BTreeMap<&'a str, Node<'a>>,
}

impl<'a> Dir<'a> {
    fn insert(&mut self, segments: &[&'a str], entry: &'a FileEntry) {
        match segments {
            [] => {}
            [name] => {
                self.children.entry(*name).or_insert(Node::File(entry));
            }
            [first, rest @ ..] => {
                let node = self
                    .children
                    .entry(*first)
                    .or_insert_with(|| Node::Dir(Dir::default()));
                // a file already holds this name
                if let Node::Dir(sub) = node {
                    sub.insert(rest, entry);
                }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum Node<'a> {
    Dir(Dir<'a>),
    File(&'a FileEntry),
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
