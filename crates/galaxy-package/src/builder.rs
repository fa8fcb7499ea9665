//! Transcoding of a forge source tree into a Galaxy collection artifact.

use std::{collections::BTreeMap, io::Write};

use flate2::{write::GzEncoder, Compression};
use galaxy_utils::hash::sha256_hex;
use tar::{Builder, EntryType, Header};
use tracing::{debug, warn};

use crate::{
    error::{ErrorContext, PackageError, Result},
    tree::{Dir, FileEntry, FileTree, Node},
    types::{
        CollectionInfo, GalaxyFile, GalaxyFiles, GalaxyManifest, FILES_JSON, FORMAT_VERSION,
        MANIFEST_JSON,
    },
};

const DECLARATION_FILES: [&str; 2] = ["galaxy.yml", "galaxy.yaml"];
const DIR_MODE: u32 = 0o777;
const GENERATED_MODE: u32 = 0o644;

/// Result of a successful build.
#[derive(Clone, Debug)]
pub struct BuildOutput {
    /// Dependencies declared by the collection, name to version constraint.
    pub dependencies: BTreeMap<String, String>,
    /// The inventory written as `FILES.json`.
    pub files: GalaxyFiles,
    /// The manifest written as `MANIFEST.json`.
    pub manifest: GalaxyManifest,
}

/// Re-roots a source tree and appends the generated `FILES.json` and
/// `MANIFEST.json`, producing a gzip-compressed tar stream.
///
/// Output depends only on the tree contents and the requested version: generated
/// entries carry mtime 0 and the gzip header carries no timestamp, so building the
/// same tree twice yields identical bytes.
#[derive(Clone, Debug)]
pub struct GalaxyPackageBuilder {
    compression: Compression,
}

impl Default for GalaxyPackageBuilder {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
        }
    }
}

impl GalaxyPackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Writes the collection artifact for `tree` into `writer`.
    ///
    /// `requested_version` is recorded in the manifest when the declaration does not
    /// carry a version of its own. Nothing is written when the tree does not have a
    /// single top-level directory.
    pub fn build<W: Write>(
        &self,
        tree: &FileTree,
        requested_version: &str,
        writer: W,
    ) -> Result<BuildOutput> {
        let root = tree.single_root()?;
        debug!(root, files = tree.len(), "building collection artifact");

        let mut tar = Builder::new(GzEncoder::new(writer, self.compression));

        let mut files = GalaxyFiles::default();
        append_tree(&mut tar, &tree.subtree(root), "", &mut files.files)?;

        let files_json = serde_json::to_vec(&files)?;
        let files_sha256 = sha256_hex(&files_json);
        append_generated(&mut tar, FILES_JSON, &files_json)?;

        let mut collection_info = read_declaration(tree, root)?;
        if collection_info.version.trim().is_empty() {
            collection_info.version = requested_version.to_string();
        }
        let dependencies = collection_info.dependencies.clone();

        let manifest = GalaxyManifest {
            collection_info,
            file_manifest_file: GalaxyFile::new(FILES_JSON, files_sha256),
            format: FORMAT_VERSION,
        };
        let manifest_json = serde_json::to_vec(&manifest)?;
        append_generated(&mut tar, MANIFEST_JSON, &manifest_json)?;

        let encoder = tar
            .into_inner()
            .with_context(|| "finishing tar stream".to_string())?;
        encoder
            .finish()
            .with_context(|| "finishing gzip stream".to_string())?;

        Ok(BuildOutput {
            dependencies,
            files,
            manifest,
        })
    }

    /// Builds the artifact in memory.
    pub fn build_to_vec(
        &self,
        tree: &FileTree,
        requested_version: &str,
    ) -> Result<(Vec<u8>, BuildOutput)> {
        let mut buffer = Vec::new();
        let output = self.build(tree, requested_version, &mut buffer)?;
        Ok((buffer, output))
    }
}

fn append_tree<W: Write>(
    tar: &mut Builder<W>,
    dir: &Dir<'_>,
    prefix: &str,
    inventory: &mut Vec<GalaxyFile>,
) -> Result<()> {
    for (name, node) in &dir.children {
        let path = if prefix.is_empty() {
            (*name).to_string()
        } else {
            format!("{prefix}/{name}")
        };
        let reserved = prefix.is_empty() && matches!(*name, FILES_JSON | MANIFEST_JSON);

        match node {
            Node::Dir(sub) => {
                append_directory(tar, &path)?;
                append_tree(tar, sub, &path, inventory)?;
            }
            Node::File(_) if reserved => {
                warn!("skipping source file {path}: the name is reserved for generated content");
            }
            Node::File(entry) => {
                append_file(tar, &path, entry)?;
                inventory.push(GalaxyFile::new(path, sha256_hex(&entry.data)));
            }
        }
    }

    Ok(())
}

fn append_directory<W: Write>(tar: &mut Builder<W>, path: &str) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(DIR_MODE);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);

    tar.append_data(&mut header, format!("{path}/"), std::io::empty())
        .with_context(|| format!("writing directory {path}"))
}

fn append_file<W: Write>(tar: &mut Builder<W>, path: &str, entry: &FileEntry) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(entry.data.len() as u64);
    header.set_mode(entry.mode);
    header.set_mtime(entry.mtime);
    header.set_uid(0);
    header.set_gid(0);

    tar.append_data(&mut header, path, entry.data.as_slice())
        .with_context(|| format!("writing {path}"))
}

fn append_generated<W: Write>(tar: &mut Builder<W>, name: &str, data: &[u8]) -> Result<()> {
    append_file(tar, name, &FileEntry::new(data, GENERATED_MODE, 0))
}

fn read_declaration(tree: &FileTree, root: &str) -> Result<CollectionInfo> {
    let found: Vec<(&str, &FileEntry)> = DECLARATION_FILES
        .iter()
        .filter_map(|name| tree.get(&format!("{root}/{name}")).map(|entry| (*name, entry)))
        .collect();

    let (name, entry) = match found.as_slice() {
        [single] => *single,
        [] => {
            return Err(PackageError::DeclarationNotFound(
                "no galaxy.yml in repository root".into(),
            ))
        }
        _ => {
            return Err(PackageError::DeclarationNotFound(
                "both galaxy.yml and galaxy.yaml present in repository root".into(),
            ))
        }
    };

    serde_yaml::from_slice(&entry.data).map_err(|source| {
        PackageError::InvalidDeclaration {
            file: name.to_string(),
            source,
        }
    })
}
