//! On-disk store of built collection artifacts.
//!
//! Each artifact `{namespace}.{collection}-{version}.tar.gz` lives in the target
//! directory next to a `.metadata` sidecar holding its [`ArtifactSummary`]. The sidecar
//! is written last, so its presence is what marks an artifact complete; a request
//! that finds it never touches the forge.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use galaxy_config::config::Config;
use galaxy_forge::Forge;
use galaxy_package::builder::GalaxyPackageBuilder;
use galaxy_utils::{
    fs::{ensure_dir_exists, write_atomic},
    hash::calculate_checksum,
    lock::FileLock,
};
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    key::{validate_file_name, validate_segment, ArtifactKey, LOCK_EXTENSION, SIDECAR_EXTENSION},
    summary::ArtifactSummary,
};

pub struct ArtifactCache<F: Forge> {
    forge: F,
    target_path: PathBuf,
    builder: GalaxyPackageBuilder,
    serialize_builds: bool,
}

impl<F: Forge> ArtifactCache<F> {
    pub fn new(forge: F, target_path: impl Into<PathBuf>) -> Self {
        Self {
            forge,
            target_path: target_path.into(),
            builder: GalaxyPackageBuilder::new(),
            serialize_builds: true,
        }
    }

    pub fn from_config(forge: F, config: &Config) -> Result<Self> {
        let builder = GalaxyPackageBuilder::new().with_compression(config.compression_level());
        Ok(Self::new(forge, config.get_target_path()?)
            .with_builder(builder)
            .with_serialized_builds(config.serialize_builds()))
    }

    /// Whether builds of the same artifact wait for each other through a lock file.
    ///
    /// Without it, concurrent misses each build and the last rename wins.
    pub fn with_serialized_builds(mut self, enabled: bool) -> Self {
        self.serialize_builds = enabled;
        self
    }

    pub fn with_builder(mut self, builder: GalaxyPackageBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Release versions of a collection, newest first.
    pub fn versions(&self, namespace: &str, collection: &str) -> Result<Vec<String>> {
        validate_segment("namespace", namespace)?;
        validate_segment("collection", collection)?;
        Ok(self.forge.versions(namespace, collection)?)
    }

    /// Path of the artifact for a version, whether or not it has been built.
    pub fn locate(&self, namespace: &str, collection: &str, version: &str) -> Result<PathBuf> {
        let key = ArtifactKey::new(namespace, collection, version)?;
        Ok(self.artifact_path(&key))
    }

    pub fn sidecar_path(artifact: &Path) -> PathBuf {
        with_suffix(artifact, SIDECAR_EXTENSION)
    }

    pub fn is_complete(&self, namespace: &str, collection: &str, version: &str) -> Result<bool> {
        let artifact = self.locate(namespace, collection, version)?;
        Ok(Self::sidecar_path(&artifact).is_file() && artifact.is_file())
    }

    /// Path of a completed artifact by file name, for serving downloads.
    ///
    /// Returns `None` for invalid names and for artifacts without a sidecar.
    pub fn artifact_for_download(&self, file_name: &str) -> Option<PathBuf> {
        let file_name = validate_file_name(file_name).ok()?;
        let artifact = self.target_path.join(file_name);

        if Self::sidecar_path(&artifact).is_file() && artifact.is_file() {
            Some(artifact)
        } else {
            None
        }
    }

    /// Returns the summary of a version's artifact, building it from the forge's
    /// source archive on first request.
    pub fn get_or_build(
        &self,
        namespace: &str,
        collection: &str,
        version: &str,
    ) -> Result<ArtifactSummary> {
        let key = ArtifactKey::new(namespace, collection, version)?;
        let artifact = self.artifact_path(&key);
        let sidecar = Self::sidecar_path(&artifact);

        if let Some(summary) = read_summary(&sidecar) {
            debug!("cache hit for {key}");
            return Ok(summary);
        }

        ensure_dir_exists(&self.target_path)?;

        let _lock = if self.serialize_builds {
            let lock = FileLock::acquire(with_suffix(&artifact, LOCK_EXTENSION))?;
            if let Some(summary) = read_summary(&sidecar) {
                debug!("{key} was built while waiting for the lock");
                return Ok(summary);
            }
            Some(lock)
        } else {
            None
        };

        self.build(&key, &artifact, &sidecar)
    }

    fn artifact_path(&self, key: &ArtifactKey) -> PathBuf {
        self.target_path.join(key.file_name())
    }

    fn build(&self, key: &ArtifactKey, artifact: &Path, sidecar: &Path) -> Result<ArtifactSummary> {
        info!(
            "building {key} from {}",
            self.forge
                .archive_url(&key.namespace, &key.collection, &key.version)
        );

        let tree = self
            .forge
            .fetch_archive(&key.namespace, &key.collection, &key.version)?;
        let (data, output) = self.builder.build_to_vec(&tree, &key.version)?;

        write_atomic(artifact, &data)?;

        let (hash, size) = calculate_checksum(artifact)?;
        let summary = ArtifactSummary {
            dependencies: output.dependencies,
            size,
            hash,
        };

        write_atomic(sidecar, &serde_json::to_vec(&summary)?)?;
        info!(
            "built {} ({} bytes, {} files)",
            artifact.display(),
            size,
            output.files.files.len()
        );

        Ok(summary)
    }
}

/// Reads a sidecar. Missing, unreadable and corrupt sidecars all count as a miss.
fn read_summary(sidecar: &Path) -> Option<ArtifactSummary> {
    let content = match fs::read(sidecar) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            warn!("unable to read sidecar {}: {err}", sidecar.display());
            return None;
        }
    };

    match serde_json::from_slice(&content) {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!("ignoring corrupt sidecar {}: {err}", sidecar.display());
            None
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}
