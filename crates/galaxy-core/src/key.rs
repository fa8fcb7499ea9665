//! Artifact identity and on-disk naming.

use std::fmt;

use crate::error::{GalaxyError, Result};

pub const ARTIFACT_EXTENSION: &str = ".tar.gz";
pub const SIDECAR_EXTENSION: &str = ".metadata";
pub const LOCK_EXTENSION: &str = ".lock";

/// A `(namespace, collection, version)` triple whose segments are safe to use in a
/// file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub namespace: String,
    pub collection: String,
    pub version: String,
}

impl ArtifactKey {
    pub fn new(namespace: &str, collection: &str, version: &str) -> Result<Self> {
        Ok(Self {
            namespace: validate_segment("namespace", namespace)?.to_string(),
            collection: validate_segment("collection", collection)?.to_string(),
            version: validate_segment("version", version)?.to_string(),
        })
    }

    /// `{namespace}.{collection}-{version}.tar.gz`
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}-{}{ARTIFACT_EXTENSION}",
            self.namespace, self.collection, self.version
        )
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.namespace, self.collection, self.version)
    }
}

/// Rejects values that could escape the target directory or produce ambiguous names.
pub fn validate_segment<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let invalid = value.is_empty()
        || value.contains(['/', '\\', '\0'])
        || value.contains("..");

    if invalid {
        return Err(GalaxyError::InvalidKey {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Validates a requested artifact file name: a single path segment ending in `.tar.gz`.
pub fn validate_file_name(file_name: &str) -> Result<&str> {
    let file_name = validate_segment("file name", file_name)?;
    match file_name.strip_suffix(ARTIFACT_EXTENSION) {
        Some(stem) if !stem.is_empty() && !stem.starts_with('.') => Ok(file_name),
        _ => {
            Err(GalaxyError::InvalidKey {
                field: "file name",
                value: file_name.to_string(),
            })
        }
    }
}
