//! Error types for galaxy-core.

use galaxy_config::error::ConfigError;
use galaxy_forge::error::ForgeError;
use galaxy_package::error::PackageError;
use galaxy_utils::error::{FileSystemError, HashError, LockError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

/// Core error type for collection lookups and artifact builds.
#[derive(Error, Diagnostic, Debug)]
pub enum GalaxyError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Forge(#[from] ForgeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    #[diagnostic(code(galaxy::utils), help("Check file permissions and disk space"))]
    Utils(#[from] UtilsError),

    #[error("Error while {action}")]
    #[diagnostic(code(galaxy::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(galaxy::json))]
    Json(#[from] serde_json::Error),

    #[error("Invalid {field}: {value:?}")]
    #[diagnostic(
        code(galaxy::invalid_key),
        help("Names and versions must be non-empty and free of '/', '\\' and '..'")
    )]
    InvalidKey { field: &'static str, value: String },
}

impl GalaxyError {
    /// Whether the error comes from the forge or from the contents of what it returned,
    /// as opposed to a local failure.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Forge(_) | Self::Package(_))
    }
}

impl From<PathError> for GalaxyError {
    fn from(err: PathError) -> Self {
        Self::Utils(err.into())
    }
}

impl From<FileSystemError> for GalaxyError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(err.into())
    }
}

impl From<HashError> for GalaxyError {
    fn from(err: HashError) -> Self {
        Self::Utils(err.into())
    }
}

impl From<LockError> for GalaxyError {
    fn from(err: LockError) -> Self {
        Self::Utils(err.into())
    }
}

pub type Result<T> = std::result::Result<T, GalaxyError>;

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            GalaxyError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = GalaxyError::InvalidKey {
            field: "namespace",
            value: "../etc".into(),
        };
        assert_eq!(err.to_string(), "Invalid namespace: \"../etc\"");
        assert!(!err.is_upstream());
    }

    #[test]
    fn test_with_context() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result
            .with_context(|| "reading /tmp/x.metadata".to_string())
            .unwrap_err();

        assert_eq!(err.to_string(), "Error while reading /tmp/x.metadata");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_upstream_classification() {
        let err: GalaxyError = PackageError::EmptyArchive.into();
        assert!(err.is_upstream());

        let err: GalaxyError = PathError::Empty.into();
        assert!(matches!(err, GalaxyError::Utils(UtilsError::Path(_))));
        assert!(!err.is_upstream());
    }
}
