//! Error types for the package crate.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading source archives or building collection artifacts.
#[derive(Error, Diagnostic, Debug)]
pub enum PackageError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(galaxy_package::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Source archive contains no files")]
    #[diagnostic(
        code(galaxy_package::empty_archive),
        help("Make sure the tag points to a revision with committed files")
    )]
    EmptyArchive,

    #[error("Source archive has {0} top-level entries, expected exactly one")]
    #[diagnostic(code(galaxy_package::multiple_roots))]
    MultipleRoots(usize),

    #[error("Collection declaration not found: {0}")]
    #[diagnostic(
        code(galaxy_package::declaration_not_found),
        help("The repository root must contain exactly one of galaxy.yml or galaxy.yaml")
    )]
    DeclarationNotFound(String),

    #[error("Invalid collection declaration {file}: {source}")]
    #[diagnostic(code(galaxy_package::invalid_declaration))]
    InvalidDeclaration {
        file: String,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(galaxy_package::json))]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
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
            PackageError::IoError {
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
    fn test_with_context() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        let err = result
            .with_context(|| "reading archive entry".to_string())
            .unwrap_err();

        assert_eq!(err.to_string(), "Error while reading archive entry: eof");
    }

    #[test]
    fn test_root_cardinality_messages() {
        assert_eq!(
            PackageError::MultipleRoots(3).to_string(),
            "Source archive has 3 top-level entries, expected exactly one"
        );
    }
}
