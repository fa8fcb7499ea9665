use galaxy_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(galaxy_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(galaxy_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(galaxy_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid GitLab endpoint: {0}")]
    #[diagnostic(
        code(galaxy_config::invalid_endpoint),
        help("Use an absolute http:// or https:// URL, e.g. https://gitlab.example.com")
    )]
    InvalidEndpoint(String),

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(galaxy_config::invalid_timeout),
        help("Use a non-zero duration such as `750ms`, `5s` or `1m30s`")
    )]
    InvalidTimeout(String),

    #[error("Invalid server protocol: {0}")]
    #[diagnostic(
        code(galaxy_config::invalid_protocol),
        help("Supported protocols are `http` and `https`")
    )]
    InvalidProtocol(String),

    #[error("Invalid server port: {0}")]
    #[diagnostic(
        code(galaxy_config::invalid_port),
        help("Use a port number between 1 and 65535")
    )]
    InvalidPort(String),

    #[error("Invalid compression level: {0}")]
    #[diagnostic(
        code(galaxy_config::invalid_compression_level),
        help("Use a gzip level between 0 and 9")
    )]
    InvalidCompressionLevel(u32),

    #[error("Invalid public URL: {0}")]
    #[diagnostic(code(galaxy_config::invalid_public_url))]
    InvalidPublicUrl(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(galaxy_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(galaxy_config::utils))]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(galaxy_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(galaxy_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
