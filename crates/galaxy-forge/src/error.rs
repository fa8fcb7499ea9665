use galaxy_package::error::PackageError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ForgeError {
    #[error(transparent)]
    #[diagnostic(
        code(galaxy_forge::network),
        help("Check that the GitLab endpoint is reachable from this host")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(galaxy_forge::upstream))]
    Upstream { status: u16, url: String },

    #[error("No release versions found for {project}")]
    #[diagnostic(
        code(galaxy_forge::not_found),
        help("Release tags must be plain MAJOR.MINOR.PATCH, e.g. 1.2.0")
    )]
    NotFound { project: String },

    #[error("Invalid response from {url}")]
    #[diagnostic(code(galaxy_forge::invalid_response))]
    InvalidResponse { url: String },

    #[error("Malformed source archive from {url}: {source}")]
    #[diagnostic(code(galaxy_forge::format))]
    Format {
        url: String,
        #[source]
        source: PackageError,
    },
}

impl From<ureq::Error> for ForgeError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

impl ForgeError {
    /// HTTP status reported by the forge, if the failure carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
