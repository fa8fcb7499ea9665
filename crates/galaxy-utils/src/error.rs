use std::{error::Error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum HashError {
    ReadFailed { path: PathBuf, source: io::Error },
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "Unable to hash `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for HashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
        }
    }
}

#[derive(Debug)]
pub enum PathError {
    Empty,
    CurrentDir { source: io::Error },
    MissingEnvVar { var: String, input: String },
    UnclosedVariable { input: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Path is empty"),
            Self::CurrentDir { source } => {
                write!(f, "Unable to resolve the working directory: {source}")
            }
            Self::MissingEnvVar { var, input } => {
                write!(f, "`{input}` refers to `${var}`, which is not set")
            }
            Self::UnclosedVariable { input } => write!(f, "Missing `}}` in `{input}`"),
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum FileSystemError {
    File {
        path: PathBuf,
        action: &'static str,
        source: io::Error,
    },
    Directory {
        path: PathBuf,
        action: &'static str,
        source: io::Error,
    },
    NotADirectory {
        path: PathBuf,
    },
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File {
                path,
                action,
                source,
            } => write!(f, "Failed to {action} `{}`: {source}", path.display()),
            Self::Directory {
                path,
                action,
                source,
            } => {
                write!(
                    f,
                    "Failed to {action} directory `{}`: {source}",
                    path.display()
                )
            }
            Self::NotADirectory { path } => {
                write!(f, "`{}` exists and is not a directory", path.display())
            }
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::File { source, .. } | Self::Directory { source, .. } => Some(source),
            Self::NotADirectory { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum LockError {
    Io(io::Error),
    AcquireFailed { path: PathBuf, errno: nix::errno::Errno },
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Unable to open lock file: {err}"),
            Self::AcquireFailed { path, errno } => {
                write!(f, "Unable to lock `{}`: {errno}", path.display())
            }
        }
    }
}

impl Error for LockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::AcquireFailed { errno, .. } => Some(errno),
        }
    }
}

impl From<io::Error> for LockError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Any failure from this crate.
#[derive(Debug)]
pub enum UtilsError {
    Path(PathError),
    FileSystem(FileSystemError),
    Hash(HashError),
    Lock(LockError),
}

macro_rules! utils_error_variants {
    ($($variant:ident($inner:ty)),+ $(,)?) => {
        impl fmt::Display for UtilsError {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant(err) => err.fmt(f),)+
                }
            }
        }

        impl Error for UtilsError {
            fn source(&self) -> Option<&(dyn Error + 'static)> {
                match self {
                    $(Self::$variant(err) => Some(err),)+
                }
            }
        }

        $(
            impl From<$inner> for UtilsError {
                fn from(err: $inner) -> Self {
                    Self::$variant(err)
                }
            }
        )+
    };
}

utils_error_variants!(
    Path(PathError),
    FileSystem(FileSystemError),
    Hash(HashError),
    Lock(LockError),
);

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;
pub type HashResult<T> = std::result::Result<T, HashError>;
pub type LockResult<T> = std::result::Result<T, LockError>;
pub type PathResult<T> = std::result::Result<T, PathError>;
