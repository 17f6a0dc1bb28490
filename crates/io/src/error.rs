use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// Filesystem error (missing file, unreadable directory, etc.).
    Io { path: PathBuf, message: String },
    /// Document is not well-formed XML.
    Xml { path: PathBuf, message: String },
    /// Identifier index cache item could not be read or written.
    Cache { item: String, message: String },
}

impl IoError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn xml(path: &Path, message: impl Into<String>) -> Self {
        Self::Xml {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn cache(item: &str, message: impl Into<String>) -> Self {
        Self::Cache {
            item: item.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Xml { path, message } => write!(f, "bad XML in {}: {message}", path.display()),
            Self::Cache { item, message } => write!(f, "cache item '{item}': {message}"),
        }
    }
}

impl std::error::Error for IoError {}
