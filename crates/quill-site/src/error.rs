//! Error types for content loading.

use std::path::PathBuf;

/// Error loading posts or pages from disk.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Source file not found.
    #[error("Source file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// I/O error reading a source file or directory.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Front matter is not valid YAML or has the wrong shape.
    #[error("Invalid front matter in {}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Front matter parsing error.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FrontMatterError(pub(crate) String);

/// Error loading a timeline data file.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// I/O error reading the data file.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Data file is not valid TOML.
    #[error("Invalid timeline data: {0}")]
    Parse(#[from] toml::de::Error),
}
