//! Defines the [`Error`] type shared by every stage of a build. All variants
//! are fatal: they propagate to [`crate::build::build_site`] and abort the run.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Names the kind of resource that was missing in an
/// [`Error::MissingResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A template file in the templates directory.
    Template,

    /// The site metadata file (`meta.md`).
    SiteMetadata,

    /// A directory the build requires (pages, posts, or templates).
    Directory,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Resource::Template => "template",
            Resource::SiteMetadata => "site metadata file",
            Resource::Directory => "directory",
        })
    }
}

/// The result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a fatal build error.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template, the site metadata file, or a required
    /// directory is absent or unreadable.
    MissingResource {
        kind: Resource,
        path: PathBuf,
        err: io::Error,
    },

    /// Returned when a content file (page, post, or metadata) cannot be read
    /// or decoded.
    ContentLoad { path: PathBuf, err: io::Error },

    /// Returned when an output document cannot be written.
    Write { path: PathBuf, err: io::Error },
}

impl Error {
    pub(crate) fn missing(kind: Resource, path: impl Into<PathBuf>, err: io::Error) -> Error {
        Error::MissingResource {
            kind,
            path: path.into(),
            err,
        }
    }

    pub(crate) fn content(path: impl Into<PathBuf>, err: io::Error) -> Error {
        Error::ContentLoad {
            path: path.into(),
            err,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: io::Error) -> Error {
        Error::Write {
            path: path.into(),
            err,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingResource { kind, path, err } => {
                write!(f, "Missing {} '{}': {}", kind, path.display(), err)
            }
            Error::ContentLoad { path, err } => {
                write!(f, "Loading content file '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing output file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingResource { err, .. } => Some(err),
            Error::ContentLoad { err, .. } => Some(err),
            Error::Write { err, .. } => Some(err),
        }
    }
}
