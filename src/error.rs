//! Error types shared by the content pipeline and the engine

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of entity a lookup was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Post,
    Page,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Post => f.write_str("post"),
            EntityKind::Page => f.write_str("page"),
        }
    }
}

/// Failure to turn a single content file into a post or page.
///
/// These never abort a directory scan; the file is logged and skipped.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid front-matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("missing publish date")]
    MissingDate,

    #[error("invalid publish date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Errors surfaced to callers of the engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} '{slug}' not found")]
    NotFound { kind: EntityKind, slug: String },

    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("failed to render template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("failed to load templates: {0}")]
    TemplateLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn post_not_found(slug: &str) -> Self {
        Error::NotFound {
            kind: EntityKind::Post,
            slug: slug.to_string(),
        }
    }

    pub(crate) fn page_not_found(slug: &str) -> Self {
        Error::NotFound {
            kind: EntityKind::Page,
            slug: slug.to_string(),
        }
    }

    /// Whether this error means the requested content does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status code the route layer answers with
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else {
            500
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
