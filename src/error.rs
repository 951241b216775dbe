//! Error types for build operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building pages or the search index.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("page template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("missing required placeholder(s) in page template: {0}")]
    MissingPlaceholders(String),

    #[error("slug collision: `{slug}` is produced by both `{first}` and `{second}`")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },

    #[error("malformed entry in manifest: {0}")]
    MalformedManifest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
