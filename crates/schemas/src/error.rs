use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors surfaced while discovering and loading schema sources.
///
/// Every variant is fatal to gateway assembly: a failed candidate aborts the
/// whole run rather than producing a partial endpoint set.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema directory itself could not be listed.
    #[error("failed to read schema directory {}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A candidate source could not be read (missing, unreadable, or a
    /// directory).
    #[error("failed to read schema source {}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source was read but is not a valid schema document, or its type
    /// system failed to build.
    #[error("schema source {name} is not a valid schema: {message}")]
    InvalidSdl { name: String, message: String },

    /// The document parsed but defines no query root, so there is nothing to
    /// mount. Kept distinct from [`SchemaError::InvalidSdl`] so callers can
    /// tell "broken source" from "source with no schema in it".
    #[error("schema source {name} does not define a query root")]
    MissingSchema { name: String },
}
