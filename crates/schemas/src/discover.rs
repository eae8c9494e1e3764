use std::path::Path;

use tracing::debug;

use crate::{error::SchemaError, source::FileSource};

/// Enumerate candidate schema sources in `dir`.
///
/// Every directory entry becomes a candidate, resolved to an absolute path.
/// Nothing is filtered here: a subdirectory or a stray non-SDL file is still
/// enumerated and fails later on the normal load path. The returned order is
/// whatever the filesystem listing produces; callers must not assume lexical
/// or creation order.
pub async fn discover(dir: &Path) -> Result<Vec<FileSource>, SchemaError> {
    let read_err = |source| SchemaError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut sources = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let path = std::path::absolute(&path).unwrap_or(path);
        sources.push(FileSource::new(path));
    }

    debug!(dir = %dir.display(), candidates = sources.len(), "enumerated schema sources");
    Ok(sources)
}
