//! Fragment file output.

use crate::error::ProcessorError;
use crate::Result;
use kvstream_consumer::Fragment;
use std::path::Path;

/// Write the fragment's raw bytes to `path`.
///
/// The bytes start and end on top-level element boundaries, so the file is
/// a standalone Matroska file. Missing parent directories are created.
pub fn save_fragment_as_file(fragment: &Fragment, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ProcessorError::write(parent, e))?;
        }
    }

    std::fs::write(path, fragment.raw_bytes()).map_err(|e| ProcessorError::write(path, e))?;

    tracing::debug!(
        fragment = fragment.fragment_number(),
        bytes = fragment.len(),
        path = %path.display(),
        "saved fragment"
    );
    Ok(())
}
