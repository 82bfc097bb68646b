//! Filesystem utilities

use std::path::Path;

use log::warn;

/// Check if a path exists
pub fn path_exists(path: &str) -> bool {
    Path::new(path).exists()
}

/// Check that a path points at a regular file, logging why when it doesn't
pub fn is_readable_file(path: &str) -> bool {
    let path = Path::new(path);
    match path.metadata() {
        Ok(meta) if meta.is_file() => true,
        Ok(_) => {
            warn!("{} exists but is not a regular file", path.display());
            false
        }
        Err(e) => {
            warn!("cannot read {}: {}", path.display(), e);
            false
        }
    }
}
