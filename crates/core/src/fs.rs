//! Filesystem utilities

use std::fs;
use std::path::Path;

/// Create a directory and all parent directories if they don't exist
pub fn create_dir_all(path: &str) -> std::io::Result<()> {
    let path = Path::new(path);
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `contents` to `path`, creating missing parent directories
pub fn write_file(path: &str, contents: &str) -> std::io::Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Some(parent) = parent.to_str() {
            create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}
