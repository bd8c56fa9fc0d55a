use std::path::{Path, PathBuf};

use crate::infrastructure::{InfraError, InfraResult};

pub trait PathExt {
    fn to_canonical(&self) -> InfraResult<PathBuf>;
    fn is_hidden(&self) -> bool;
}

impl PathExt for Path {
    fn to_canonical(&self) -> InfraResult<PathBuf> {
        self.canonicalize()
            .map_err(|e| InfraError::io(format!("resolve {}", self.display()), e))
    }

    fn is_hidden(&self) -> bool {
        self.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
    }
}

pub fn ensure_dir_exists(path: &Path) -> InfraResult<()> {
    if !path.is_dir() {
        Err(InfraError::NotFound(format!("directory {}", path.display())))
    } else {
        Ok(())
    }
}

/// Canonical `path`, required to live below `root`.
pub fn ensure_within(root: &Path, path: &Path) -> InfraResult<PathBuf> {
    let path = path.to_canonical()?;
    if path.starts_with(root) && path != root {
        Ok(path)
    } else {
        Err(InfraError::NotFound(format!(
            "{} below {}",
            path.display(),
            root.display()
        )))
    }
}
