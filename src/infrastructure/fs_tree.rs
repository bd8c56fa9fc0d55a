//! Directory tree as a tree source
//!
//! Directories are branches, everything else is a leaf. The configured root
//! directory itself is never listed; its entries form the root level.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::config::Settings;
use crate::domain::{DomainError, MaybeDeferred};
use crate::infrastructure::traits::TreeSource;
use crate::util::path::PathExt;

#[derive(Debug, Clone)]
pub struct FsTreeSource {
    root: PathBuf,
    show_hidden: bool,
    branches_selectable: bool,
    separator: String,
}

impl FsTreeSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            show_hidden: false,
            branches_selectable: false,
            separator: " / ".to_string(),
        }
    }

    pub fn from_settings(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            root: root.into(),
            show_hidden: settings.tree.show_hidden,
            branches_selectable: settings.select.branches_selectable,
            separator: settings.tree.path_separator.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_visible(&self, entry: &DirEntry) -> bool {
        self.show_hidden || !entry.path().is_hidden()
    }

    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by(dirs_first)
        {
            let entry = entry.map_err(|e| DomainError::lookup(format!("list {}", dir.display()), e))?;
            if self.is_visible(&entry) {
                entries.push(entry.into_path());
            }
        }
        trace!("list: {} entries in {}", entries.len(), dir.display());
        Ok(entries)
    }
}

fn dirs_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

impl TreeSource<PathBuf> for FsTreeSource {
    fn children(&self, node: Option<&PathBuf>) -> MaybeDeferred<Option<Vec<PathBuf>>> {
        let dir = node.map(PathBuf::as_path).unwrap_or(&self.root);
        if !dir.is_dir() {
            return MaybeDeferred::ready(None);
        }
        debug!("children: {}", dir.display());
        self.list(dir).map(Some).into()
    }

    fn parent(&self, node: &PathBuf) -> MaybeDeferred<Option<PathBuf>> {
        let parent = node
            .parent()
            .filter(|p| *p != self.root.as_path() && p.starts_with(&self.root))
            .map(Path::to_path_buf);
        MaybeDeferred::ready(parent)
    }

    fn is_branch(&self, node: &PathBuf) -> Option<MaybeDeferred<bool>> {
        Some(MaybeDeferred::ready(node.is_dir()))
    }

    fn is_branch_selectable(&self, _node: &PathBuf) -> MaybeDeferred<bool> {
        MaybeDeferred::ready(self.branches_selectable)
    }

    fn option_label(&self, node: &PathBuf) -> String {
        node.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| node.display().to_string())
    }

    fn path_label(&self, path: &[PathBuf], _include_self: bool) -> String {
        let Some(nearest) = path.first() else {
            return String::new();
        };
        pathdiff::diff_paths(nearest, &self.root)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .join(&self.separator)
            })
            .unwrap_or_else(|| nearest.display().to_string())
    }
}
