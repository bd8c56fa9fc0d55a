//! Service container for dependency injection
//!
//! Wires the directory tree source and the substring filter into services.

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use crate::application::services::{OptionBuilder, PathResolver, TreeSelect};
use crate::config::Settings;
use crate::infrastructure::fs_tree::FsTreeSource;
use crate::infrastructure::traits::{FilterPredicate, NavigationEvents, NoopEvents, SubstringFilter, TreeSource};

/// Container holding the configured collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Directory tree rooted at the selected directory
    pub source: Rc<dyn TreeSource<PathBuf>>,

    /// Filter predicate
    pub filter: Rc<dyn FilterPredicate<PathBuf>>,
}

impl ServiceContainer {
    /// Create a new service container over the directory `root`.
    pub fn new(settings: Settings, root: PathBuf) -> Self {
        let source = Rc::new(FsTreeSource::from_settings(root, &settings));
        let filter = Rc::new(SubstringFilter::new(settings.filter.clone()));
        Self::with_deps(settings, source, filter)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        source: Rc<dyn TreeSource<PathBuf>>,
        filter: Rc<dyn FilterPredicate<PathBuf>>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            source,
            filter,
        }
    }

    pub fn paths(&self) -> PathResolver<PathBuf> {
        PathResolver::new(Rc::clone(&self.source))
    }

    pub fn options(&self) -> OptionBuilder<PathBuf> {
        OptionBuilder::new(Rc::clone(&self.source))
    }

    pub fn tree_select(&self) -> TreeSelect<PathBuf> {
        self.tree_select_with_events(Rc::new(NoopEvents))
    }

    pub fn tree_select_with_events(&self, events: Rc<dyn NavigationEvents<PathBuf>>) -> TreeSelect<PathBuf> {
        TreeSelect::new(
            Rc::clone(&self.source),
            Rc::clone(&self.filter),
            events,
            self.settings.select.clone(),
        )
    }
}
