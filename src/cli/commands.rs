//! Command dispatch
//!
//! Every command builds its services from the layered settings plus the
//! global flags, drives the resolution to completion and prints the result.

use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use futures::executor::block_on;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{RawOption, TreeSelect};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_path, local_config_path, Settings};
use crate::domain::{ChangeReason, CommitDetails, Direction, Entry, EntryKind, ResolvedValue, Selection};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{NavigationEvents, TreeSource};
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::{ensure_dir_exists, ensure_within, PathExt};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Options { dir, branch, query }) => {
            _options(cli, dir.as_deref(), branch.as_deref(), query.as_deref())
        }
        Some(Commands::Path { file, root }) => _path(cli, file, root.as_deref()),
        Some(Commands::Tree { dir, depth }) => _tree(cli, dir.as_deref(), *depth),
        Some(Commands::Browse { dir, picks }) => _browse(cli, dir.as_deref(), picks),
        Some(Commands::Config { command }) => _config(command),
        // completions are written by main before dispatch
        Some(Commands::Completion { .. }) => Ok(()),
        None => Err(CliError::Usage("no command given, see --help".to_string())),
    }
}

fn current_dir() -> CliResult<PathBuf> {
    env::current_dir().map_err(|e| InfraError::io("current directory", e).into())
}

/// Layered settings with the global flags on top.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(Some(&current_dir()?))?;
    settings.select.multiple |= cli.multiple;
    settings.select.free_solo |= cli.free_solo;
    settings.select.branches_selectable |= cli.branches_selectable;
    settings.tree.show_hidden |= cli.show_hidden;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Explicit directory, else configured root, else the working directory.
pub fn resolve_root(dir: Option<&Path>, settings: &Settings) -> CliResult<PathBuf> {
    let root = match (dir, &settings.tree.root) {
        (Some(dir), _) => expand_path(dir),
        (None, Some(root)) => root.clone(),
        (None, None) => current_dir()?,
    };
    ensure_dir_exists(&root)?;
    Ok(root.to_canonical()?)
}

fn settled_options(select: &TreeSelect<PathBuf>) -> CliResult<Vec<Entry<PathBuf>>> {
    let entries = select.options()?;
    if !select.is_loading() {
        return Ok(entries);
    }
    block_on(select.settle());
    Ok(select.options()?)
}

fn settled_value(select: &TreeSelect<PathBuf>) -> CliResult<Option<ResolvedValue<PathBuf>>> {
    if let Some(value) = select.value()? {
        return Ok(Some(value));
    }
    block_on(select.settle());
    Ok(select.value()?)
}

fn print_options(select: &TreeSelect<PathBuf>, entries: &[Entry<PathBuf>]) {
    for entry in entries {
        output::option(entry.kind, entry.is_free_text(), &select.entry_label(entry));
    }
}

#[instrument(skip(cli))]
fn _options(cli: &Cli, dir: Option<&Path>, branch: Option<&Path>, query: Option<&str>) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let root = resolve_root(dir, &settings)?;
    let container = ServiceContainer::new(settings, root.clone());
    let select = container.tree_select();

    if let Some(branch) = branch {
        let branch = ensure_within(&root, &root.join(branch))?;
        select.set_branch(Some(branch));
    }
    if let Some(query) = query {
        select.set_input(query);
    }

    let entries = settled_options(&select)?;
    let title = match select.branch() {
        Some(b) => container.source.path_label(&[b], true),
        None => root.display().to_string(),
    };
    output::header(&title);
    print_options(&select, &entries);
    Ok(())
}

#[instrument(skip(cli))]
fn _path(cli: &Cli, file: &Path, root: Option<&Path>) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let root = resolve_root(root, &settings)?;
    let file = ensure_within(&root, &root.join(file))?;
    let container = ServiceContainer::new(settings, root);

    let ancestors = block_on(container.paths().resolve(&file).into_future())?;
    debug!("{} has {} ancestors", file.display(), ancestors.len());
    let mut path = Vec::with_capacity(ancestors.len() + 1);
    path.push(file);
    path.extend(ancestors);
    output::info(&container.source.path_label(&path, true));
    Ok(())
}

#[instrument(skip(cli))]
fn _tree(cli: &Cli, dir: Option<&Path>, depth: usize) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let root = resolve_root(dir, &settings)?;
    let container = ServiceContainer::new(settings, root.clone());

    let leaves = block_on(container.options().to_tree_string(None, depth).into_future())?;
    let tree = Tree::new(root.display().to_string()).with_leaves(leaves);
    output::info(&tree);
    Ok(())
}

/// Reports navigation and commits as they happen.
struct PrintEvents {
    source: Rc<dyn TreeSource<PathBuf>>,
}

impl NavigationEvents<PathBuf> for PrintEvents {
    fn on_branch_change(&self, branch: Option<&PathBuf>, direction: Direction) {
        let label = match branch {
            Some(b) => self.source.path_label(std::slice::from_ref(b), true),
            None => "(root)".to_string(),
        };
        output::action(&direction.to_string(), &label);
    }

    fn on_value_change(&self, value: &Selection<PathBuf>, reason: ChangeReason, details: &CommitDetails<PathBuf>) {
        let count = value.targets().len();
        let suffix = if details.from_blur { " (blur)" } else { "" };
        output::action(&reason.to_string(), &format!("{count} value(s) held{suffix}"));
    }

    fn on_close(&self) {
        debug!("close");
    }
}

/// Exact label match; values win over directories unless `descend` is set.
fn pick_entry(select: &TreeSelect<PathBuf>, entries: &[Entry<PathBuf>], label: &str, descend: bool) -> Option<Entry<PathBuf>> {
    let matching = |kind: EntryKind| {
        entries
            .iter()
            .find(|e| e.kind == kind && select.entry_label(e) == label)
            .cloned()
    };
    if descend {
        matching(EntryKind::DownBranch)
    } else {
        matching(EntryKind::Leaf).or_else(|| matching(EntryKind::DownBranch))
    }
}

#[instrument(skip(cli))]
fn _browse(cli: &Cli, dir: Option<&Path>, picks: &[String]) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let root = resolve_root(dir, &settings)?;
    let separator = settings.tree.path_separator.clone();
    let container = ServiceContainer::new(settings, root);
    let events = Rc::new(PrintEvents {
        source: Rc::clone(&container.source),
    });
    let select = container.tree_select_with_events(events);

    for pick in picks {
        if pick == ".." {
            if !block_on(select.ascend().into_future())? {
                return Err(CliError::InvalidArgs("cannot ascend above the root".to_string()));
            }
            continue;
        }

        let (label, descend) = match pick.strip_suffix('/') {
            Some(label) => (label, true),
            None => (pick.as_str(), false),
        };
        select.set_input(label);
        let entries = settled_options(&select)?;
        let Some(entry) = pick_entry(&select, &entries, label, descend) else {
            output::warning(&format!("no option {pick:?}, candidates:"));
            print_options(&select, &entries);
            return Err(CliError::InvalidArgs(format!("no option {pick:?}")));
        };

        select.select(&entry)?;
        if select.should_close(Some(&RawOption::Entry(entry))) {
            select.navigation().close(None);
            select.set_input("");
        }
    }

    let Some(value) = settled_value(&select)? else {
        return Ok(());
    };
    output::header("value");
    for entry in value.entries() {
        let label = select.entry_label(entry);
        let path = select.path_label(entry);
        if path.is_empty() {
            output::detail(&label);
        } else {
            output::detail(&format!("{path}{separator}{label}"));
        }
    }
    Ok(())
}

fn _config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(&current_dir()?))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no config directory on this platform"),
            }
            output::action("local", &local_config_path(&current_dir()?).display());
        }
    }
    Ok(())
}
