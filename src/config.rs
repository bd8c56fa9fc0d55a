//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeselect/treeselect.toml`
//! 3. Local config: `<dir>/.treeselect.toml` (usually the working directory)
//! 4. Environment variables: `TREESELECT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, IoResultExt};

/// Where a filter match has to start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchFrom {
    #[default]
    Any,
    Start,
}

impl std::str::FromStr for MatchFrom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "start" => Ok(Self::Start),
            other => Err(format!("invalid match_from: {other} (expected any|start)")),
        }
    }
}

/// Selection behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SelectConfig {
    /// Hold a list of values instead of one
    pub multiple: bool,
    /// Accept typed text that matches no node
    pub free_solo: bool,
    /// Offer branches as values in addition to navigating into them
    pub branches_selectable: bool,
}

/// Default text filter behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    pub ignore_case: bool,
    pub trim: bool,
    pub match_from: MatchFrom,
    /// Maximum number of matched nodes, unlimited if unset
    pub limit: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_case: true,
            trim: true,
            match_from: MatchFrom::Any,
            limit: None,
        }
    }
}

/// Tree source and rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// List dot-files and dot-directories
    pub show_hidden: bool,
    /// Separator used when rendering ancestor paths
    pub path_separator: String,
    /// Default root directory for the CLI
    pub root: Option<PathBuf>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            show_hidden: false,
            path_separator: " / ".into(),
            root: None,
        }
    }
}

/// Raw sections for intermediate parsing (all fields Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSelectConfig {
    pub multiple: Option<bool>,
    pub free_solo: Option<bool>,
    pub branches_selectable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFilterConfig {
    pub ignore_case: Option<bool>,
    pub trim: Option<bool>,
    pub match_from: Option<MatchFrom>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub show_hidden: Option<bool>,
    pub path_separator: Option<String>,
    pub root: Option<PathBuf>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub select: RawSelectConfig,
    pub filter: RawFilterConfig,
    pub tree: RawTreeConfig,
}

/// Unified configuration for treeselect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub select: SelectConfig,
    pub filter: FilterConfig,
    pub tree: TreeConfig,
}

/// Get the XDG config directory for treeselect.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeselect").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeselect.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treeselect.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string, leaving it untouched on failure.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let s = &overlay.select;
        let f = &overlay.filter;
        let t = &overlay.tree;
        Self {
            select: SelectConfig {
                multiple: s.multiple.unwrap_or(self.select.multiple),
                free_solo: s.free_solo.unwrap_or(self.select.free_solo),
                branches_selectable: s
                    .branches_selectable
                    .unwrap_or(self.select.branches_selectable),
            },
            filter: FilterConfig {
                ignore_case: f.ignore_case.unwrap_or(self.filter.ignore_case),
                trim: f.trim.unwrap_or(self.filter.trim),
                match_from: f.match_from.unwrap_or(self.filter.match_from),
                limit: f.limit.or(self.filter.limit),
            },
            tree: TreeConfig {
                show_hidden: t.show_hidden.unwrap_or(self.tree.show_hidden),
                path_separator: t
                    .path_separator
                    .clone()
                    .unwrap_or_else(|| self.tree.path_separator.clone()),
                root: t.root.clone().or_else(|| self.tree.root.clone()),
            },
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(root) = self.tree.root.as_deref() {
            self.tree.root = Some(expand_path(root));
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.treeselect.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/treeselect/treeselect.toml`
    /// 3. Local config: `<local_dir>/.treeselect.toml`
    /// 4. Environment variables: `TREESELECT_*` prefix, `__` between section and key
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("load: local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TREESELECT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // config crate only parses the env vars; merging stays explicit
        let config = Config::builder()
            .add_source(Environment::with_prefix("TREESELECT").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("select.multiple") {
            settings.select.multiple = val;
        }
        if let Ok(val) = config.get_bool("select.free_solo") {
            settings.select.free_solo = val;
        }
        if let Ok(val) = config.get_bool("select.branches_selectable") {
            settings.select.branches_selectable = val;
        }
        if let Ok(val) = config.get_bool("filter.ignore_case") {
            settings.filter.ignore_case = val;
        }
        if let Ok(val) = config.get_bool("filter.trim") {
            settings.filter.trim = val;
        }
        if let Ok(val) = config.get_string("filter.match_from") {
            settings.filter.match_from = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_int("filter.limit") {
            settings.filter.limit = usize::try_from(val).ok();
        }
        if let Ok(val) = config.get_bool("tree.show_hidden") {
            settings.tree.show_hidden = val;
        }
        if let Ok(val) = config.get_string("tree.path_separator") {
            settings.tree.path_separator = val;
        }
        if let Ok(val) = config.get_string("tree.root") {
            settings.tree.root = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeselect configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeselect/treeselect.toml
#   Local:  ./.treeselect.toml
#   Env:    TREESELECT_<SECTION>__<KEY>, e.g. TREESELECT_FILTER__MATCH_FROM=start

[select]
# Hold a list of values instead of one
# multiple = false
# Accept typed text that matches no node
# free_solo = false
# Offer directories as values in addition to navigating into them
# branches_selectable = false

[filter]
# ignore_case = true
# trim = true
# "any" or "start"
# match_from = "any"
# limit = 50

[tree]
# show_hidden = false
# path_separator = " / "
# root = "~/projects"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
