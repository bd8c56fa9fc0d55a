//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Browse a directory tree the way a tree select widget does: one level at a time
#[derive(Parser, Debug)]
#[command(name = "treeselect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Hold several values
    #[arg(long, global = true)]
    pub multiple: bool,

    /// Accept typed text that matches no entry
    #[arg(long, global = true)]
    pub free_solo: bool,

    /// Offer directories as values as well
    #[arg(long, global = true)]
    pub branches_selectable: bool,

    /// Include hidden entries
    #[arg(long, global = true)]
    pub show_hidden: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the options of one directory level
    Options {
        /// Root directory (default: configured root, then cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Active branch below the root
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        branch: Option<PathBuf>,
        /// Filter text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show the ancestor path of an entry
    Path {
        /// Entry below the root
        #[arg(value_hint = ValueHint::AnyPath)]
        file: PathBuf,
        /// Root directory (default: configured root, then cwd)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        root: Option<PathBuf>,
    },

    /// Show the tree as reached through option lists
    Tree {
        /// Root directory (default: configured root, then cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Levels to descend
        #[arg(long, default_value_t = 2)]
        depth: usize,
    },

    /// Navigate by label and commit values
    ///
    /// `name` picks an entry (values before directories), `name/` descends,
    /// `..` ascends.
    Browse {
        /// Root directory (default: configured root, then cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Labels to pick, in order
        #[arg(short, long = "pick", num_args = 1..)]
        picks: Vec<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented template
    Template,
    /// Show config file locations
    Path,
}
