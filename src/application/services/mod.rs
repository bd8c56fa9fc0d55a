//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the tree source boundary traits but are themselves
//! concrete structs, not traits.

mod cache;
mod filter;
mod navigation;
mod options;
mod path;
mod tree_select;
mod value;

pub use cache::{ErrorHandler, Memo, MemoSnapshot};
pub use filter::{filter_entries, FilterState};
pub use navigation::{ChangeValue, NavState, NavigationController, Outcome, RawOption};
pub use options::{Classification, OptionBuilder};
pub use path::PathResolver;
pub use tree_select::TreeSelect;
pub use value::ValueResolver;
