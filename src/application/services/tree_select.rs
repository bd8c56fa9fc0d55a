//! Tree select facade
//!
//! Wires the resolvers, the filter and the navigation controller around one
//! shared navigation state. Option lists are memoized per branch and resolved
//! values per selection, so repeated reads never repeat lookups.

use std::cell::RefCell;
use std::rc::Rc;

use futures::join;
use tracing::{debug, instrument, warn};

use crate::application::error::ApplicationResult;
use crate::application::services::cache::{ErrorHandler, Memo};
use crate::application::services::filter::{filter_entries, FilterState};
use crate::application::services::navigation::{ChangeValue, NavState, NavigationController, Outcome, RawOption};
use crate::application::services::options::OptionBuilder;
use crate::application::services::value::ValueResolver;
use crate::config::SelectConfig;
use crate::domain::{
    is_equivalent, ChangeReason, DomainError, Entry, EntryKind, FreeText, MaybeDeferred, Node, ResolvedValue,
    Selection, Target,
};
use crate::infrastructure::traits::{FilterPredicate, NavigationEvents, TreeSource};

pub struct TreeSelect<N: Node> {
    source: Rc<dyn TreeSource<N>>,
    predicate: Rc<dyn FilterPredicate<N>>,
    config: SelectConfig,
    nav: NavigationController<N>,
    builder: OptionBuilder<N>,
    values: ValueResolver<N>,
    options_memo: Memo<Option<N>, Vec<Entry<N>>>,
    value_memo: Memo<Selection<N>, ResolvedValue<N>>,
    on_error: Option<ErrorHandler>,
}

impl<N: Node> TreeSelect<N> {
    pub fn new(
        source: Rc<dyn TreeSource<N>>,
        predicate: Rc<dyn FilterPredicate<N>>,
        events: Rc<dyn NavigationEvents<N>>,
        config: SelectConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(NavState::new(None, config.multiple)));
        Self {
            nav: NavigationController::new(Rc::clone(&state), Rc::clone(&source), events),
            builder: OptionBuilder::new(Rc::clone(&source)),
            values: ValueResolver::new(Rc::clone(&source)),
            options_memo: Memo::new("options"),
            value_memo: Memo::new("value"),
            source,
            predicate,
            config,
            on_error: None,
        }
    }

    /// Route lookup failures to `handler` instead of returning them.
    pub fn with_on_error(mut self, handler: ErrorHandler) -> Self {
        self.options_memo = self.options_memo.with_on_error(Some(Rc::clone(&handler)));
        self.value_memo = self.value_memo.with_on_error(Some(Rc::clone(&handler)));
        self.on_error = Some(handler);
        self
    }

    pub fn with_branch(self, branch: Option<N>) -> Self {
        self.nav.set_branch(branch);
        self
    }

    pub fn with_selection(self, selection: Selection<N>) -> Self {
        self.nav.set_selection(selection);
        self
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn navigation(&self) -> &NavigationController<N> {
        &self.nav
    }

    pub fn branch(&self) -> Option<N> {
        self.nav.branch()
    }

    pub fn input(&self) -> String {
        self.nav.input()
    }

    pub fn selection(&self) -> Selection<N> {
        self.nav.selection()
    }

    /// Filtered entries for the active branch and input.
    ///
    /// Empty while the list is still loading. A failed lookup is returned as
    /// an error, or reported to the error handler and shown as no options.
    #[instrument(level = "debug", skip(self))]
    pub fn options(&self) -> ApplicationResult<Vec<Entry<N>>> {
        let branch = self.branch();
        let builder = self.builder.clone();
        let snapshot = self.options_memo.get(branch.clone(), || builder.build(branch.as_ref()));
        if let Some(e) = self.options_memo.error() {
            return self.fail(e);
        }
        let Some(mut entries) = snapshot.data else {
            debug!("options: still loading");
            return Ok(Vec::new());
        };

        let value = self.value()?;
        if self.config.free_solo {
            self.add_free_text(&mut entries, value.as_ref(), branch);
        }

        let input = self.input();
        let state = FilterState {
            input: &input,
            selected: value.as_ref().and_then(ResolvedValue::single),
        };
        Ok(filter_entries(entries, &state, self.source.as_ref(), self.predicate.as_ref()))
    }

    /// The held selection resolved to path-annotated entries; `None` while
    /// the resolution is pending.
    pub fn value(&self) -> ApplicationResult<Option<ResolvedValue<N>>> {
        let selection = self.selection();
        let values = &self.values;
        let snapshot = self.value_memo.get(selection.clone(), || values.resolve(&selection));
        if let Some(e) = self.value_memo.error() {
            return self.fail(e);
        }
        Ok(snapshot.data)
    }

    pub fn is_loading(&self) -> bool {
        self.options_memo.is_loading() || self.value_memo.is_loading()
    }

    /// Wait for every pending resolution to land.
    pub async fn settle(&self) {
        join!(self.options_memo.settle(), self.value_memo.settle());
    }

    /// Drop cached results so the next read repeats the lookups.
    pub fn reload(&self) {
        self.options_memo.invalidate();
        self.value_memo.invalidate();
    }

    pub fn handle_change(
        &self,
        value: ChangeValue<N>,
        reason: ChangeReason,
        option: Option<RawOption<N>>,
    ) -> Outcome<N> {
        self.nav.handle_change(value, reason, option)
    }

    /// Pick a listed entry the way a click would.
    ///
    /// Branch entries navigate. In multi mode a leaf toggles: an already
    /// held value is removed, anything else is appended. Picking a free-text
    /// entry is a create. A malformed free-text entry is reported and ignored.
    pub fn select(&self, entry: &Entry<N>) -> ApplicationResult<Outcome<N>> {
        if let Err(e) = entry.check_shape() {
            self.report(e)?;
            return Ok(Outcome::Ignored);
        }
        let picked = RawOption::Entry(entry.clone());
        let add_reason = if entry.is_free_text() {
            ChangeReason::Create
        } else {
            ChangeReason::Select
        };
        if entry.is_branch() || !self.config.multiple {
            let value = ChangeValue::Single(Some(picked.clone()));
            return Ok(self.handle_change(value, add_reason, Some(picked)));
        }

        let held = self.held_entries(&entry.path)?;
        let override_fn = |a: &Target<N>, b: &Target<N>| self.source.is_equivalent(a, b);
        let (removed, kept): (Vec<_>, Vec<_>) = held
            .into_iter()
            .partition(|e| is_equivalent(e, entry, Some(&override_fn)));

        let mut next: Vec<RawOption<N>> = kept.into_iter().map(RawOption::Entry).collect();
        let reason = if removed.is_empty() {
            next.push(picked.clone());
            add_reason
        } else {
            ChangeReason::Remove
        };
        Ok(self.handle_change(ChangeValue::Multiple(next), reason, Some(picked)))
    }

    /// Commit the typed text as a free-text value.
    pub fn create(&self, text: &str) -> ApplicationResult<Outcome<N>> {
        let raw = RawOption::Text(text.to_string());
        let value = if self.config.multiple {
            let mut next: Vec<RawOption<N>> = self.held_entries(&[])?.into_iter().map(RawOption::Entry).collect();
            next.push(raw.clone());
            ChangeValue::Multiple(next)
        } else {
            ChangeValue::Single(Some(raw.clone()))
        };
        Ok(self.handle_change(value, ChangeReason::Create, Some(raw)))
    }

    pub fn clear(&self) -> Outcome<N> {
        let value = if self.config.multiple {
            ChangeValue::Multiple(Vec::new())
        } else {
            ChangeValue::Single(None)
        };
        self.handle_change(value, ChangeReason::Clear, None)
    }

    /// Keyboard ascend from the active branch.
    ///
    /// With an error handler, a failed parent lookup is reported and the
    /// ascend resolves to `false`.
    pub fn ascend(&self) -> MaybeDeferred<bool> {
        let ascend = self.nav.ascend();
        match self.on_error.clone() {
            Some(handler) => ascend.or_else(move |e| {
                warn!("ascend: routing failure to error handler: {}", e);
                handler(&e);
                Ok(false)
            }),
            None => ascend,
        }
    }

    /// Controlled branch override.
    pub fn set_branch(&self, branch: Option<N>) {
        self.nav.set_branch(branch);
    }

    pub fn set_input(&self, input: &str) {
        self.nav.set_input(input);
    }

    pub fn should_close(&self, option: Option<&RawOption<N>>) -> bool {
        self.nav.should_close(option)
    }

    /// Display label of an entry.
    ///
    /// The ascend entry is labelled with its full path, the branch included.
    pub fn entry_label(&self, entry: &Entry<N>) -> String {
        match (&entry.kind, &entry.target) {
            (_, Target::FreeText(ft)) => ft.text.clone(),
            (EntryKind::UpBranch, Target::Node(node)) => {
                let mut path = Vec::with_capacity(entry.path.len() + 1);
                path.push(node.clone());
                path.extend(entry.path.iter().cloned());
                self.source.path_label(&path, true)
            }
            (_, Target::Node(node)) => self.source.option_label(node),
        }
    }

    /// Path label of the branch an entry was listed under.
    pub fn path_label(&self, entry: &Entry<N>) -> String {
        self.source.path_label(&entry.path, false)
    }

    fn add_free_text(&self, entries: &mut Vec<Entry<N>>, value: Option<&ResolvedValue<N>>, branch: Option<N>) {
        let listing_path = listing_path(entries, branch.as_ref());

        if let Some(ResolvedValue::Multiple(held)) = value {
            for entry in held {
                let owned = matches!(&entry.target, Target::FreeText(ft) if ft.branch == branch);
                if owned && !entries.contains(entry) {
                    entries.push(Entry::leaf(entry.target.clone(), listing_path.clone()));
                }
            }
        }

        let input = self.input();
        if input.trim().is_empty() {
            return;
        }
        let taken = entries
            .iter()
            .filter(|e| e.kind != EntryKind::UpBranch)
            .any(|e| self.entry_label(e) == input);
        if !taken {
            debug!("options: offering free text {:?}", input);
            entries.push(Entry::leaf(Target::FreeText(FreeText::new(input, branch)), listing_path));
        }
    }

    /// Held values as entries.
    ///
    /// While their paths are still resolving, held targets are placed at
    /// `listing_path` so they compare against the picked entry by target.
    fn held_entries(&self, listing_path: &[N]) -> ApplicationResult<Vec<Entry<N>>> {
        Ok(match self.value()? {
            Some(value) => value.entries().into_iter().cloned().collect(),
            None => {
                debug!("held values still resolving, matching by target");
                self.selection()
                    .targets()
                    .into_iter()
                    .map(|t| Entry::leaf(t.clone(), listing_path.to_vec()))
                    .collect()
            }
        })
    }

    /// Report a failure that did not pass through a memo.
    fn report(&self, error: DomainError) -> ApplicationResult<()> {
        match &self.on_error {
            Some(handler) => {
                warn!("routing failure to error handler: {}", error);
                handler(&error);
                Ok(())
            }
            None => Err(error.into()),
        }
    }

    fn fail<T: Default>(&self, error: DomainError) -> ApplicationResult<T> {
        match &self.on_error {
            // already reported when the failure landed
            Some(_) => Ok(T::default()),
            None => Err(error.into()),
        }
    }
}

/// `[branch, ..ancestors]`, read off the ascend entry.
fn listing_path<N: Node>(entries: &[Entry<N>], branch: Option<&N>) -> Vec<N> {
    let Some(branch) = branch else {
        return Vec::new();
    };
    let ancestors = entries
        .iter()
        .find(|e| e.kind == EntryKind::UpBranch)
        .map(|e| e.path.as_slice())
        .unwrap_or_default();
    std::iter::once(branch.clone()).chain(ancestors.iter().cloned()).collect()
}
