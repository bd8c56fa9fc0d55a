//! Branch navigation state machine
//!
//! States are the root level (`branch == None`) and one active branch.
//! Selecting a `DownBranch` entry descends, selecting an `UpBranch` entry
//! ascends, anything else is a value commit. Branch changes reset the input
//! text. A controlled caller may force the branch at any time through
//! [`NavigationController::set_branch`]; forced branches are not validated.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, instrument, warn};

use crate::domain::{
    ChangeReason, CommitDetails, Direction, Entry, EntryKind, FreeText, MaybeDeferred, Node, Selection, Target,
};
use crate::infrastructure::traits::{NavigationEvents, TreeSource};

/// An option as delivered by a change event: a listed entry or raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOption<N> {
    Entry(Entry<N>),
    Text(String),
}

impl<N> RawOption<N> {
    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Entry(e) if e.is_branch())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// New value carried by a change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeValue<N> {
    Single(Option<RawOption<N>>),
    Multiple(Vec<RawOption<N>>),
}

/// What a change event resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<N> {
    Navigated { branch: Option<N>, direction: Direction },
    Committed(Selection<N>),
    Ignored,
}

/// State shared between the controller and its observers.
#[derive(Debug, Clone)]
pub struct NavState<N> {
    pub branch: Option<N>,
    /// Bumped on every branch change, forced or navigated.
    pub version: u64,
    pub input: String,
    pub selection: Selection<N>,
}

impl<N> NavState<N> {
    pub fn new(branch: Option<N>, multiple: bool) -> Self {
        Self {
            branch,
            version: 0,
            input: String::new(),
            selection: Selection::empty(multiple),
        }
    }
}

pub struct NavigationController<N: Node> {
    state: Rc<RefCell<NavState<N>>>,
    source: Rc<dyn TreeSource<N>>,
    events: Rc<dyn NavigationEvents<N>>,
}

impl<N: Node> NavigationController<N> {
    pub fn new(
        state: Rc<RefCell<NavState<N>>>,
        source: Rc<dyn TreeSource<N>>,
        events: Rc<dyn NavigationEvents<N>>,
    ) -> Self {
        Self { state, source, events }
    }

    pub fn branch(&self) -> Option<N> {
        self.state.borrow().branch.clone()
    }

    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    pub fn input(&self) -> String {
        self.state.borrow().input.clone()
    }

    pub fn selection(&self) -> Selection<N> {
        self.state.borrow().selection.clone()
    }

    /// Dispatch a change event.
    ///
    /// `option` is the option that triggered the change (the added or
    /// removed item). It defaults to the new value in single mode, and to
    /// the last held value for a blur in multi mode.
    #[instrument(level = "debug", skip(self))]
    pub fn handle_change(
        &self,
        value: ChangeValue<N>,
        reason: ChangeReason,
        option: Option<RawOption<N>>,
    ) -> Outcome<N> {
        let option = option.or_else(|| match &value {
            ChangeValue::Single(v) => v.clone(),
            ChangeValue::Multiple(v) if reason == ChangeReason::Blur => v.last().cloned(),
            ChangeValue::Multiple(_) => None,
        });

        let (reason, from_blur) = match reason {
            ChangeReason::Blur => match &option {
                Some(RawOption::Text(_)) => (ChangeReason::Create, true),
                Some(RawOption::Entry(_)) => (ChangeReason::Select, true),
                None => {
                    debug!("blur without option, nothing to commit");
                    return Outcome::Ignored;
                }
            },
            other => (other, false),
        };

        if let Some(RawOption::Entry(entry)) = &option {
            if matches!(reason, ChangeReason::Select | ChangeReason::Create) {
                match entry.kind {
                    EntryKind::DownBranch => return self.descend(entry),
                    EntryKind::UpBranch => return self.ascend_from(entry),
                    EntryKind::Leaf => {}
                }
            }
        }

        self.commit(value, reason, option, from_blur)
    }

    /// Whether a close request for `option` should go through.
    ///
    /// Branch entries keep the list open so navigation can complete.
    pub fn should_close(&self, option: Option<&RawOption<N>>) -> bool {
        !option.is_some_and(RawOption::is_branch)
    }

    /// Close request; notifies listeners unless suppressed.
    pub fn close(&self, option: Option<&RawOption<N>>) -> bool {
        let close = self.should_close(option);
        if close {
            self.events.on_close();
        } else {
            debug!("close suppressed for branch entry");
        }
        close
    }

    /// Move into the node of a `DownBranch` entry.
    pub fn descend(&self, entry: &Entry<N>) -> Outcome<N> {
        match entry.node() {
            Some(node) => self.move_to(Some(node.clone()), Direction::Down),
            None => Outcome::Ignored,
        }
    }

    /// Move to the parent of an `UpBranch` entry's node.
    ///
    /// The entry already carries the ancestor chain, so no lookup happens.
    pub fn ascend_from(&self, entry: &Entry<N>) -> Outcome<N> {
        self.move_to(entry.path.first().cloned(), Direction::Up)
    }

    /// Keyboard ascend from the active branch.
    ///
    /// Resolves to `true` when the move was applied. A deferred parent lookup
    /// that finishes after the branch changed again is dropped.
    pub fn ascend(&self) -> MaybeDeferred<bool> {
        let (branch, version) = {
            let state = self.state.borrow();
            (state.branch.clone(), state.version)
        };
        let Some(branch) = branch else {
            return MaybeDeferred::ready(false);
        };

        let this = self.clone();
        self.source.parent(&branch).map(move |parent| {
            if this.version() != version {
                warn!("ascend: branch changed while resolving parent of {:?}, dropping", branch);
                return false;
            }
            this.move_to(parent, Direction::Up);
            true
        })
    }

    /// Controlled override. Accepted as is; no events, no validation.
    pub fn set_branch(&self, branch: Option<N>) {
        let mut state = self.state.borrow_mut();
        debug!("set_branch: {:?} -> {:?}", state.branch, branch);
        state.branch = branch;
        state.version += 1;
    }

    pub fn set_input(&self, input: &str) {
        self.state.borrow_mut().input = input.to_string();
        self.events.on_input_change(input);
    }

    /// Replace the held selection without firing a change.
    pub fn set_selection(&self, selection: Selection<N>) {
        self.state.borrow_mut().selection = selection;
    }

    fn move_to(&self, branch: Option<N>, direction: Direction) -> Outcome<N> {
        {
            let mut state = self.state.borrow_mut();
            debug!("navigate {}: {:?} -> {:?}", direction, state.branch, branch);
            state.branch = branch.clone();
            state.version += 1;
            state.input.clear();
        }
        self.events.on_branch_change(branch.as_ref(), direction);
        self.events.on_input_change("");
        Outcome::Navigated { branch, direction }
    }

    fn commit(
        &self,
        value: ChangeValue<N>,
        reason: ChangeReason,
        option: Option<RawOption<N>>,
        from_blur: bool,
    ) -> Outcome<N> {
        let branch = self.branch();
        let to_target = |raw: RawOption<N>| match raw {
            RawOption::Entry(entry) => entry.into_target(),
            RawOption::Text(text) => Target::FreeText(FreeText::new(text, branch.clone())),
        };

        let selection = match value {
            ChangeValue::Single(v) => Selection::Single(v.filter(|o| !o.is_branch()).map(&to_target)),
            ChangeValue::Multiple(vs) => {
                Selection::Multiple(vs.into_iter().filter(|o| !o.is_branch()).map(&to_target).collect())
            }
        };
        let details = CommitDetails {
            option: option.map(&to_target),
            from_blur,
        };

        debug!("commit {}: {:?}", reason, selection);
        self.state.borrow_mut().selection = selection.clone();
        self.events.on_value_change(&selection, reason, &details);
        Outcome::Committed(selection)
    }
}

impl<N: Node> Clone for NavigationController<N> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            source: Rc::clone(&self.source),
            events: Rc::clone(&self.events),
        }
    }
}
