//! Stage descriptors
//!
//! A pipeline is a linear sequence of stages followed by one terminal:
//! `source -> stage1 -> stage2 -> ... -> terminal`. Each descriptor carries
//! its category, which the planner uses for grouping and the executor uses
//! to pick the input/output contract of the action.

use crate::config::StreamConfig;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Execution category of a stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Element-wise, fusable with adjacent stateless stages
    Stateless,

    /// Needs the whole buffer at once (sort, reverse, unique, ...)
    Stateful,

    /// Terminal that always consumes the whole buffer
    NonShortcut,

    /// Terminal that may stop before the end of the buffer
    Shortcut,
}

impl StageKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, StageKind::NonShortcut | StageKind::Shortcut)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageKind::Stateless => "Stateless",
            StageKind::Stateful => "Stateful",
            StageKind::NonShortcut => "NonShortcut",
            StageKind::Shortcut => "Shortcut",
        };
        f.write_str(label)
    }
}

/// Control signal returned alongside every element-wise result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// End the current pass after this element
    Stop,
}

/// Result of applying a stateless action to one element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome<T> {
    /// `None` drops the element; later actions in the group do not see it.
    pub value: Option<T>,
    pub flow: Flow,
}

impl<T> Outcome<T> {
    pub fn keep(value: T) -> Self {
        Outcome { value: Some(value), flow: Flow::Continue }
    }

    pub fn discard() -> Self {
        Outcome { value: None, flow: Flow::Continue }
    }

    pub fn keep_and_stop(value: T) -> Self {
        Outcome { value: Some(value), flow: Flow::Stop }
    }

    pub fn discard_and_stop() -> Self {
        Outcome { value: None, flow: Flow::Stop }
    }

    pub fn is_stop(&self) -> bool {
        self.flow == Flow::Stop
    }
}

/// Scratch state owned by one stage for one run.
///
/// A fresh value is produced by the stage's reset hook every time a terminal
/// operation plans the pipeline, so runs never observe each other's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageState {
    pub count: usize,
}

impl StageState {
    /// Reset hook for counter-based stages.
    pub fn zeroed() -> Self {
        StageState { count: 0 }
    }
}

pub type ElementFn<T> = Arc<dyn Fn(T, usize, &mut StageState) -> Outcome<T> + Send + Sync>;
pub type BufferFn<T> = Arc<dyn Fn(Vec<T>, &StreamConfig) -> Vec<T> + Send + Sync>;
pub type ResetFn = fn() -> StageState;

/// The action of an intermediate stage. Its variant fixes the stage category.
pub enum StageAction<T> {
    /// `(element, position, state) -> outcome`
    Element(ElementFn<T>),
    /// `(buffer, run config) -> buffer`
    Buffer(BufferFn<T>),
}

impl<T> Clone for StageAction<T> {
    fn clone(&self) -> Self {
        match self {
            StageAction::Element(f) => StageAction::Element(Arc::clone(f)),
            StageAction::Buffer(f) => StageAction::Buffer(Arc::clone(f)),
        }
    }
}

/// An intermediate operation declared on a pipeline
pub struct Stage<T> {
    name: &'static str,
    action: StageAction<T>,
    reset: Option<ResetFn>,
}

impl<T> Stage<T> {
    /// Element-wise stage. The action receives the element, its position in
    /// the pass, and this stage's per-run state.
    pub fn stateless<F>(name: &'static str, action: F) -> Self
    where
        F: Fn(T, usize, &mut StageState) -> Outcome<T> + Send + Sync + 'static,
    {
        Stage {
            name,
            action: StageAction::Element(Arc::new(action)),
            reset: None,
        }
    }

    /// Whole-buffer stage. The action receives the current buffer and returns
    /// its replacement.
    pub fn stateful<F>(name: &'static str, action: F) -> Self
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        Self::configured(name, move |buffer: Vec<T>, _: &StreamConfig| action(buffer))
    }

    /// Whole-buffer stage that also reads the configuration of the run
    /// executing it.
    pub fn configured<F>(name: &'static str, action: F) -> Self
    where
        F: Fn(Vec<T>, &StreamConfig) -> Vec<T> + Send + Sync + 'static,
    {
        Stage {
            name,
            action: StageAction::Buffer(Arc::new(action)),
            reset: None,
        }
    }

    /// Attach a reset hook, called once per run before execution.
    pub fn with_reset(mut self, reset: ResetFn) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> StageKind {
        match self.action {
            StageAction::Element(_) => StageKind::Stateless,
            StageAction::Buffer(_) => StageKind::Stateful,
        }
    }

    pub fn action(&self) -> &StageAction<T> {
        &self.action
    }

    pub fn reset_hook(&self) -> Option<ResetFn> {
        self.reset
    }
}

impl<T> Clone for Stage<T> {
    fn clone(&self) -> Self {
        Stage {
            name: self.name,
            action: self.action.clone(),
            reset: self.reset,
        }
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("reset", &self.reset.is_some())
            .finish()
    }
}

/// The consuming operation that ends a run and produces its result.
///
/// Terminals are never stored on a pipeline; one is built per call and may
/// borrow from the caller for the duration of the run.
pub enum Terminal<'r, T, O> {
    NonShortcut {
        name: &'static str,
        consume: Box<dyn FnOnce(Vec<T>) -> O + 'r>,
    },
    Shortcut {
        name: &'static str,
        /// Called per element until it breaks with the result
        probe: Box<dyn FnMut(T, usize) -> ControlFlow<O> + 'r>,
        /// Result when the buffer is exhausted without a break
        exhausted: O,
    },
}

impl<'r, T, O> Terminal<'r, T, O> {
    pub fn non_shortcut<F>(name: &'static str, consume: F) -> Self
    where
        F: FnOnce(Vec<T>) -> O + 'r,
    {
        Terminal::NonShortcut {
            name,
            consume: Box::new(consume),
        }
    }

    pub fn shortcut<F>(name: &'static str, probe: F, exhausted: O) -> Self
    where
        F: FnMut(T, usize) -> ControlFlow<O> + 'r,
    {
        Terminal::Shortcut {
            name,
            probe: Box::new(probe),
            exhausted,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Terminal::NonShortcut { name, .. } | Terminal::Shortcut { name, .. } => *name,
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Terminal::NonShortcut { .. } => StageKind::NonShortcut,
            Terminal::Shortcut { .. } => StageKind::Shortcut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_follows_action() {
        let filter: Stage<i32> = Stage::stateless("filter", |e, _, _| Outcome::keep(e));
        let sort: Stage<i32> = Stage::stateful("sort", |mut b: Vec<i32>| {
            b.sort();
            b
        });

        assert_eq!(filter.kind(), StageKind::Stateless);
        assert_eq!(sort.kind(), StageKind::Stateful);
        assert!(filter.reset_hook().is_none());
    }

    #[test]
    fn test_reset_hook_attached() {
        let limit: Stage<i32> =
            Stage::stateless("limit", |e, _, _| Outcome::keep(e)).with_reset(StageState::zeroed);
        let hook = limit.reset_hook().unwrap();
        assert_eq!(hook(), StageState { count: 0 });
    }

    #[test]
    fn test_outcome_constructors() {
        assert_eq!(Outcome::keep(1).value, Some(1));
        assert!(!Outcome::keep(1).is_stop());
        assert!(Outcome::<i32>::discard().value.is_none());
        assert!(Outcome::keep_and_stop(1).is_stop());
        assert!(Outcome::<i32>::discard_and_stop().is_stop());
    }

    #[test]
    fn test_terminal_kinds() {
        let count: Terminal<'_, i32, usize> = Terminal::non_shortcut("count", |b: Vec<i32>| b.len());
        let any: Terminal<'_, i32, bool> =
            Terminal::shortcut("any_match", |_, _| ControlFlow::Break(true), false);

        assert_eq!(count.kind(), StageKind::NonShortcut);
        assert_eq!(any.kind(), StageKind::Shortcut);
        assert!(any.kind().is_terminal());
        assert!(!StageKind::Stateful.is_terminal());
        assert_eq!(count.name(), "count");
    }

    #[test]
    fn test_cloned_stage_shares_action() {
        let stage: Stage<i32> = Stage::stateless("map", |e, _, _| Outcome::keep(e * 2));
        let copy = stage.clone();
        if let StageAction::Element(f) = copy.action() {
            let mut state = StageState::default();
            assert_eq!(f(21, 0, &mut state).value, Some(42));
        } else {
            panic!("Expected element action");
        }
    }
}
