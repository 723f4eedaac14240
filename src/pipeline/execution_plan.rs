//! Execution plan with segments
//!
//! A plan is the ordered list of stage groups for one run. Adjacent stateless
//! stages share a segment and execute in one pass; every stateful stage is a
//! segment of its own. The terminal always forms the final group.

use super::stage::{BufferFn, ElementFn, Outcome, StageKind, StageState, Terminal};
use crate::config::StreamConfig;
use std::fmt::Write;

/// One element-wise stage inside a stateless segment, with its run state
pub struct OpStep<'p, T> {
    pub name: &'static str,
    action: &'p ElementFn<T>,
    pub state: StageState,
}

impl<'p, T> OpStep<'p, T> {
    pub(crate) fn new(name: &'static str, action: &'p ElementFn<T>, state: StageState) -> Self {
        OpStep { name, action, state }
    }

    #[inline]
    pub fn apply(&mut self, element: T, position: usize) -> Outcome<T> {
        (self.action)(element, position, &mut self.state)
    }
}

/// A whole-buffer stage
pub struct BufferStep<'p, T> {
    pub name: &'static str,
    action: &'p BufferFn<T>,
}

impl<'p, T> BufferStep<'p, T> {
    pub(crate) fn new(name: &'static str, action: &'p BufferFn<T>) -> Self {
        BufferStep { name, action }
    }

    pub fn apply(&self, buffer: Vec<T>, config: &StreamConfig) -> Vec<T> {
        (self.action)(buffer, config)
    }
}

/// A group of stages executed together
pub enum Segment<'p, T> {
    /// One or more stateless stages sharing a single pass
    Stateless(Vec<OpStep<'p, T>>),

    /// A single stateful stage
    Stateful(BufferStep<'p, T>),
}

impl<'p, T> Segment<'p, T> {
    pub fn kind(&self) -> StageKind {
        match self {
            Segment::Stateless(_) => StageKind::Stateless,
            Segment::Stateful(_) => StageKind::Stateful,
        }
    }

    /// Number of stages in this segment
    pub fn len(&self) -> usize {
        match self {
            Segment::Stateless(ops) => ops.len(),
            Segment::Stateful(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when more than one stage shares the pass
    pub fn is_fused(&self) -> bool {
        self.len() > 1
    }

    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Segment::Stateless(ops) => ops.iter().map(|op| op.name).collect(),
            Segment::Stateful(step) => vec![step.name],
        }
    }
}

/// Complete execution plan for one terminal call
pub struct ExecutionPlan<'p, 'r, T, O> {
    /// Intermediate segments, in execution order
    pub segments: Vec<Segment<'p, T>>,

    /// Final group
    pub terminal: Terminal<'r, T, O>,

    /// Reset hooks invoked while planning
    pub resets_invoked: usize,
}

impl<'p, 'r, T, O> ExecutionPlan<'p, 'r, T, O> {
    /// Number of groups, including the terminal
    pub fn len(&self) -> usize {
        self.segments.len() + 1
    }

    /// A plan always holds its terminal group
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Category of each group in order
    pub fn kinds(&self) -> Vec<StageKind> {
        self.segments
            .iter()
            .map(Segment::kind)
            .chain(std::iter::once(self.terminal.kind()))
            .collect()
    }

    /// Render as `Stateless[filter, map] -> Stateful[sort] -> NonShortcut[count]`
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let _ = write!(out, "{}[{}] -> ", segment.kind(), segment.names().join(", "));
        }
        let _ = write!(out, "{}[{}]", self.terminal.kind(), self.terminal.name());
        out
    }
}
