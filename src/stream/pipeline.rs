//! Immutable pipeline builder
//!
//! Every intermediate operation returns a new `Pipeline` holding a copy of the
//! receiver's stage list with one stage appended. Nothing runs until a
//! terminal operation is called, and the receiver stays usable afterwards, so
//! one base pipeline can branch into any number of continuations.

use super::source::Source;
use crate::config::StreamConfig;
use crate::pipeline::{ExecutionResult, Executor, Outcome, Planner, Stage, StageState, Terminal};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A lazily evaluated chain of stages over a source
pub struct Pipeline<T> {
    source: Source<T>,
    stages: Vec<Stage<T>>,
    config: Arc<StreamConfig>,
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Pipeline {
            source: self.source.clone(),
            stages: self.stages.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source)
            .field("stages", &self.stages)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Pipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from_source(source: Source<T>, config: Arc<StreamConfig>) -> Self {
        Pipeline {
            source,
            stages: Vec::new(),
            config,
        }
    }

    /// Pipeline over a copy of `items`
    pub fn of(items: &[T]) -> Self {
        Self::from_vec(items.to_vec())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_source(Source::items(items), Arc::new(StreamConfig::default()))
    }

    /// Pipeline over `times` copies of `value`
    pub fn repeat(value: T, times: usize) -> Self {
        Self::from_vec(vec![value; times])
    }

    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Append a caller-defined stage
    pub fn stage(&self, stage: Stage<T>) -> Self {
        let mut stages = Vec::with_capacity(self.stages.len() + 1);
        stages.extend(self.stages.iter().cloned());
        stages.push(stage);
        Pipeline {
            source: self.source.clone(),
            stages,
            config: Arc::clone(&self.config),
        }
    }

    /// Same source and stages, different execution configuration.
    ///
    /// Every setting, including `stable_sort` for stages declared earlier,
    /// is read when a terminal runs.
    pub fn with_config(&self, config: impl Into<Arc<StreamConfig>>) -> Self {
        Pipeline {
            source: self.source.clone(),
            stages: self.stages.clone(),
            config: config.into(),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn stages(&self) -> &[Stage<T>] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Plan and execute the stage list followed by `terminal`.
    ///
    /// Each call plans afresh, so stage state never leaks between runs.
    pub fn run<O>(&self, terminal: Terminal<'_, T, O>) -> ExecutionResult<O> {
        let plan = Planner::plan(&self.stages, terminal, &self.config);
        let mut executor = Executor::with_config(&self.config);
        executor.execute(plan, self.source.materialize())
    }

    /// Render the plan a `to_vec` call would execute
    pub fn explain(&self) -> String {
        let terminal = Terminal::non_shortcut("to_vec", |buffer: Vec<T>| buffer);
        Planner::plan(&self.stages, terminal, &self.config).describe()
    }

    // ---------------------------------------------------------------------
    // Stateless stages
    // ---------------------------------------------------------------------

    /// Keep elements for which `predicate` holds
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.stage(Stage::stateless("filter", move |element: T, _, _: &mut StageState| {
            if predicate(&element) {
                Outcome::keep(element)
            } else {
                Outcome::discard()
            }
        }))
    }

    /// Replace each element with `f(element)`
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.stage(Stage::stateless("map", move |element: T, _, _: &mut StageState| {
            Outcome::keep(f(element))
        }))
    }

    /// Change the element type.
    ///
    /// The returned pipeline's source is this pipeline's output with `f`
    /// applied while it is collected. It starts with an empty stage list.
    pub fn map_into<U, F>(&self, f: F) -> Pipeline<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let source = Source::deferred(move || {
            let terminal = Terminal::non_shortcut("map_into", |buffer: Vec<T>| {
                buffer.into_iter().map(&f).collect::<Vec<U>>()
            });
            upstream.run(terminal).value
        });
        Pipeline::from_source(source, Arc::clone(&self.config))
    }

    /// Drop the first `n` elements that reach this stage.
    ///
    /// The count runs over the elements this stage receives, not their
    /// position in the source: `filter(even).skip(1)` over `1..=6` yields
    /// `[4, 6]`.
    pub fn skip(&self, n: usize) -> Self {
        let stage = Stage::stateless("skip", move |element: T, _, state: &mut StageState| {
            if state.count < n {
                state.count += 1;
                Outcome::discard()
            } else {
                Outcome::keep(element)
            }
        });
        self.stage(stage.with_reset(StageState::zeroed))
    }

    /// Keep at most `n` elements, stopping the pass once the n-th is kept
    pub fn limit(&self, n: usize) -> Self {
        let stage = Stage::stateless("limit", move |element: T, _, state: &mut StageState| {
            if state.count >= n {
                return Outcome::discard_and_stop();
            }
            state.count += 1;
            if state.count == n {
                Outcome::keep_and_stop(element)
            } else {
                Outcome::keep(element)
            }
        });
        self.stage(stage.with_reset(StageState::zeroed))
    }

    /// `skip(start)` followed by `limit(count)`
    pub fn slice(&self, start: usize, count: usize) -> Self {
        self.skip(start).limit(count)
    }

    /// Replace every element with a copy of `value`
    pub fn fill(&self, value: T) -> Self {
        self.stage(Stage::stateless("fill", move |_: T, _, _: &mut StageState| {
            Outcome::keep(value.clone())
        }))
    }

    // ---------------------------------------------------------------------
    // Stateful stages
    // ---------------------------------------------------------------------

    /// Sort the whole buffer with `compare`.
    ///
    /// Stability follows `stable_sort` of the configuration the run executes
    /// with, so a later `with_config` applies.
    pub fn sort<C>(&self, compare: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.stage(Stage::configured("sort", move |mut buffer: Vec<T>, config: &StreamConfig| {
            if config.stable_sort {
                buffer.sort_by(|a, b| compare(a, b));
            } else {
                buffer.sort_unstable_by(|a, b| compare(a, b));
            }
            buffer
        }))
    }

    pub fn reverse(&self) -> Self {
        self.stage(Stage::stateful("reverse", |mut buffer: Vec<T>| {
            buffer.reverse();
            buffer
        }))
    }

    /// Keep the first element for each key, in original order.
    ///
    /// Distinct elements sharing a key are treated as duplicates.
    pub fn unique<K, F>(&self, key: F) -> Self
    where
        K: Hash + Eq + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.stage(Stage::stateful("unique", move |mut buffer: Vec<T>| {
            let mut seen = HashSet::with_capacity(buffer.len());
            buffer.retain(|element| seen.insert(key(element)));
            buffer
        }))
    }

    /// Append `value` to the end of the buffer
    pub fn push(&self, value: T) -> Self {
        self.stage(Stage::stateful("push", move |mut buffer: Vec<T>| {
            buffer.push(value.clone());
            buffer
        }))
    }

    /// Prepend `value` to the front of the buffer
    pub fn unshift(&self, value: T) -> Self {
        self.stage(Stage::stateful("unshift", move |mut buffer: Vec<T>| {
            buffer.insert(0, value.clone());
            buffer
        }))
    }

    /// Drop the last element; no-op on an empty buffer
    pub fn pop(&self) -> Self {
        self.stage(Stage::stateful("pop", |mut buffer: Vec<T>| {
            buffer.pop();
            buffer
        }))
    }

    /// Drop the first element; no-op on an empty buffer
    pub fn shift(&self) -> Self {
        self.stage(Stage::stateful("shift", |mut buffer: Vec<T>| {
            if !buffer.is_empty() {
                buffer.remove(0);
            }
            buffer
        }))
    }

    // ---------------------------------------------------------------------
    // Structural
    // ---------------------------------------------------------------------

    /// This pipeline's full output followed by `other`'s full output.
    ///
    /// Each side runs its own stages before the two results are joined; the
    /// returned pipeline has an empty stage list and this pipeline's config.
    pub fn concat(&self, other: &Pipeline<T>) -> Self {
        if self.stages.is_empty() && other.stages.is_empty() {
            if let (Source::Items(a), Source::Items(b)) = (&self.source, &other.source) {
                let mut items = Vec::with_capacity(a.len() + b.len());
                items.extend_from_slice(a);
                items.extend_from_slice(b);
                return Self::from_source(Source::items(items), Arc::clone(&self.config));
            }
        }

        let left = self.clone();
        let right = other.clone();
        let source = Source::deferred(move || {
            let mut out = left.to_vec();
            out.extend(right.to_vec());
            out
        });
        Self::from_source(source, Arc::clone(&self.config))
    }
}

impl<T> From<Vec<T>> for Pipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from(items: Vec<T>) -> Self {
        Pipeline::from_vec(items)
    }
}

impl<T> FromIterator<T> for Pipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Pipeline::from_vec(iter.into_iter().collect())
    }
}
