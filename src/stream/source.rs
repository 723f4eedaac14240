//! Pipeline sources
//!
//! A source yields a fresh owned buffer at the start of every run, so the
//! data a pipeline was built from is never mutated by execution.

use std::fmt;
use std::sync::Arc;

pub type Producer<T> = Arc<dyn Fn() -> Vec<T> + Send + Sync>;

/// Where a pipeline's elements come from
pub enum Source<T> {
    /// A fixed element list, shared between pipelines derived from it
    Items(Arc<[T]>),

    /// Elements computed on demand, e.g. the output of another pipeline
    Deferred(Producer<T>),
}

impl<T: Clone> Source<T> {
    pub fn items(items: Vec<T>) -> Self {
        Source::Items(Arc::from(items))
    }

    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        Source::Deferred(Arc::new(producer))
    }

    /// Produce the working buffer for one run
    pub fn materialize(&self) -> Vec<T> {
        match self {
            Source::Items(items) => items.to_vec(),
            Source::Deferred(producer) => producer(),
        }
    }
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::Items(items) => Source::Items(Arc::clone(items)),
            Source::Deferred(producer) => Source::Deferred(Arc::clone(producer)),
        }
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Items(items) => write!(f, "Items({})", items.len()),
            Source::Deferred(_) => f.write_str("Deferred"),
        }
    }
}
