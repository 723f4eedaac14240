//! Terminal operations
//!
//! Each terminal builds one `Terminal` descriptor, runs the pipeline with it,
//! and returns the descriptor's result. Non-shortcut terminals see the whole
//! final buffer; shortcut terminals are fed element by element and may
//! return before the end.

use super::pipeline::Pipeline;
use crate::pipeline::Terminal;
use std::fmt::{Display, Write};
use std::ops::ControlFlow;

impl<T> Pipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Number of elements produced
    pub fn count(&self) -> usize {
        self.run(Terminal::non_shortcut("count", |buffer: Vec<T>| buffer.len()))
            .value
    }

    /// Call `f` on every element, in order
    pub fn for_each<'r, F>(&self, mut f: F)
    where
        F: FnMut(T) + 'r,
    {
        self.run(Terminal::non_shortcut("for_each", move |buffer: Vec<T>| {
            for element in buffer {
                f(element);
            }
        }))
        .value
    }

    /// Fold left to right.
    ///
    /// The accumulator receives `(acc, element, index, length)`. An empty
    /// pipeline returns `init` unchanged.
    pub fn reduce<'r, R, F>(&self, mut accumulator: F, init: R) -> R
    where
        R: 'r,
        F: FnMut(R, T, usize, usize) -> R + 'r,
    {
        self.run(Terminal::non_shortcut("reduce", move |buffer: Vec<T>| {
            let len = buffer.len();
            buffer
                .into_iter()
                .enumerate()
                .fold(init, |acc, (index, element)| accumulator(acc, element, index, len))
        }))
        .value
    }

    /// Render every element with `separator` between neighbours
    pub fn join(&self, separator: &str) -> String
    where
        T: Display,
    {
        self.reduce(
            |mut out: String, element: T, index, len| {
                let _ = write!(out, "{}", element);
                if index + 1 < len {
                    out.push_str(separator);
                }
                out
            },
            String::new(),
        )
    }

    /// Collect the output into a new vector
    pub fn to_vec(&self) -> Vec<T> {
        self.run(Terminal::non_shortcut("to_vec", |buffer: Vec<T>| buffer))
            .value
    }

    /// True unless some element fails `predicate`; true when empty
    pub fn all_match<'r, P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool + 'r,
    {
        let probe = move |element: T, _| {
            if predicate(&element) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(false)
            }
        };
        self.run(Terminal::shortcut("all_match", probe, true)).value
    }

    /// True as soon as some element satisfies `predicate`
    pub fn any_match<'r, P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&T) -> bool + 'r,
    {
        let probe = move |element: T, _| {
            if predicate(&element) {
                ControlFlow::Break(true)
            } else {
                ControlFlow::Continue(())
            }
        };
        self.run(Terminal::shortcut("any_match", probe, false)).value
    }

    /// First element satisfying `predicate`
    pub fn find_first<'r, P>(&self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool + 'r,
    {
        let probe = move |element: T, _| {
            if predicate(&element) {
                ControlFlow::Break(Some(element))
            } else {
                ControlFlow::Continue(())
            }
        };
        self.run(Terminal::shortcut("find_first", probe, None)).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_count_and_to_vec() {
        let pipeline = Pipeline::of(&[5, 6, 7]).filter(|x| *x != 6);
        assert_eq!(pipeline.count(), 2);
        assert_eq!(pipeline.to_vec(), vec![5, 7]);
    }

    #[test]
    fn test_for_each_borrows_caller_state() {
        let mut seen = Vec::new();
        Pipeline::of(&[1, 2, 3]).map(|x| x * x).for_each(|x| seen.push(x));
        assert_eq!(seen, vec![1, 4, 9]);
    }

    #[test]
    fn test_reduce_passes_index_and_length() {
        let mut calls = Vec::new();
        let sum = Pipeline::of(&[10, 20, 30]).reduce(
            |acc, e, index, len| {
                calls.push((index, len));
                acc + e
            },
            0,
        );

        assert_eq!(sum, 60);
        assert_eq!(calls, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_reduce_empty_returns_init() {
        let init = String::from("untouched");
        let out = Pipeline::<i32>::empty().reduce(|acc: String, _, _, _| acc + "x", init.clone());
        assert_eq!(out, init);
    }

    #[test]
    fn test_join() {
        assert_eq!(Pipeline::of(&[1, 2, 3]).join(", "), "1, 2, 3");
        assert_eq!(Pipeline::of(&["solo"]).join("-"), "solo");
        assert_eq!(Pipeline::<i32>::empty().join(","), "");
    }

    #[test]
    fn test_all_match() {
        assert!(Pipeline::of(&[2, 4, 6]).all_match(|x| x % 2 == 0));
        assert!(!Pipeline::of(&[2, 3, 6]).all_match(|x| x % 2 == 0));
        assert!(Pipeline::<i32>::empty().all_match(|_| false));
    }

    #[test]
    fn test_any_match() {
        assert!(Pipeline::of(&[1, 3, 4]).any_match(|x| x % 2 == 0));
        assert!(!Pipeline::of(&[1, 3, 5]).any_match(|x| x % 2 == 0));
        assert!(!Pipeline::<i32>::empty().any_match(|_| true));
    }

    #[test]
    fn test_find_first() {
        let pipeline = Pipeline::of(&[1, 8, 3, 10]);
        assert_eq!(pipeline.find_first(|x| *x > 5), Some(8));
        assert_eq!(pipeline.find_first(|x| *x > 50), None);
    }

    #[test]
    fn test_shortcut_stops_probing() {
        let checked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&checked);
        let found = Pipeline::of(&[1, 2, 3, 4, 5]).any_match(move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            *x == 2
        });

        assert!(found);
        assert_eq!(checked.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_all_match_stops_at_first_failure() {
        let checked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&checked);
        let all_even = Pipeline::of(&[2, 4, 5, 6, 8]).all_match(move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            x % 2 == 0
        });

        assert!(!all_even);
        assert_eq!(checked.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_run_reports_stats() {
        let config = StreamConfig {
            collect_stats: true,
            ..StreamConfig::default()
        };
        let pipeline = Pipeline::of(&[1, 2, 3, 4, 5, 6])
            .with_config(config)
            .filter(|x| x % 2 == 0)
            .map(|x| x * 3)
            .limit(2);
        let result = pipeline.run(Terminal::non_shortcut("sum", |b: Vec<i32>| b.iter().sum::<i32>()));

        assert_eq!(result.value, 18);
        assert_eq!(result.stats.segments_executed, 1);
        assert_eq!(result.stats.segments_fused, 1);
        assert_eq!(result.stats.elements_visited, 4);
        assert_eq!(result.stats.early_exits, 1);
        assert_eq!(result.stats.resets_invoked, 1);
    }
}
