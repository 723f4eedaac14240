//! Pipeline executor
//!
//! Runs an ExecutionPlan segment by segment against a working buffer, then
//! hands the final buffer to the terminal group.

use super::execution_plan::{ExecutionPlan, OpStep, Segment};
use super::stage::Terminal;
use crate::config::StreamConfig;
use std::ops::ControlFlow;

/// Execution statistics, recorded when `collect_stats` is enabled
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Number of intermediate segments executed
    pub segments_executed: usize,

    /// Segments where more than one stage shared a pass
    pub segments_fused: usize,

    /// Working buffers allocated by stateless passes
    pub buffers_allocated: usize,

    /// Elements handed to the first stage of a stateless pass
    pub elements_visited: usize,

    /// Passes (or shortcut terminals) that ended before the buffer did
    pub early_exits: usize,

    /// Reset hooks invoked by the planner for this run
    pub resets_invoked: usize,
}

/// Pipeline executor
pub struct Executor {
    stats: ExecutionStats,

    /// Configuration of the run, handed to whole-buffer stages
    config: StreamConfig,
}

impl Executor {
    /// Create an executor that records statistics
    pub fn new() -> Self {
        Executor {
            stats: ExecutionStats::default(),
            config: StreamConfig {
                collect_stats: true,
                ..StreamConfig::default()
            },
        }
    }

    pub fn with_config(config: &StreamConfig) -> Self {
        Executor {
            stats: ExecutionStats::default(),
            config: config.clone(),
        }
    }

    /// Execute a plan on an input buffer
    pub fn execute<T, O>(
        &mut self,
        plan: ExecutionPlan<'_, '_, T, O>,
        input: Vec<T>,
    ) -> ExecutionResult<O> {
        let ExecutionPlan {
            segments,
            terminal,
            resets_invoked,
        } = plan;

        if self.config.collect_stats {
            self.stats.resets_invoked += resets_invoked;
        }

        let mut buffer = input;
        for segment in segments {
            buffer = self.execute_segment(segment, buffer);
            if self.config.collect_stats {
                self.stats.segments_executed += 1;
            }
        }

        let value = self.execute_terminal(terminal, buffer);

        ExecutionResult {
            value,
            stats: self.stats.clone(),
        }
    }

    /// Execute a single segment
    fn execute_segment<T>(&mut self, segment: Segment<'_, T>, buffer: Vec<T>) -> Vec<T> {
        match segment {
            Segment::Stateless(mut ops) => {
                if self.config.collect_stats && ops.len() > 1 {
                    self.stats.segments_fused += 1;
                }
                self.execute_stateless(&mut ops, buffer)
            }
            Segment::Stateful(step) => {
                log::trace!("stateful '{}' over {} elements", step.name, buffer.len());
                step.apply(buffer, &self.config)
            }
        }
    }

    /// One left-to-right pass applying every op of the segment per element.
    ///
    /// An op that drops the element ends the chain for that element. An op
    /// that signals stop ends the pass once the current element is handled.
    fn execute_stateless<T>(&mut self, ops: &mut [OpStep<'_, T>], buffer: Vec<T>) -> Vec<T> {
        let input_len = buffer.len();
        let mut out = Vec::with_capacity(input_len);
        let mut visited = 0;
        let mut stopped = false;

        for (position, element) in buffer.into_iter().enumerate() {
            visited += 1;
            let mut current = Some(element);
            let mut stop = false;

            for op in ops.iter_mut() {
                let Some(value) = current.take() else {
                    break;
                };
                let outcome = op.apply(value, position);
                stop |= outcome.is_stop();
                current = outcome.value;
            }

            if let Some(value) = current {
                out.push(value);
            }
            if stop {
                stopped = true;
                break;
            }
        }

        log::trace!(
            "stateless pass [{}] kept {}/{} elements",
            ops.iter().map(|op| op.name).collect::<Vec<_>>().join(", "),
            out.len(),
            input_len
        );
        if stopped {
            log::debug!("stateless pass stopped early after {} of {} elements", visited, input_len);
        }

        if self.config.collect_stats {
            self.stats.buffers_allocated += 1;
            self.stats.elements_visited += visited;
            if stopped {
                self.stats.early_exits += 1;
            }
        }

        out
    }

    /// Execute the terminal group and produce the run's result
    fn execute_terminal<T, O>(&mut self, terminal: Terminal<'_, T, O>, buffer: Vec<T>) -> O {
        match terminal {
            Terminal::NonShortcut { name, consume } => {
                log::trace!("terminal '{}' over {} elements", name, buffer.len());
                consume(buffer)
            }
            Terminal::Shortcut {
                name,
                mut probe,
                exhausted,
            } => {
                let len = buffer.len();
                for (position, element) in buffer.into_iter().enumerate() {
                    if let ControlFlow::Break(value) = probe(element, position) {
                        log::debug!("terminal '{}' short-circuited at {} of {}", name, position, len);
                        if self.config.collect_stats {
                            self.stats.early_exits += 1;
                        }
                        return value;
                    }
                }
                exhausted
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct ExecutionResult<O> {
    pub value: O,
    pub stats: ExecutionStats,
}
