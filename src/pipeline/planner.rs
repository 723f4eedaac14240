//! Pipeline planner
//!
//! Converts a declared stage list plus one terminal into an ExecutionPlan by:
//! 1. Invoking each stage's reset hook once, in declaration order
//! 2. Merging adjacent stateless stages into one segment
//! 3. Splitting at every stateful stage, which always stands alone

use super::execution_plan::{BufferStep, ExecutionPlan, OpStep, Segment};
use super::stage::{Stage, StageAction, StageState, Terminal};
use crate::config::StreamConfig;

/// Pipeline planner
pub struct Planner<'p, T> {
    /// Whether adjacent stateless stages may share a pass
    fusion: bool,

    /// Stateless segment being built
    current_segment: Option<Vec<OpStep<'p, T>>>,

    /// Completed segments
    segments: Vec<Segment<'p, T>>,

    resets_invoked: usize,
}

impl<'p, T> Planner<'p, T> {
    pub fn new(config: &StreamConfig) -> Self {
        Planner {
            fusion: config.fusion,
            current_segment: None,
            segments: Vec::new(),
            resets_invoked: 0,
        }
    }

    /// Plan a stage list and its terminal into an execution plan
    pub fn plan<'r, O>(
        stages: &'p [Stage<T>],
        terminal: Terminal<'r, T, O>,
        config: &StreamConfig,
    ) -> ExecutionPlan<'p, 'r, T, O> {
        let mut planner = Planner::new(config);

        for stage in stages {
            planner.process_stage(stage);
        }

        // Flush any remaining segment
        planner.flush_segment();

        let plan = ExecutionPlan {
            segments: planner.segments,
            terminal,
            resets_invoked: planner.resets_invoked,
        };

        log::debug!(
            "planned {} stages into {} groups ({} resets)",
            stages.len(),
            plan.len(),
            plan.resets_invoked
        );
        if config.log_plans {
            log::debug!("plan: {}", plan.describe());
        }

        plan
    }

    /// Process a single stage
    fn process_stage(&mut self, stage: &'p Stage<T>) {
        let state = self.fresh_state(stage);

        match stage.action() {
            StageAction::Element(action) => {
                if !self.fusion {
                    self.flush_segment();
                }
                self.current_segment
                    .get_or_insert_with(Vec::new)
                    .push(OpStep::new(stage.name(), action, state));
            }

            StageAction::Buffer(action) => {
                // Whole-buffer stages are a boundary on both sides
                self.flush_segment();
                self.segments
                    .push(Segment::Stateful(BufferStep::new(stage.name(), action)));
            }
        }
    }

    /// Run the stage's reset hook, if any, to get its state for this run
    fn fresh_state(&mut self, stage: &Stage<T>) -> StageState {
        match stage.reset_hook() {
            Some(reset) => {
                self.resets_invoked += 1;
                reset()
            }
            None => StageState::default(),
        }
    }

    /// Flush current segment to completed list
    fn flush_segment(&mut self) {
        if let Some(ops) = self.current_segment.take() {
            if !ops.is_empty() {
                self.segments.push(Segment::Stateless(ops));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::{Outcome, StageKind};

    fn filter() -> Stage<i32> {
        Stage::stateless("filter", |e, _, _| Outcome::keep(e))
    }

    fn map() -> Stage<i32> {
        Stage::stateless("map", |e, _, _| Outcome::keep(e))
    }

    fn sort() -> Stage<i32> {
        Stage::stateful("sort", |mut b: Vec<i32>| {
            b.sort();
            b
        })
    }

    fn count<'r>() -> Terminal<'r, i32, usize> {
        Terminal::non_shortcut("count", |b: Vec<i32>| b.len())
    }

    #[test]
    fn test_adjacent_stateless_fuse() {
        let stages = vec![filter(), map(), filter()];
        let plan = Planner::plan(&stages, count(), &StreamConfig::default());

        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.segments[0].len(), 3);
        assert_eq!(plan.kinds(), vec![StageKind::Stateless, StageKind::NonShortcut]);
    }

    #[test]
    fn test_stateful_splits_segment() {
        let stages = vec![filter(), sort(), map(), map()];
        let plan = Planner::plan(&stages, count(), &StreamConfig::default());

        // [filter] [sort] [map, map] [count]
        assert_eq!(
            plan.kinds(),
            vec![
                StageKind::Stateless,
                StageKind::Stateful,
                StageKind::Stateless,
                StageKind::NonShortcut
            ]
        );
        assert_eq!(plan.segments[0].len(), 1);
        assert_eq!(plan.segments[2].len(), 2);
    }

    #[test]
    fn test_consecutive_stateful_stay_separate() {
        let stages = vec![sort(), sort()];
        let plan = Planner::plan(&stages, count(), &StreamConfig::default());

        assert_eq!(plan.segments.len(), 2);
        assert!(plan.segments.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_empty_stage_list() {
        let stages: Vec<Stage<i32>> = Vec::new();
        let plan = Planner::plan(&stages, count(), &StreamConfig::default());

        assert!(plan.segments.is_empty());
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_fusion_disabled() {
        let config = StreamConfig {
            fusion: false,
            ..StreamConfig::default()
        };
        let stages = vec![filter(), map(), filter()];
        let plan = Planner::plan(&stages, count(), &config);

        assert_eq!(plan.segments.len(), 3);
        assert!(plan.segments.iter().all(|s| !s.is_fused()));
    }

    #[test]
    fn test_reset_hooks_run_once_per_plan() {
        let limited = Stage::stateless("limit", |e: i32, _, state: &mut StageState| {
            state.count += 1;
            Outcome::keep(e)
        })
        .with_reset(StageState::zeroed);
        let stages = vec![limited, map(), sort(), filter().with_reset(StageState::zeroed)];

        let plan = Planner::plan(&stages, count(), &StreamConfig::default());
        assert_eq!(plan.resets_invoked, 2);

        let again = Planner::plan(&stages, count(), &StreamConfig::default());
        assert_eq!(again.resets_invoked, 2);
        if let Segment::Stateless(ops) = &again.segments[0] {
            assert_eq!(ops[0].state, StageState::zeroed());
        } else {
            panic!("Expected stateless segment");
        }
    }

    #[test]
    fn test_describe_plan() {
        let stages = vec![filter(), map(), sort()];
        let plan = Planner::plan(&stages, count(), &StreamConfig::default());

        assert_eq!(
            plan.describe(),
            "Stateless[filter, map] -> Stateful[sort] -> NonShortcut[count]"
        );
    }
}
