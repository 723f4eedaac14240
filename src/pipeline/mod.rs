//! Pipeline planning and execution
//!
//! This module provides the staged engine behind every `Pipeline` terminal call:
//!
//! 1. **Stages**: Each declared operation is a `Stage` tagged with its category
//! 2. **Planner**: Groups the stage list, fusing adjacent stateless stages
//! 3. **Executor**: Runs each group against a working buffer, then the terminal
//!
//! ## Architecture
//!
//! ```text
//! of(1..=16).slice(2, 6).filter(even).sort(desc).join(",")
//!     ↓
//! Stages: [skip, limit, filter] [sort] + Terminal(join)
//!     ↓
//! ExecutionPlan: [Stateless[skip, limit, filter], Stateful[sort], NonShortcut[join]]
//!     ↓
//! Executor: one pass for the fused group, one call for sort, one for join
//! ```
//!
//! ## Benefits
//!
//! - **Fewer allocations**: One working buffer per fused group instead of one per stage
//! - **Early exit**: `limit` and shortcut terminals stop the pass as soon as they can
//! - **Reusable pipelines**: Per-run stage state is created by the planner, never stored
//!
//! ## Limitations
//!
//! - Only adjacent stateless stages fuse
//! - Single-threaded execution on the calling thread

pub mod stage;
pub mod execution_plan;
pub mod planner;
pub mod executor;

pub use stage::{Flow, Outcome, Stage, StageAction, StageKind, StageState, Terminal};
pub use execution_plan::{BufferStep, ExecutionPlan, OpStep, Segment};
pub use planner::Planner;
pub use executor::{ExecutionResult, ExecutionStats, Executor};
