//! streamfuse: Lazily composed, stage-fused stream pipelines
//!
//! Build a chain of intermediate operations over a source, then call a
//! terminal operation. Adjacent element-wise stages run in a single pass.
//!
//! ```
//! use streamfuse::Pipeline;
//!
//! let out = Pipeline::from_iter(1..=16)
//!     .slice(2, 6)
//!     .filter(|x| x % 2 == 0)
//!     .sort(|a, b| b.cmp(a))
//!     .join(",");
//! assert_eq!(out, "8,6,4");
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod stream;
pub mod types;

pub use config::StreamConfig;
pub use error::{Result, StreamError};
pub use observability::{init_logging, init_logging_from_env, init_logging_to_file};
pub use pipeline::{
    ExecutionPlan, ExecutionResult, ExecutionStats, Executor, Flow, Outcome, Planner, Stage,
    StageKind, StageState, Terminal,
};
pub use stream::{Pipeline, Source};
pub use types::Pair;
