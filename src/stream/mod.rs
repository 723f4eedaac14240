//! Pipeline values and their operations
//!
//! - `source`: where a run's working buffer comes from
//! - `pipeline`: constructors and intermediate operations
//! - `terminal`: consuming operations that plan and execute a run

pub mod source;
pub mod pipeline;
pub mod terminal;

pub use pipeline::Pipeline;
pub use source::Source;
