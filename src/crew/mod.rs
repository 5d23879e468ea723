//! Sequential stage pipeline.
//!
//! A crew runs its stages strictly in order. Each stage may invoke one tool,
//! then asks the generator for its output given the run inputs and every
//! earlier output. Only the final stage's output is written to disk, and only
//! once it exists.

mod context;
mod runner;

pub use context::{find_video_url, resolve_input, RunContext, StageOutput};
pub use runner::{strip_code_fence, Crew, RunReport, Stage, StageSummary};
