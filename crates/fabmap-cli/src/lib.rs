//! # fabmap-cli
//!
//! Job loading and execution behind the `fabmap` command.

pub mod job;
pub mod run;

pub use job::{CanvasSpec, Job, JobError, TileSpec};
pub use run::{composite, run_job, CompositeCounts, CompositeReport};
