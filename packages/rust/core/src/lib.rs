//! Build orchestration for stylebuild.
//!
//! Ties the content scan, the utility expansion stage and the post-processing
//! stage together into a single `build` step that writes the final stylesheet.

pub mod content;
pub mod output;
pub mod pipeline;

pub use pipeline::{BuildOptions, ProgressReporter, SilentProgress, build};
