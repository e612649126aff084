//! Pipeline orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{
    load_log, run_engine, synchronize_files, write_outputs, OutputTargets, Pipeline,
    PipelineConfig,
};
pub use stats::PipelineStats;
