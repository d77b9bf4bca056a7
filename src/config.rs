// src/config.rs

pub mod cli;
pub mod pipeline;

pub use cli::{Args, Preset};
pub use pipeline::{load_pipeline_config, FilterConfig, PipelineConfig};
