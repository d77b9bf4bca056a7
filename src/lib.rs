#![allow(non_snake_case)]

// Declare the modules that form the library's public API
pub mod check_logic;
pub mod config;
pub mod data_model;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod utils;

pub use data_model::{CheckReport, CheckResult, Verdict};
pub use error::{PipelineError, Result};
pub use executor::{Filter, Pipeline, PipelineMode};
