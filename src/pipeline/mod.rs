// src/pipeline/mod.rs

pub mod filters;
pub mod premade;
