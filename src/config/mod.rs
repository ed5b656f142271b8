// src/config/mod.rs
//! Run configuration: keyword list, window sizes, enabled backends.

pub mod run;

pub use run::RunConfig;
