//! Command implementations for the Stratus CLI.

pub mod dataset;
pub mod job;
pub mod settings;
pub mod tensorboard;
pub mod tuning;
pub mod types;

pub use types::{DatasetCommand, JobCommand, TensorboardCommand, TuningCommand};
